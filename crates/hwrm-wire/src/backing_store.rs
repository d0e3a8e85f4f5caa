// Author: Lukas Bower
//! Backing-store capability query and configuration layouts.

use core::mem::size_of;

use bitflags::bitflags;
use static_assertions::const_assert_eq;
use zerocopy::byteorder::little_endian::{U16, U32, U64};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::{RequestHeader, ResponseHeader};

/// Number of TQM ring classes: the slow-path ring plus eight fast-path rings.
pub const TQM_RINGS: usize = 9;

/// Interface version (1.9.2) from which firmware answers the capability query.
pub const SPEC_CODE_BACKING_STORE: u32 = 0x1_09_02;

/// Configuration length understood by firmware predating the extended layout.
pub const CFG_LEGACY_LEN: usize = 256;

/// Page size nibble for 4 KiB pages.
pub const PG_SIZE_4K: u8 = 0x0 << 4;
/// Page size nibble for 8 KiB pages.
pub const PG_SIZE_8K: u8 = 0x1 << 4;
/// Page size nibble for 64 KiB pages.
pub const PG_SIZE_64K: u8 = 0x2 << 4;

/// Level bits: the page address is the single leaf page.
pub const LVL_0: u8 = 0x0;
/// Level bits: the page address is a one-level directory.
pub const LVL_1: u8 = 0x1;
/// Level bits: the page address is a two-level directory.
pub const LVL_2: u8 = 0x2;

bitflags! {
    /// Per-class enables of `FUNC_BACKING_STORE_CFG`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BackingStoreEnables: u32 {
        /// Queue-pair contexts.
        const QP = 0x1;
        /// Shared receive queue contexts.
        const SRQ = 0x2;
        /// Completion queue contexts.
        const CQ = 0x4;
        /// VNIC contexts.
        const VNIC = 0x8;
        /// Statistics contexts.
        const STAT = 0x10;
        /// TQM slow-path ring.
        const TQM_SP = 0x20;
        /// TQM ring 0.
        const TQM_RING0 = 0x40;
        /// TQM ring 1.
        const TQM_RING1 = 0x80;
        /// TQM ring 2.
        const TQM_RING2 = 0x100;
        /// TQM ring 3.
        const TQM_RING3 = 0x200;
        /// TQM ring 4.
        const TQM_RING4 = 0x400;
        /// TQM ring 5.
        const TQM_RING5 = 0x800;
        /// TQM ring 6.
        const TQM_RING6 = 0x1000;
        /// TQM ring 7.
        const TQM_RING7 = 0x2000;
        /// Memory region / address vector contexts.
        const MRAV = 0x4000;
        /// Timer contexts.
        const TIM = 0x8000;

        /// Classes every L2 function configures.
        const DEFAULT = Self::QP.bits()
            | Self::SRQ.bits()
            | Self::CQ.bits()
            | Self::VNIC.bits()
            | Self::STAT.bits();
    }
}

impl BackingStoreEnables {
    /// Enable bit of TQM ring `index` (0 is the slow-path ring).
    #[must_use]
    pub const fn tqm(index: usize) -> Self {
        Self::from_bits_retain(Self::TQM_SP.bits() << index)
    }

    /// All TQM enables.
    #[must_use]
    pub const fn all_tqm() -> Self {
        Self::from_bits_retain(((1u32 << TQM_RINGS) - 1) * Self::TQM_SP.bits())
    }
}

/// Capability query response.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct QcapsOutput {
    /// Response header.
    pub header: ResponseHeader,
    /// Maximum queue-pair entries.
    pub qp_max_entries: U32,
    /// Minimum QP1 entries.
    pub qp_min_qp1_entries: U16,
    /// Maximum L2 queue-pair entries.
    pub qp_max_l2_entries: U16,
    /// Queue-pair context size.
    pub qp_entry_size: U16,
    /// Maximum L2 SRQ entries.
    pub srq_max_l2_entries: U16,
    /// Maximum SRQ entries.
    pub srq_max_entries: U32,
    /// SRQ context size.
    pub srq_entry_size: U16,
    /// Maximum L2 CQ entries.
    pub cq_max_l2_entries: U16,
    /// Maximum CQ entries.
    pub cq_max_entries: U32,
    /// CQ context size.
    pub cq_entry_size: U16,
    /// Maximum VNIC entries.
    pub vnic_max_vnic_entries: U16,
    /// Maximum RSS ring table entries.
    pub vnic_max_ring_table_entries: U16,
    /// VNIC context size.
    pub vnic_entry_size: U16,
    /// Maximum statistics entries.
    pub stat_max_entries: U32,
    /// Statistics context size.
    pub stat_entry_size: U16,
    /// TQM entry size.
    pub tqm_entry_size: U16,
    /// Minimum entries per TQM ring.
    pub tqm_min_entries_per_ring: U32,
    /// Maximum entries per TQM ring.
    pub tqm_max_entries_per_ring: U32,
    /// Maximum MRAV entries.
    pub mrav_max_entries: U32,
    /// MRAV context size.
    pub mrav_entry_size: U16,
    /// Timer context size.
    pub tim_entry_size: U16,
    /// Maximum timer entries.
    pub tim_max_entries: U32,
    /// MRAV entries per allocation unit.
    pub mrav_num_entries_units: U16,
    /// TQM ring entry counts must be a multiple of this.
    pub tqm_entries_multiple: u8,
    /// Byte pattern firmware expects fresh context memory to hold.
    pub ctx_kind_initializer: u8,
    /// Reserved.
    pub unused_0: [u8; 7],
    /// Valid marker.
    pub valid: u8,
}

/// Backing-store configuration request.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct CfgInput {
    /// Request header.
    pub header: RequestHeader,
    /// Configuration flags.
    pub flags: U32,
    /// See [`BackingStoreEnables`].
    pub enables: U32,
    /// QP page size and level.
    pub qpc_pg_attr: u8,
    /// SRQ page size and level.
    pub srq_pg_attr: u8,
    /// CQ page size and level.
    pub cq_pg_attr: u8,
    /// VNIC page size and level.
    pub vnic_pg_attr: u8,
    /// Statistics page size and level.
    pub stat_pg_attr: u8,
    /// TQM slow-path and ring 0..7 page size and level.
    pub tqm_pg_attr: [u8; TQM_RINGS],
    /// MRAV page size and level.
    pub mrav_pg_attr: u8,
    /// Timer page size and level.
    pub tim_pg_attr: u8,
    /// QP page directory.
    pub qpc_page_dir: U64,
    /// SRQ page directory.
    pub srq_page_dir: U64,
    /// CQ page directory.
    pub cq_page_dir: U64,
    /// VNIC page directory.
    pub vnic_page_dir: U64,
    /// Statistics page directory.
    pub stat_page_dir: U64,
    /// TQM slow-path and ring 0..7 page directories.
    pub tqm_page_dir: [U64; TQM_RINGS],
    /// MRAV page directory.
    pub mrav_page_dir: U64,
    /// Timer page directory.
    pub tim_page_dir: U64,
    /// QP entries.
    pub qp_num_entries: U32,
    /// QP1 entries.
    pub qp_num_qp1_entries: U16,
    /// L2 QP entries.
    pub qp_num_l2_entries: U16,
    /// QP entry size.
    pub qp_entry_size: U16,
    /// L2 SRQ entries.
    pub srq_num_l2_entries: U16,
    /// SRQ entries.
    pub srq_num_entries: U32,
    /// SRQ entry size.
    pub srq_entry_size: U16,
    /// L2 CQ entries.
    pub cq_num_l2_entries: U16,
    /// CQ entries.
    pub cq_num_entries: U32,
    /// CQ entry size.
    pub cq_entry_size: U16,
    /// VNIC entries.
    pub vnic_num_vnic_entries: U16,
    /// RSS ring table entries.
    pub vnic_num_ring_table_entries: U16,
    /// VNIC entry size.
    pub vnic_entry_size: U16,
    /// Statistics entries.
    pub stat_num_entries: U32,
    /// Statistics entry size.
    pub stat_entry_size: U16,
    /// TQM entry size.
    pub tqm_entry_size: U16,
    /// Minimum entries per TQM ring.
    pub tqm_min_entries_per_ring: U32,
    /// Maximum entries per TQM ring.
    pub tqm_max_entries_per_ring: U32,
    /// Entries of the TQM slow-path ring and rings 0..7.
    pub tqm_num_entries: [U32; TQM_RINGS],
    /// MRAV entries.
    pub mrav_num_entries: U32,
    /// MRAV entry size.
    pub mrav_entry_size: U16,
    /// Timer entry size.
    pub tim_entry_size: U16,
    /// Timer entries.
    pub tim_num_entries: U32,
}

const_assert_eq!(size_of::<QcapsOutput>(), 80);
const_assert_eq!(size_of::<CfgInput>(), 264);
const_assert_eq!(BackingStoreEnables::all_tqm().bits(), 0x3fe0);
