// Author: Lukas Bower
// Purpose: Backing-store capability query and paged context configuration.

//! Backing store.
//!
//! Firmware keeps large per-class context tables (queue pairs, completion
//! queues, statistics, the TQM rings and so on) in host memory. The driver
//! learns entry sizes and limits with `FUNC_BACKING_STORE_QCAPS`, allocates
//! page tables, then describes each table to firmware in a single
//! `FUNC_BACKING_STORE_CFG` request.

use core::mem::size_of;

use hwrm_wire::backing_store::{
    BackingStoreEnables, CfgInput, QcapsOutput, CFG_LEGACY_LEN, LVL_0, LVL_1, LVL_2, PG_SIZE_4K,
    PG_SIZE_64K, PG_SIZE_8K, SPEC_CODE_BACKING_STORE, TQM_RINGS,
};
use hwrm_wire::{HeaderOnlyInput, Opcode};
use log::{debug, warn};
use zerocopy::byteorder::little_endian::{U16, U32, U64};

use crate::channel::CommandChannel;
use crate::command::{Command, Response};
use crate::error::{HwrmError, Result};
use crate::hal::{Delay, DmaBuffer, RegisterWindow};
use crate::transport::Limits;

/// Host page size used for context page tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSize {
    /// 4 KiB pages.
    Size4K,
    /// 8 KiB pages.
    Size8K,
    /// 64 KiB pages.
    Size64K,
}

impl PageSize {
    /// Maps a byte count to a supported page size.
    #[must_use]
    pub const fn from_bytes(bytes: u32) -> Option<Self> {
        match bytes {
            4096 => Some(Self::Size4K),
            8192 => Some(Self::Size8K),
            65536 => Some(Self::Size64K),
            _ => None,
        }
    }

    /// Page size in bytes.
    #[must_use]
    pub const fn bytes(self) -> u32 {
        match self {
            Self::Size4K => 4096,
            Self::Size8K => 8192,
            Self::Size64K => 65536,
        }
    }

    /// Page-size nibble of a `*_pg_attr` byte.
    #[must_use]
    pub const fn attr_bits(self) -> u8 {
        match self {
            Self::Size4K => PG_SIZE_4K,
            Self::Size8K => PG_SIZE_8K,
            Self::Size64K => PG_SIZE_64K,
        }
    }
}

/// Page table backing one context class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingMem {
    /// The whole table fits one page.
    Single {
        /// Physical address of the page.
        page: u64,
    },
    /// A directory page lists the leaf pages.
    OneLevel {
        /// Physical address of the directory page.
        dir: u64,
    },
    /// A directory of directories lists the leaf pages.
    TwoLevel {
        /// Physical address of the top directory page.
        dir: u64,
    },
}

impl RingMem {
    /// Depth of the table: 0 for a single page.
    #[must_use]
    pub const fn depth(&self) -> u8 {
        match self {
            Self::Single { .. } => 0,
            Self::OneLevel { .. } => 1,
            Self::TwoLevel { .. } => 2,
        }
    }
}

/// Encodes a page table as firmware's `(pg_attr, page_dir)` pair.
///
/// `pg_attr` carries the page-size nibble and the level; `page_dir` is the
/// directory address for indirect tables and the leaf page otherwise.
#[must_use]
pub const fn encode_page_attr(page_size: PageSize, mem: &RingMem) -> (u8, u64) {
    let size = page_size.attr_bits();
    match *mem {
        RingMem::Single { page } => (size | LVL_0, page),
        RingMem::OneLevel { dir } => (size | LVL_1, dir),
        RingMem::TwoLevel { dir } => (size | LVL_2, dir),
    }
}

/// Host memory handed to firmware for one context class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextMem {
    /// Entries the table holds.
    pub entries: u32,
    /// Page table describing the memory.
    pub mem: RingMem,
}

/// Limits and entry sizes reported by `FUNC_BACKING_STORE_QCAPS`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContextMemInfo {
    /// Maximum queue-pair entries.
    pub qp_max_entries: u32,
    /// Minimum QP1 entries.
    pub qp_min_qp1_entries: u16,
    /// Maximum L2 queue-pair entries.
    pub qp_max_l2_entries: u16,
    /// Queue-pair context size.
    pub qp_entry_size: u16,
    /// Maximum L2 SRQ entries.
    pub srq_max_l2_entries: u16,
    /// Maximum SRQ entries.
    pub srq_max_entries: u32,
    /// SRQ context size.
    pub srq_entry_size: u16,
    /// Maximum L2 CQ entries.
    pub cq_max_l2_entries: u16,
    /// Maximum CQ entries.
    pub cq_max_entries: u32,
    /// CQ context size.
    pub cq_entry_size: u16,
    /// Maximum VNIC entries.
    pub vnic_max_vnic_entries: u16,
    /// Maximum RSS ring table entries.
    pub vnic_max_ring_table_entries: u16,
    /// VNIC context size.
    pub vnic_entry_size: u16,
    /// Maximum statistics entries.
    pub stat_max_entries: u32,
    /// Statistics context size.
    pub stat_entry_size: u16,
    /// TQM entry size.
    pub tqm_entry_size: u16,
    /// Minimum entries per TQM ring.
    pub tqm_min_entries_per_ring: u32,
    /// Maximum entries per TQM ring.
    pub tqm_max_entries_per_ring: u32,
    /// Maximum MRAV entries.
    pub mrav_max_entries: u32,
    /// MRAV context size.
    pub mrav_entry_size: u16,
    /// Timer context size.
    pub tim_entry_size: u16,
    /// Maximum timer entries.
    pub tim_max_entries: u32,
    /// MRAV entries per allocation unit.
    pub mrav_num_entries_units: u16,
    /// TQM ring sizes must be a multiple of this; never zero.
    pub tqm_entries_multiple: u8,
    /// Fill byte for fresh context memory.
    pub ctx_kind_initializer: u8,
}

impl ContextMemInfo {
    /// Decodes a capability response.
    #[must_use]
    pub fn from_output(out: &QcapsOutput) -> Self {
        Self {
            qp_max_entries: out.qp_max_entries.get(),
            qp_min_qp1_entries: out.qp_min_qp1_entries.get(),
            qp_max_l2_entries: out.qp_max_l2_entries.get(),
            qp_entry_size: out.qp_entry_size.get(),
            srq_max_l2_entries: out.srq_max_l2_entries.get(),
            srq_max_entries: out.srq_max_entries.get(),
            srq_entry_size: out.srq_entry_size.get(),
            cq_max_l2_entries: out.cq_max_l2_entries.get(),
            cq_max_entries: out.cq_max_entries.get(),
            cq_entry_size: out.cq_entry_size.get(),
            vnic_max_vnic_entries: out.vnic_max_vnic_entries.get(),
            vnic_max_ring_table_entries: out.vnic_max_ring_table_entries.get(),
            vnic_entry_size: out.vnic_entry_size.get(),
            stat_max_entries: out.stat_max_entries.get(),
            stat_entry_size: out.stat_entry_size.get(),
            tqm_entry_size: out.tqm_entry_size.get(),
            tqm_min_entries_per_ring: out.tqm_min_entries_per_ring.get(),
            tqm_max_entries_per_ring: out.tqm_max_entries_per_ring.get(),
            mrav_max_entries: out.mrav_max_entries.get(),
            mrav_entry_size: out.mrav_entry_size.get(),
            tim_entry_size: out.tim_entry_size.get(),
            tim_max_entries: out.tim_max_entries.get(),
            mrav_num_entries_units: out.mrav_num_entries_units.get(),
            tqm_entries_multiple: out.tqm_entries_multiple.max(1),
            ctx_kind_initializer: out.ctx_kind_initializer,
        }
    }
}

/// `FUNC_BACKING_STORE_QCAPS`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackingStoreQcaps;

impl Command for BackingStoreQcaps {
    const OPCODE: Opcode = Opcode::FUNC_BACKING_STORE_QCAPS;
    type Request = HeaderOnlyInput;
    type Output = ContextMemInfo;

    fn build(&self, _req: &mut HeaderOnlyInput) -> Result<()> {
        Ok(())
    }

    fn decode(&self, resp: &Response<'_>) -> Result<ContextMemInfo> {
        Ok(ContextMemInfo::from_output(&resp.parse()))
    }
}

/// Queries backing-store requirements.
///
/// Returns `None` when the firmware predates the query, when the function is
/// a VF, or when firmware rejects the query; the device then runs without
/// host backing store. Transport timeouts are still reported.
pub fn query_backing_store<W, B, D>(
    channel: &CommandChannel<W, B, D>,
    is_vf: bool,
) -> Result<Option<ContextMemInfo>>
where
    W: RegisterWindow,
    B: DmaBuffer,
    D: Delay,
{
    let spec_code = channel.capabilities().map_or(0, |caps| caps.spec_code);
    if spec_code < SPEC_CODE_BACKING_STORE || is_vf {
        debug!("[hwrm] backing store query skipped: intf={spec_code:#x} vf={is_vf}");
        return Ok(None);
    }
    match channel.execute(&BackingStoreQcaps) {
        Ok(info) => Ok(Some(info)),
        Err(err @ HwrmError::Firmware { .. }) => {
            warn!("[hwrm] backing store unavailable: {err}");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// Host memory for every context class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContextPages {
    /// Queue-pair contexts.
    pub qp: Option<ContextMem>,
    /// Shared receive queue contexts.
    pub srq: Option<ContextMem>,
    /// Completion queue contexts.
    pub cq: Option<ContextMem>,
    /// VNIC contexts.
    pub vnic: Option<ContextMem>,
    /// Statistics contexts.
    pub stat: Option<ContextMem>,
    /// MRAV contexts.
    pub mrav: Option<ContextMem>,
    /// Timer contexts.
    pub tim: Option<ContextMem>,
    /// TQM slow-path ring followed by rings 0..7.
    pub tqm: [Option<ContextMem>; TQM_RINGS],
}

/// `FUNC_BACKING_STORE_CFG`.
#[derive(Debug, Clone, Copy)]
pub struct ConfigureBackingStore<'a> {
    /// Capabilities from [`query_backing_store`].
    pub info: &'a ContextMemInfo,
    /// Allocated page tables.
    pub pages: &'a ContextPages,
    /// Classes to configure.
    pub enables: BackingStoreEnables,
    /// Host page size of every table.
    pub page_size: PageSize,
}

impl ConfigureBackingStore<'_> {
    fn class(&self, flag: BackingStoreEnables, mem: Option<ContextMem>) -> Result<Option<ContextMem>> {
        if !self.enables.contains(flag) {
            return Ok(None);
        }
        mem.map(Some).ok_or(HwrmError::InvalidRequest {
            reason: "backing store class enabled without pages",
        })
    }
}

impl Command for ConfigureBackingStore<'_> {
    const OPCODE: Opcode = Opcode::FUNC_BACKING_STORE_CFG;
    type Request = CfgInput;
    type Output = ();

    fn build(&self, req: &mut CfgInput) -> Result<()> {
        let info = self.info;
        let pg = self.page_size;
        req.enables = U32::new(self.enables.bits());

        if let Some(ctx) = self.class(BackingStoreEnables::QP, self.pages.qp)? {
            set_pg(pg, &ctx.mem, &mut req.qpc_pg_attr, &mut req.qpc_page_dir);
            req.qp_num_entries = U32::new(ctx.entries);
            req.qp_num_qp1_entries = U16::new(info.qp_min_qp1_entries);
            req.qp_num_l2_entries = U16::new(info.qp_max_l2_entries);
            req.qp_entry_size = U16::new(info.qp_entry_size);
        }
        if let Some(ctx) = self.class(BackingStoreEnables::SRQ, self.pages.srq)? {
            set_pg(pg, &ctx.mem, &mut req.srq_pg_attr, &mut req.srq_page_dir);
            req.srq_num_entries = U32::new(ctx.entries);
            req.srq_num_l2_entries = U16::new(info.srq_max_l2_entries);
            req.srq_entry_size = U16::new(info.srq_entry_size);
        }
        if let Some(ctx) = self.class(BackingStoreEnables::CQ, self.pages.cq)? {
            set_pg(pg, &ctx.mem, &mut req.cq_pg_attr, &mut req.cq_page_dir);
            req.cq_num_entries = U32::new(ctx.entries);
            req.cq_num_l2_entries = U16::new(info.cq_max_l2_entries);
            req.cq_entry_size = U16::new(info.cq_entry_size);
        }
        if let Some(ctx) = self.class(BackingStoreEnables::MRAV, self.pages.mrav)? {
            set_pg(pg, &ctx.mem, &mut req.mrav_pg_attr, &mut req.mrav_page_dir);
            req.mrav_num_entries = U32::new(ctx.entries);
            req.mrav_entry_size = U16::new(info.mrav_entry_size);
        }
        if let Some(ctx) = self.class(BackingStoreEnables::TIM, self.pages.tim)? {
            set_pg(pg, &ctx.mem, &mut req.tim_pg_attr, &mut req.tim_page_dir);
            req.tim_num_entries = U32::new(ctx.entries);
            req.tim_entry_size = U16::new(info.tim_entry_size);
        }
        if let Some(ctx) = self.class(BackingStoreEnables::VNIC, self.pages.vnic)? {
            set_pg(pg, &ctx.mem, &mut req.vnic_pg_attr, &mut req.vnic_page_dir);
            req.vnic_num_vnic_entries = U16::new(info.vnic_max_vnic_entries);
            req.vnic_num_ring_table_entries = U16::new(info.vnic_max_ring_table_entries);
            req.vnic_entry_size = U16::new(info.vnic_entry_size);
        }
        if let Some(ctx) = self.class(BackingStoreEnables::STAT, self.pages.stat)? {
            set_pg(pg, &ctx.mem, &mut req.stat_pg_attr, &mut req.stat_page_dir);
            req.stat_num_entries = U32::new(info.stat_max_entries);
            req.stat_entry_size = U16::new(info.stat_entry_size);
        }

        for (ring, mem) in self.pages.tqm.iter().enumerate() {
            let Some(ctx) = self.class(BackingStoreEnables::tqm(ring), *mem)? else {
                continue;
            };
            set_pg(pg, &ctx.mem, &mut req.tqm_pg_attr[ring], &mut req.tqm_page_dir[ring]);
            req.tqm_num_entries[ring] = U32::new(ctx.entries);
        }
        if self.enables.intersects(BackingStoreEnables::all_tqm()) {
            req.tqm_entry_size = U16::new(info.tqm_entry_size);
        }
        Ok(())
    }

    fn request_len(&self, limits: &Limits) -> usize {
        let full = size_of::<CfgInput>();
        if full > limits.max_ext_req_len {
            debug!(
                "[hwrm] backing store cfg truncated to {CFG_LEGACY_LEN} bytes (ext limit {})",
                limits.max_ext_req_len
            );
            CFG_LEGACY_LEN
        } else {
            full
        }
    }

    fn decode(&self, _resp: &Response<'_>) -> Result<()> {
        Ok(())
    }
}

fn set_pg(page_size: PageSize, mem: &RingMem, attr: &mut u8, dir: &mut U64) {
    let (bits, addr) = encode_page_attr(page_size, mem);
    *attr = bits;
    *dir = U64::new(addr);
}
