// Author: Lukas Bower
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Wire layouts for the bnxt HWRM firmware command channel.
//!
//! Every structure in this crate mirrors a firmware-defined message byte for
//! byte: `#[repr(C)]`, alignment 1, all multi-byte fields little-endian. The
//! types carry no behaviour beyond field access; framing, doorbell handling
//! and polling live in the `bnxt-hwrm` crate.

use core::mem::size_of;

use static_assertions::const_assert_eq;
use zerocopy::byteorder::little_endian::{U16, U32, U64};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

pub mod backing_store;
pub mod func;
pub mod nvm;
pub mod opcode;
pub mod status;
pub mod ver;

pub use opcode::Opcode;
pub use status::FwStatus;

/// Byte offset of the doorbell register inside the command window.
pub const DOORBELL_OFFSET: usize = 0x100;

/// Value written to the doorbell to start firmware processing.
pub const DOORBELL_TRIGGER: u32 = 1;

/// Direct request length assumed before the version handshake.
pub const DEFAULT_MAX_REQ_LEN: usize = 128;

/// Largest direct request the window can hold before colliding with the doorbell.
pub const MAX_DIRECT_WINDOW_LEN: usize = DOORBELL_OFFSET;

/// Signature identifying a short-form request descriptor.
pub const SHORT_CMD_SIGNATURE: u16 = 0x4321;

/// Sentinel written by firmware as the last byte of a complete response.
pub const RESP_VALID_KEY: u8 = 1;

/// Capacity of the DMA response buffer (one 4 KiB page).
pub const RESP_BUF_LEN: usize = 4096;

/// Completion ring / target id meaning "none".
pub const UNUSED_ID: u16 = 0xffff;

/// Command timeout used when firmware reports a zero default.
pub const DEFAULT_CMD_TIMEOUT_MS: u32 = 500;

/// Command timeout used before the version handshake completes.
pub const HANDSHAKE_TIMEOUT_MS: u32 = 1000;

/// Timeout for NVM and firmware-update commands (five minutes).
pub const NVM_TIMEOUT_MS: u32 = 300_000;

/// Interface version advertised by the driver in `VER_GET`.
pub const DRIVER_INTF_VERSION: (u8, u8, u8) = (1, 10, 2);

/// Common prefix of every request.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct RequestHeader {
    /// Command opcode.
    pub req_type: U16,
    /// Completion ring for asynchronous completion, [`UNUSED_ID`] when polled.
    pub cmpl_ring: U16,
    /// Per-send sequence number.
    pub seq_id: U16,
    /// Target function, [`UNUSED_ID`] for the issuing function.
    pub target_id: U16,
    /// Physical address of the response buffer.
    pub resp_addr: U64,
}

/// Byte offset of `seq_id` inside [`RequestHeader`].
pub const REQ_SEQ_ID_OFFSET: usize = 4;

/// Common prefix of every response.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct ResponseHeader {
    /// Firmware status; zero on success.
    pub error_code: U16,
    /// Echo of the request opcode.
    pub req_type: U16,
    /// Echo of the request sequence number.
    pub seq_id: U16,
    /// Length of the response in bytes, valid marker included.
    pub resp_len: U16,
}

/// Byte offset of `error_code` inside [`ResponseHeader`].
pub const RESP_ERROR_CODE_OFFSET: usize = 0;

/// Byte offset of `resp_len` inside [`ResponseHeader`].
pub const RESP_LEN_OFFSET: usize = 6;

/// Indirect request descriptor pointing at a DMA-staged full request.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct ShortInput {
    /// Opcode copied from the staged request.
    pub req_type: U16,
    /// Always [`SHORT_CMD_SIGNATURE`].
    pub signature: U16,
    /// Reserved.
    pub unused_0: U16,
    /// True length of the staged request.
    pub size: U16,
    /// Physical address of the staged request.
    pub req_addr: U64,
}

/// Wire size of [`ShortInput`].
pub const SHORT_REQ_LEN: usize = size_of::<ShortInput>();

/// Generic error response.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct ErrOutput {
    /// Response header.
    pub header: ResponseHeader,
    /// Opaque firmware diagnostic word.
    pub opaque_0: U32,
    /// Opaque firmware diagnostic half-word.
    pub opaque_1: U16,
    /// Command-specific error detail.
    pub cmd_err: u8,
    /// Valid marker.
    pub valid: u8,
}

/// Request carrying nothing beyond the header.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct HeaderOnlyInput {
    /// Request header.
    pub header: RequestHeader,
}

const_assert_eq!(size_of::<RequestHeader>(), 16);
const_assert_eq!(size_of::<ResponseHeader>(), 8);
const_assert_eq!(size_of::<ShortInput>(), 16);
const_assert_eq!(size_of::<ErrOutput>(), 16);
const_assert_eq!(size_of::<HeaderOnlyInput>(), 16);
const_assert_eq!(DOORBELL_OFFSET % 4, 0);
