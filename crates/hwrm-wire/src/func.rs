// Author: Lukas Bower
//! Function registration and reset requests.

use core::mem::size_of;

use bitflags::bitflags;
use static_assertions::const_assert_eq;
use zerocopy::byteorder::little_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::RequestHeader;

bitflags! {
    /// `FUNC_DRV_RGTR` enables.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DrvRgtrEnables: u32 {
        /// `os_type` is valid.
        const OS_TYPE = 0x1;
        /// Driver version fields are valid.
        const VER = 0x2;
        /// `timestamp` is valid.
        const TIMESTAMP = 0x4;
        /// `vf_req_fwd` is valid.
        const VF_REQ_FWD = 0x8;
        /// `async_event_fwd` is valid.
        const ASYNC_EVENT_FWD = 0x10;
    }
}

bitflags! {
    /// `FUNC_DRV_UNRGTR` flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DrvUnrgtrFlags: u32 {
        /// Driver is about to shut down; firmware may tear down state.
        const PREPARE_FOR_SHUTDOWN = 0x1;
    }
}

/// Host operating system identifiers for `FUNC_DRV_RGTR`.
pub mod os_type {
    /// Unknown OS.
    pub const UNKNOWN: u16 = 0x0;
    /// Other OS.
    pub const OTHER: u16 = 0x1;
    /// Linux.
    pub const LINUX: u16 = 0x24;
    /// FreeBSD.
    pub const FREEBSD: u16 = 0x2a;
    /// ESXi.
    pub const ESXI: u16 = 0x68;
    /// Windows.
    pub const WIN864: u16 = 0x73;
}

/// Driver registration request.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct FuncDrvRgtrInput {
    /// Request header.
    pub header: RequestHeader,
    /// Registration flags.
    pub flags: U32,
    /// Valid-field mask, see [`DrvRgtrEnables`].
    pub enables: U32,
    /// Host OS, see [`os_type`].
    pub os_type: U16,
    /// Driver major version.
    pub ver_maj: u8,
    /// Driver minor version.
    pub ver_min: u8,
    /// Driver update version.
    pub ver_upd: u8,
    /// Reserved.
    pub unused_0: [u8; 3],
    /// Driver load timestamp.
    pub timestamp: U32,
    /// Reserved.
    pub unused_1: [u8; 4],
    /// Bitmap of VF requests forwarded to this driver.
    pub vf_req_fwd: [U32; 8],
    /// Bitmap of async events forwarded to this driver.
    pub async_event_fwd: [U32; 8],
}

/// Driver unregistration request.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct FuncDrvUnrgtrInput {
    /// Request header.
    pub header: RequestHeader,
    /// See [`DrvUnrgtrFlags`].
    pub flags: U32,
    /// Reserved.
    pub unused_0: [u8; 4],
}

/// Function reset request.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct FuncResetInput {
    /// Request header.
    pub header: RequestHeader,
    /// Valid-field mask; zero resets the issuing function.
    pub enables: U32,
    /// VF to reset when enabled.
    pub vf_id: U16,
    /// Reset level.
    pub func_reset_level: u8,
    /// Reserved.
    pub unused_0: u8,
}

const_assert_eq!(size_of::<FuncDrvRgtrInput>(), 104);
const_assert_eq!(size_of::<FuncDrvUnrgtrInput>(), 24);
const_assert_eq!(size_of::<FuncResetInput>(), 24);
