// Author: Lukas Bower
//! NVM device information and firmware package installation.

use core::mem::size_of;

use static_assertions::const_assert_eq;
use zerocopy::byteorder::little_endian::{U16, U32, U64};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::{RequestHeader, ResponseHeader};

/// NVM geometry response.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct GetDevInfoOutput {
    /// Response header.
    pub header: ResponseHeader,
    /// JEDEC manufacturer id.
    pub manufacturer_id: U16,
    /// Flash device id.
    pub device_id: U16,
    /// Erase sector size in bytes.
    pub sector_size: U32,
    /// Total NVRAM size in bytes.
    pub nvram_size: U32,
    /// Bytes reserved by firmware.
    pub reserved_size: U32,
    /// Bytes available to the host.
    pub available_size: U32,
    /// NVM configuration major version.
    pub nvm_cfg_ver_maj: u8,
    /// NVM configuration minor version.
    pub nvm_cfg_ver_min: u8,
    /// NVM configuration update version.
    pub nvm_cfg_ver_upd: u8,
    /// Valid marker.
    pub valid: u8,
}

/// Package installation request.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct InstallUpdateInput {
    /// Request header.
    pub header: RequestHeader,
    /// Directory type of the package to install.
    pub install_type: U32,
    /// Installation flags.
    pub flags: U16,
    /// Reserved.
    pub unused_0: [u8; 2],
}

/// Package installation response.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct InstallUpdateOutput {
    /// Response header.
    pub header: ResponseHeader,
    /// Bitmap of installed items.
    pub installed_items: U64,
    /// Installation result.
    pub result: u8,
    /// Item that failed, when `result` is non-zero.
    pub problem_item: u8,
    /// Non-zero when a reset is needed to activate the update.
    pub reset_required: u8,
    /// Reserved.
    pub unused_0: [u8; 4],
    /// Valid marker.
    pub valid: u8,
}

const_assert_eq!(size_of::<GetDevInfoOutput>(), 32);
const_assert_eq!(size_of::<InstallUpdateInput>(), 24);
const_assert_eq!(size_of::<InstallUpdateOutput>(), 24);
