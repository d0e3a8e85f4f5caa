// Author: Lukas Bower
//! `VER_GET` request and response.

use core::mem::size_of;

use bitflags::bitflags;
use static_assertions::const_assert_eq;
use zerocopy::byteorder::little_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::{RequestHeader, ResponseHeader};

/// Length of each fixed name field in [`VerGetOutput`].
pub const NAME_LEN: usize = 16;

/// Interface version (1.8.3) after which 16-bit firmware version fields are populated.
pub const SPEC_CODE_16BIT_FW_VERSION: u32 = 0x1_08_03;

/// Version handshake request.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct VerGetInput {
    /// Request header.
    pub header: RequestHeader,
    /// Driver interface major version.
    pub hwrm_intf_maj: u8,
    /// Driver interface minor version.
    pub hwrm_intf_min: u8,
    /// Driver interface update version.
    pub hwrm_intf_upd: u8,
    /// Reserved.
    pub unused_0: [u8; 5],
}

bitflags! {
    /// `dev_caps_cfg` bits reported by `VER_GET`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DevCapsCfg: u32 {
        /// Firmware image updates must be signed.
        const SECURE_FW_UPD = 0x1;
        /// Firmware runs its own DCBX agent.
        const FW_DCBX_AGENT = 0x2;
        /// Firmware understands the short request form.
        const SHORT_CMD_SUPPORTED = 0x4;
        /// Firmware only accepts the short request form.
        const SHORT_CMD_REQUIRED = 0x8;
    }
}

/// Version handshake response.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct VerGetOutput {
    /// Response header.
    pub header: ResponseHeader,
    /// Firmware interface major version.
    pub hwrm_intf_maj: u8,
    /// Firmware interface minor version.
    pub hwrm_intf_min: u8,
    /// Firmware interface update version.
    pub hwrm_intf_upd: u8,
    /// Firmware interface reserved version byte.
    pub hwrm_intf_rsvd: u8,
    /// Firmware major version (8-bit legacy field).
    pub hwrm_fw_maj_8b: u8,
    /// Firmware minor version (8-bit legacy field).
    pub hwrm_fw_min_8b: u8,
    /// Firmware build version (8-bit legacy field).
    pub hwrm_fw_bld_8b: u8,
    /// Firmware reserved version byte.
    pub hwrm_fw_rsvd_8b: u8,
    /// Management firmware major version.
    pub mgmt_fw_maj: u8,
    /// Management firmware minor version.
    pub mgmt_fw_min: u8,
    /// Management firmware build version.
    pub mgmt_fw_bld: u8,
    /// Management firmware patch version.
    pub mgmt_fw_rsvd: u8,
    /// Network control firmware major version.
    pub netctrl_fw_maj: u8,
    /// Network control firmware minor version.
    pub netctrl_fw_min: u8,
    /// Network control firmware build version.
    pub netctrl_fw_bld: u8,
    /// Network control firmware patch version.
    pub netctrl_fw_rsvd: u8,
    /// Device capability bits, see [`DevCapsCfg`].
    pub dev_caps_cfg: U32,
    /// RoCE firmware major version.
    pub roce_fw_maj: u8,
    /// RoCE firmware minor version.
    pub roce_fw_min: u8,
    /// RoCE firmware build version.
    pub roce_fw_bld: u8,
    /// RoCE firmware patch version.
    pub roce_fw_rsvd: u8,
    /// NUL-padded firmware name.
    pub hwrm_fw_name: [u8; NAME_LEN],
    /// NUL-padded management firmware name.
    pub mgmt_fw_name: [u8; NAME_LEN],
    /// NUL-padded network control firmware name.
    pub netctrl_fw_name: [u8; NAME_LEN],
    /// NUL-padded active package name.
    pub active_pkg_name: [u8; NAME_LEN],
    /// NUL-padded RoCE firmware name.
    pub roce_fw_name: [u8; NAME_LEN],
    /// Chip number.
    pub chip_num: U16,
    /// Chip revision.
    pub chip_rev: u8,
    /// Chip metal revision.
    pub chip_metal: u8,
    /// Chip bond id.
    pub chip_bond_id: u8,
    /// Platform type (ASIC, FPGA, emulation).
    pub chip_platform_type: u8,
    /// Largest request accepted through the direct window.
    pub max_req_win_len: U16,
    /// Largest response firmware will produce.
    pub max_resp_len: U16,
    /// Default command timeout in milliseconds.
    pub def_req_timeout: U16,
    /// Miscellaneous flags.
    pub flags: u8,
    /// Reserved.
    pub unused_0: [u8; 3],
    /// Firmware major version (16-bit field).
    pub hwrm_fw_major: U16,
    /// Firmware minor version (16-bit field).
    pub hwrm_fw_minor: U16,
    /// Firmware build version (16-bit field).
    pub hwrm_fw_build: U16,
    /// Firmware patch version (16-bit field).
    pub hwrm_fw_patch: U16,
    /// Largest request accepted through the short form.
    pub max_ext_req_len: U16,
    /// Reserved.
    pub unused_1: [u8; 5],
    /// Valid marker.
    pub valid: u8,
}

const_assert_eq!(size_of::<VerGetInput>(), 24);
const_assert_eq!(size_of::<VerGetOutput>(), 144);
