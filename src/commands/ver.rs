// Author: Lukas Bower
// Purpose: Version handshake and the channel capabilities it reports.

//! `VER_GET` handshake.

use core::fmt::Write as _;

use heapless::String;
use hwrm_wire::ver::{DevCapsCfg, VerGetInput, VerGetOutput, NAME_LEN, SPEC_CODE_16BIT_FW_VERSION};
use hwrm_wire::{
    Opcode, DEFAULT_CMD_TIMEOUT_MS, DEFAULT_MAX_REQ_LEN, DRIVER_INTF_VERSION,
    MAX_DIRECT_WINDOW_LEN, SHORT_REQ_LEN,
};
use log::error;

use crate::command::{Command, Response};
use crate::error::Result;
use crate::transport::Limits;

/// Version string such as `"218.0.169.4/pkg 218.0.166.0"`.
pub type VersionString = String<64>;

/// Firmware component name.
pub type NameString = String<NAME_LEN>;

/// Channel-relevant values reported by `VER_GET`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Interface major version.
    pub intf_major: u8,
    /// `maj << 16 | min << 8 | upd` of the firmware interface.
    pub spec_code: u32,
    /// Direct window length reported by firmware.
    pub max_req_win_len: u16,
    /// Short-form length limit reported by firmware.
    pub max_ext_req_len: u16,
    /// Default command budget, already defaulted when firmware reports zero.
    pub timeout_ms: u32,
    /// Raw capability bits.
    pub dev_caps: DevCapsCfg,
}

impl Capabilities {
    /// True when firmware both supports and requires the short form.
    #[must_use]
    pub fn short_cmd_required(&self) -> bool {
        self.dev_caps
            .contains(DevCapsCfg::SHORT_CMD_SUPPORTED | DevCapsCfg::SHORT_CMD_REQUIRED)
    }

    /// Applies these capabilities to `current`, bounded by the staging buffer.
    #[must_use]
    pub fn limits(&self, current: Limits, staging_capacity: usize) -> Limits {
        let mut limits = current;
        if self.intf_major >= 1 {
            limits.max_req_len =
                (usize::from(self.max_req_win_len) & !3).clamp(SHORT_REQ_LEN, MAX_DIRECT_WINDOW_LEN);
            limits.max_ext_req_len = usize::from(self.max_ext_req_len)
                .max(DEFAULT_MAX_REQ_LEN)
                .min(staging_capacity);
        }
        limits.short_cmd_required |= self.short_cmd_required();
        limits
    }
}

/// Chip identification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipInfo {
    /// Chip number.
    pub num: u16,
    /// Revision.
    pub rev: u8,
    /// Metal revision.
    pub metal: u8,
    /// Bond id.
    pub bond_id: u8,
    /// Platform type.
    pub platform_type: u8,
}

/// Version and name of an optional firmware component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    /// `maj.min.bld`.
    pub version: VersionString,
    /// Component name.
    pub name: NameString,
}

/// Everything `VER_GET` reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareInfo {
    /// Firmware interface version, `maj.min.upd`.
    pub intf_version: VersionString,
    /// Firmware version, with the active package appended when present.
    pub fw_version: VersionString,
    /// Firmware name.
    pub fw_name: NameString,
    /// Management firmware, `None` when not installed.
    pub mgmt: Option<Component>,
    /// Network control firmware, `None` when not installed.
    pub netctrl: Option<Component>,
    /// RoCE firmware, `None` when not installed.
    pub roce: Option<Component>,
    /// Chip identification.
    pub chip: ChipInfo,
    /// Values the channel adopts.
    pub caps: Capabilities,
}

impl FirmwareInfo {
    /// Decodes a `VER_GET` response.
    #[must_use]
    pub fn from_output(out: &VerGetOutput) -> Self {
        let (maj, min, upd) = (out.hwrm_intf_maj, out.hwrm_intf_min, out.hwrm_intf_upd);
        let spec_code = u32::from(maj) << 16 | u32::from(min) << 8 | u32::from(upd);
        if maj < 1 {
            error!("[hwrm] firmware interface {maj}.{min}.{upd} is older than 1.0.0; update firmware");
        }

        let mut fw_version = VersionString::new();
        let fw_major = out.hwrm_fw_major.get();
        let _ = if spec_code > SPEC_CODE_16BIT_FW_VERSION && fw_major != 0 {
            write!(
                fw_version,
                "{}.{}.{}.{}",
                fw_major,
                out.hwrm_fw_minor.get(),
                out.hwrm_fw_build.get(),
                out.hwrm_fw_patch.get()
            )
        } else {
            write!(
                fw_version,
                "{}.{}.{}.{}",
                out.hwrm_fw_maj_8b, out.hwrm_fw_min_8b, out.hwrm_fw_bld_8b, out.hwrm_fw_rsvd_8b
            )
        };
        let pkg = c_name(&out.active_pkg_name);
        if !pkg.is_empty() {
            let _ = write!(fw_version, "/pkg {pkg}");
        }

        let timeout_ms = match out.def_req_timeout.get() {
            0 => DEFAULT_CMD_TIMEOUT_MS,
            ms => u32::from(ms),
        };

        Self {
            intf_version: triple(maj, min, upd),
            fw_version,
            fw_name: c_name(&out.hwrm_fw_name),
            mgmt: component(
                (out.mgmt_fw_maj, out.mgmt_fw_min, out.mgmt_fw_bld),
                &out.mgmt_fw_name,
            ),
            netctrl: component(
                (out.netctrl_fw_maj, out.netctrl_fw_min, out.netctrl_fw_bld),
                &out.netctrl_fw_name,
            ),
            roce: component(
                (out.roce_fw_maj, out.roce_fw_min, out.roce_fw_bld),
                &out.roce_fw_name,
            ),
            chip: ChipInfo {
                num: out.chip_num.get(),
                rev: out.chip_rev,
                metal: out.chip_metal,
                bond_id: out.chip_bond_id,
                platform_type: out.chip_platform_type,
            },
            caps: Capabilities {
                intf_major: maj,
                spec_code,
                max_req_win_len: out.max_req_win_len.get(),
                max_ext_req_len: out.max_ext_req_len.get(),
                timeout_ms,
                dev_caps: DevCapsCfg::from_bits_retain(out.dev_caps_cfg.get()),
            },
        }
    }
}

fn triple(maj: u8, min: u8, upd: u8) -> VersionString {
    let mut out = VersionString::new();
    let _ = write!(out, "{maj}.{min}.{upd}");
    out
}

fn component(version: (u8, u8, u8), name: &[u8; NAME_LEN]) -> Option<Component> {
    if version == (0, 0, 0) {
        return None;
    }
    Some(Component {
        version: triple(version.0, version.1, version.2),
        name: c_name(name),
    })
}

/// Copies a NUL-padded firmware name, replacing non-printable bytes.
fn c_name(raw: &[u8; NAME_LEN]) -> NameString {
    let mut out = NameString::new();
    for &byte in raw.iter().take_while(|&&byte| byte != 0) {
        let ch = if byte.is_ascii_graphic() || byte == b' ' {
            char::from(byte)
        } else {
            '?'
        };
        let _ = out.push(ch);
    }
    out
}

/// `VER_GET`: advertises the driver interface and learns the firmware's.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerGet;

impl Command for VerGet {
    const OPCODE: Opcode = Opcode::VER_GET;
    type Request = VerGetInput;
    type Output = FirmwareInfo;

    fn build(&self, req: &mut VerGetInput) -> Result<()> {
        let (maj, min, upd) = DRIVER_INTF_VERSION;
        req.hwrm_intf_maj = maj;
        req.hwrm_intf_min = min;
        req.hwrm_intf_upd = upd;
        Ok(())
    }

    fn decode(&self, resp: &Response<'_>) -> Result<FirmwareInfo> {
        Ok(FirmwareInfo::from_output(&resp.parse()))
    }
}
