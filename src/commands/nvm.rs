// Author: Lukas Bower
// Purpose: NVM commands that run with the five-minute budget.

//! NVM commands.

use hwrm_wire::nvm::{GetDevInfoOutput, InstallUpdateInput, InstallUpdateOutput};
use hwrm_wire::{HeaderOnlyInput, Opcode, NVM_TIMEOUT_MS};
use zerocopy::byteorder::little_endian::{U16, U32};

use crate::command::{Command, Response};
use crate::error::Result;

/// Flash geometry reported by `NVM_GET_DEV_INFO`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NvmDevInfo {
    /// JEDEC manufacturer id.
    pub manufacturer_id: u16,
    /// Flash device id.
    pub device_id: u16,
    /// Erase sector size in bytes.
    pub sector_size: u32,
    /// Total NVRAM size in bytes.
    pub nvram_size: u32,
    /// Bytes reserved by firmware.
    pub reserved_size: u32,
    /// Bytes available to the host.
    pub available_size: u32,
}

/// `NVM_GET_DEV_INFO`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NvmGetDevInfo;

impl Command for NvmGetDevInfo {
    const OPCODE: Opcode = Opcode::NVM_GET_DEV_INFO;
    type Request = HeaderOnlyInput;
    type Output = NvmDevInfo;

    fn build(&self, _req: &mut HeaderOnlyInput) -> Result<()> {
        Ok(())
    }

    fn timeout_ms(&self) -> Option<u32> {
        Some(NVM_TIMEOUT_MS)
    }

    fn decode(&self, resp: &Response<'_>) -> Result<NvmDevInfo> {
        let out: GetDevInfoOutput = resp.parse();
        Ok(NvmDevInfo {
            manufacturer_id: out.manufacturer_id.get(),
            device_id: out.device_id.get(),
            sector_size: out.sector_size.get(),
            nvram_size: out.nvram_size.get(),
            reserved_size: out.reserved_size.get(),
            available_size: out.available_size.get(),
        })
    }
}

/// Outcome of `NVM_INSTALL_UPDATE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallResult {
    /// Bitmap of installed items.
    pub installed_items: u64,
    /// Firmware result code; zero on success.
    pub result: u8,
    /// Item that failed when `result` is non-zero.
    pub problem_item: u8,
    /// A reset is needed to activate the update.
    pub reset_required: bool,
}

/// `NVM_INSTALL_UPDATE`: installs a staged firmware package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NvmInstallUpdate {
    /// Directory type of the package.
    pub install_type: u32,
    /// Installation flags.
    pub flags: u16,
}

impl Command for NvmInstallUpdate {
    const OPCODE: Opcode = Opcode::NVM_INSTALL_UPDATE;
    type Request = InstallUpdateInput;
    type Output = InstallResult;

    fn build(&self, req: &mut InstallUpdateInput) -> Result<()> {
        req.install_type = U32::new(self.install_type);
        req.flags = U16::new(self.flags);
        Ok(())
    }

    fn timeout_ms(&self) -> Option<u32> {
        Some(NVM_TIMEOUT_MS)
    }

    fn decode(&self, resp: &Response<'_>) -> Result<InstallResult> {
        let out: InstallUpdateOutput = resp.parse();
        Ok(InstallResult {
            installed_items: out.installed_items.get(),
            result: out.result,
            problem_item: out.problem_item,
            reset_required: out.reset_required != 0,
        })
    }
}
