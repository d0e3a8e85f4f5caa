// Author: Lukas Bower
// Purpose: Driver registration, unregistration and function reset.

//! Function lifecycle commands.

use hwrm_wire::func::{
    os_type, DrvRgtrEnables, DrvUnrgtrFlags, FuncDrvRgtrInput, FuncDrvUnrgtrInput,
    FuncResetInput,
};
use hwrm_wire::Opcode;
use zerocopy::byteorder::little_endian::{U16, U32};

use crate::command::{Command, Response};
use crate::error::Result;

/// `FUNC_DRV_RGTR`: announces the driver's OS and version to firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverRegister {
    /// Host OS identifier, see [`os_type`].
    pub os_type: u16,
    /// Driver `maj.min.upd`.
    pub version: (u8, u8, u8),
}

impl Default for DriverRegister {
    fn default() -> Self {
        Self {
            os_type: if cfg!(target_os = "linux") {
                os_type::LINUX
            } else if cfg!(target_os = "freebsd") {
                os_type::FREEBSD
            } else {
                os_type::OTHER
            },
            version: (0, 1, 0),
        }
    }
}

impl Command for DriverRegister {
    const OPCODE: Opcode = Opcode::FUNC_DRV_RGTR;
    type Request = FuncDrvRgtrInput;
    type Output = ();

    fn build(&self, req: &mut FuncDrvRgtrInput) -> Result<()> {
        req.enables = U32::new((DrvRgtrEnables::VER | DrvRgtrEnables::OS_TYPE).bits());
        req.os_type = U16::new(self.os_type);
        (req.ver_maj, req.ver_min, req.ver_upd) = self.version;
        Ok(())
    }

    fn decode(&self, _resp: &Response<'_>) -> Result<()> {
        Ok(())
    }
}

/// `FUNC_DRV_UNRGTR`: detaches the driver from firmware.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverUnregister {
    /// Tell firmware the host is shutting down.
    pub shutdown: bool,
}

impl Command for DriverUnregister {
    const OPCODE: Opcode = Opcode::FUNC_DRV_UNRGTR;
    type Request = FuncDrvUnrgtrInput;
    type Output = ();

    fn build(&self, req: &mut FuncDrvUnrgtrInput) -> Result<()> {
        if self.shutdown {
            req.flags = U32::new(DrvUnrgtrFlags::PREPARE_FOR_SHUTDOWN.bits());
        }
        Ok(())
    }

    fn decode(&self, _resp: &Response<'_>) -> Result<()> {
        Ok(())
    }
}

/// `FUNC_RESET` of the issuing function.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FuncReset;

impl Command for FuncReset {
    const OPCODE: Opcode = Opcode::FUNC_RESET;
    type Request = FuncResetInput;
    type Output = ();

    fn build(&self, req: &mut FuncResetInput) -> Result<()> {
        req.enables = U32::new(0);
        Ok(())
    }

    fn decode(&self, _resp: &Response<'_>) -> Result<()> {
        Ok(())
    }
}
