// Author: Lukas Bower
//! Firmware completion status codes.

use core::fmt;

/// Status reported in a response's `error_code` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FwStatus(pub u16);

impl FwStatus {
    /// Command completed.
    pub const SUCCESS: Self = Self(0x0);
    /// Generic failure; also the expected answer to many negative probes.
    pub const FAIL: Self = Self(0x1);
    /// Malformed or out-of-range parameters.
    pub const INVALID_PARAMS: Self = Self(0x2);
    /// Function lacks rights to the resource.
    pub const RESOURCE_ACCESS_DENIED: Self = Self(0x3);
    /// Firmware could not allocate the resource.
    pub const RESOURCE_ALLOC_ERROR: Self = Self(0x4);
    /// Unsupported flag combination.
    pub const INVALID_FLAGS: Self = Self(0x5);
    /// Unsupported enables combination.
    pub const INVALID_ENABLES: Self = Self(0x6);
    /// Internal firmware fault.
    pub const HWRM_ERROR: Self = Self(0xf);
    /// Firmware could not classify the failure.
    pub const UNKNOWN_ERR: Self = Self(0xfffe);
    /// Opcode not implemented by this firmware.
    pub const CMD_NOT_SUPPORTED: Self = Self(0xffff);

    /// Every status code with a defined meaning.
    pub const KNOWN: [Self; 10] = [
        Self::SUCCESS,
        Self::FAIL,
        Self::INVALID_PARAMS,
        Self::RESOURCE_ACCESS_DENIED,
        Self::RESOURCE_ALLOC_ERROR,
        Self::INVALID_FLAGS,
        Self::INVALID_ENABLES,
        Self::HWRM_ERROR,
        Self::UNKNOWN_ERR,
        Self::CMD_NOT_SUPPORTED,
    ];

    /// Returns true when the status reports success.
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 == Self::SUCCESS.0
    }

    /// Returns the firmware name of the status, if known.
    #[must_use]
    pub const fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::SUCCESS => "SUCCESS",
            Self::FAIL => "FAIL",
            Self::INVALID_PARAMS => "INVALID_PARAMS",
            Self::RESOURCE_ACCESS_DENIED => "RESOURCE_ACCESS_DENIED",
            Self::RESOURCE_ALLOC_ERROR => "RESOURCE_ALLOC_ERROR",
            Self::INVALID_FLAGS => "INVALID_FLAGS",
            Self::INVALID_ENABLES => "INVALID_ENABLES",
            Self::HWRM_ERROR => "HWRM_ERROR",
            Self::UNKNOWN_ERR => "UNKNOWN_ERR",
            Self::CMD_NOT_SUPPORTED => "CMD_NOT_SUPPORTED",
            _ => return None,
        })
    }
}

impl From<u16> for FwStatus {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl fmt::Display for FwStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "0x{:04x}", self.0),
        }
    }
}
