// Author: Lukas Bower
// Purpose: Portable error taxonomy for firmware command failures.

//! Error types surfaced by the command channel.

use core::fmt;

use hwrm_wire::{FwStatus, Opcode};
use thiserror::Error;

/// Portable category of a failed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad parameters, flags or enables.
    InvalidArgument,
    /// Firmware denied access to the resource.
    PermissionDenied,
    /// Firmware could not allocate the resource.
    OutOfResources,
    /// The opcode is not implemented by this firmware.
    Unsupported,
    /// Expected negative result; not an anomaly.
    GenericFailure,
    /// Unknown or internal firmware fault.
    DeviceError,
    /// No completion within the budget.
    Timeout,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::InvalidArgument => "invalid argument",
            Self::PermissionDenied => "permission denied",
            Self::OutOfResources => "out of resources",
            Self::Unsupported => "unsupported",
            Self::GenericFailure => "generic failure",
            Self::DeviceError => "device error",
            Self::Timeout => "timeout",
        };
        f.write_str(label)
    }
}

/// Maps a firmware status to its portable kind; `None` means success.
#[must_use]
pub const fn map_status(status: FwStatus) -> Option<ErrorKind> {
    Some(match status {
        FwStatus::SUCCESS => return None,
        FwStatus::FAIL => ErrorKind::GenericFailure,
        FwStatus::INVALID_PARAMS | FwStatus::INVALID_FLAGS | FwStatus::INVALID_ENABLES => {
            ErrorKind::InvalidArgument
        }
        FwStatus::RESOURCE_ACCESS_DENIED => ErrorKind::PermissionDenied,
        FwStatus::RESOURCE_ALLOC_ERROR => ErrorKind::OutOfResources,
        FwStatus::CMD_NOT_SUPPORTED => ErrorKind::Unsupported,
        _ => ErrorKind::DeviceError,
    })
}

/// Poll stage that ran out of budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStage {
    /// The response length never became plausible.
    Length,
    /// The trailing valid marker never appeared.
    ValidMarker,
}

impl fmt::Display for PollStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length => f.write_str("response length"),
            Self::ValidMarker => f.write_str("valid marker"),
        }
    }
}

/// Errors surfaced by the command channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HwrmError {
    /// Firmware completed the command with a non-zero status.
    #[error("{opcode} failed with firmware status {status}")]
    Firmware {
        /// Opcode of the failed command.
        opcode: Opcode,
        /// Status reported by firmware.
        status: FwStatus,
    },
    /// Firmware did not complete the command in time.
    #[error("{opcode} timed out waiting for {stage} after {timeout_ms} ms")]
    Timeout {
        /// Opcode of the command.
        opcode: Opcode,
        /// Poll stage that expired.
        stage: PollStage,
        /// Budget that was exhausted.
        timeout_ms: u32,
    },
    /// The request does not fit any transmit path.
    #[error("request of {len} bytes exceeds the {max} byte limit")]
    RequestTooLarge {
        /// Request length.
        len: usize,
        /// Largest length the channel accepts.
        max: usize,
    },
    /// The request or channel setup is malformed.
    #[error("invalid request: {reason}")]
    InvalidRequest {
        /// What was wrong.
        reason: &'static str,
    },
}

impl HwrmError {
    /// Returns the portable category of the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Firmware { status, .. } => match map_status(*status) {
                Some(kind) => kind,
                None => ErrorKind::DeviceError,
            },
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::RequestTooLarge { .. } | Self::InvalidRequest { .. } => {
                ErrorKind::InvalidArgument
            }
        }
    }

    /// Returns the firmware status for firmware-reported failures.
    #[must_use]
    pub const fn status(&self) -> Option<FwStatus> {
        match self {
            Self::Firmware { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, HwrmError>;
