// Author: Lukas Bower
#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Command channel to the HWRM firmware processor of bnxt NICs.
//!
//! Requests are fixed-format little-endian structures written into a
//! memory-mapped window; firmware answers into a DMA response buffer whose
//! trailing valid byte marks completion. [`CommandChannel`] serialises
//! callers, [`transport::Engine`] drives the doorbell and polling, and the
//! [`commands`] module holds typed encoders built on [`Command`].

pub mod channel;
pub mod command;
pub mod commands;
pub mod config;
pub mod error;
pub mod hal;
pub mod header;
pub mod short_cmd;
#[cfg(any(test, feature = "sim"))]
pub mod sim;
pub mod transport;

pub use channel::CommandChannel;
pub use command::{Command, Response};
pub use config::{ChannelConfig, ConfigError};
pub use error::{map_status, ErrorKind, HwrmError, PollStage, Result};
pub use hwrm_wire as wire;
pub use transport::{Limits, TransportState};
