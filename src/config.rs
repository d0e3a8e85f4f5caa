// Author: Lukas Bower
// Purpose: Channel tunables loaded from TOML or built in code.

//! Command channel configuration.
//!
//! Values here describe the channel before the version handshake. Limits
//! and the default timeout learned from firmware replace them at runtime.

use hwrm_wire::{DEFAULT_MAX_REQ_LEN, HANDSHAKE_TIMEOUT_MS, MAX_DIRECT_WINDOW_LEN};
use serde::Deserialize;
use thiserror::Error;

use crate::commands::backing_store::PageSize;

/// Errors raised while loading or validating a [`ChannelConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("failed to parse channel config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A field holds a value the channel cannot use.
    #[error("invalid channel config: {0}")]
    Invalid(&'static str),
}

/// Tunables for one command channel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChannelConfig {
    /// Capacity of the direct request window in bytes.
    pub max_req_len: usize,
    /// Largest request accepted through the short form.
    pub max_ext_req_len: usize,
    /// Send every request in short form.
    pub short_cmd_required: bool,
    /// Completion budget in milliseconds.
    pub timeout_ms: u32,
    /// Host page size in bytes used for backing-store page tables.
    pub page_size: u32,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            max_req_len: DEFAULT_MAX_REQ_LEN,
            max_ext_req_len: DEFAULT_MAX_REQ_LEN,
            short_cmd_required: false,
            timeout_ms: HANDSHAKE_TIMEOUT_MS,
            page_size: 4096,
        }
    }
}

impl ChannelConfig {
    /// Parses and validates a TOML document; absent keys take defaults.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every field is usable by the transport.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.check().map_err(ConfigError::Invalid)
    }

    pub(crate) fn check(&self) -> Result<(), &'static str> {
        if self.max_req_len == 0 || self.max_req_len % 4 != 0 {
            return Err("max_req_len must be a non-zero multiple of 4");
        }
        if self.max_req_len > MAX_DIRECT_WINDOW_LEN {
            return Err("max_req_len overlaps the doorbell register");
        }
        if self.max_ext_req_len < hwrm_wire::SHORT_REQ_LEN {
            return Err("max_ext_req_len below short descriptor size");
        }
        if self.timeout_ms == 0 {
            return Err("timeout_ms must be non-zero");
        }
        if self.host_page_size().is_none() {
            return Err("page_size must be 4096, 8192 or 65536");
        }
        Ok(())
    }

    /// Host page size as understood by the backing-store encoder.
    #[must_use]
    pub fn host_page_size(&self) -> Option<PageSize> {
        PageSize::from_bytes(self.page_size)
    }

    /// Sets the direct window capacity.
    #[must_use]
    pub fn with_max_req_len(mut self, len: usize) -> Self {
        self.max_req_len = len;
        self
    }

    /// Sets the short-form length limit.
    #[must_use]
    pub fn with_max_ext_req_len(mut self, len: usize) -> Self {
        self.max_ext_req_len = len;
        self
    }

    /// Forces every request through the short form.
    #[must_use]
    pub fn with_short_cmd_required(mut self, required: bool) -> Self {
        self.short_cmd_required = required;
        self
    }

    /// Sets the completion budget.
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Sets the host page size.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }
}
