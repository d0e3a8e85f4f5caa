// Author: Lukas Bower
// Purpose: Serialise firmware commands over one register window and response buffer.

//! The command channel.
//!
//! A [`CommandChannel`] owns one transport engine behind a spin mutex. Every
//! operation holds the lock from header stamping until the response has
//! been decoded, so at most one command is ever in flight.

use core::mem::size_of;

use hwrm_wire::{
    Opcode, RequestHeader, DEFAULT_MAX_REQ_LEN, DOORBELL_OFFSET, HANDSHAKE_TIMEOUT_MS,
    NVM_TIMEOUT_MS, RESP_BUF_LEN, SHORT_REQ_LEN,
};
use log::{info, warn};
use spin::Mutex;
use zerocopy::byteorder::little_endian::U64;
use zerocopy::{FromBytes, FromZeros, IntoBytes};

use crate::command::{Command, Response};
use crate::commands::ver::{Capabilities, FirmwareInfo, VerGet};
use crate::config::ChannelConfig;
use crate::error::{HwrmError, Result};
use crate::hal::{Delay, DmaBuffer, RegisterWindow};
use crate::header::{init_header, opcode_of};
use crate::transport::{Engine, Limits, TransportState};

struct Inner<W, B, D> {
    engine: Engine<W, B, D>,
    timeout_ms: u32,
    caps: Option<Capabilities>,
}

/// Firmware command channel of one device.
pub struct CommandChannel<W, B, D> {
    inner: Mutex<Inner<W, B, D>>,
}

impl<W, B, D> CommandChannel<W, B, D>
where
    W: RegisterWindow,
    B: DmaBuffer,
    D: Delay,
{
    /// Builds a channel over a mapped window, response buffer and staging buffer.
    pub fn new(config: &ChannelConfig, window: W, resp: B, staging: B, delay: D) -> Result<Self> {
        config
            .check()
            .map_err(|reason| HwrmError::InvalidRequest { reason })?;
        if window.len() < DOORBELL_OFFSET + 4 {
            return Err(HwrmError::InvalidRequest {
                reason: "register window does not reach the doorbell",
            });
        }
        if resp.len() < size_of::<hwrm_wire::ErrOutput>() || resp.len() > RESP_BUF_LEN {
            return Err(HwrmError::InvalidRequest {
                reason: "response buffer must hold an error response and fit one page",
            });
        }
        if staging.len() < SHORT_REQ_LEN {
            return Err(HwrmError::InvalidRequest {
                reason: "staging buffer smaller than a short descriptor",
            });
        }

        let limits = Limits {
            max_req_len: config.max_req_len,
            max_ext_req_len: config.max_ext_req_len.min(staging.len()),
            short_cmd_required: config.short_cmd_required,
        };
        info!(
            "[hwrm] channel ready: window={}B resp={:#x} staging={:#x} timeout={}ms",
            limits.max_req_len,
            resp.paddr(),
            staging.paddr(),
            config.timeout_ms
        );
        Ok(Self {
            inner: Mutex::new(Inner {
                engine: Engine::new(window, resp, staging, delay, limits),
                timeout_ms: config.timeout_ms,
                caps: None,
            }),
        })
    }

    /// Runs `cmd` with its own budget or the channel default.
    pub fn execute<C: Command>(&self, cmd: &C) -> Result<C::Output> {
        let mut inner = self.inner.lock();
        let timeout_ms = cmd.timeout_ms().unwrap_or(inner.timeout_ms);
        Self::run(&mut inner, cmd, timeout_ms)
    }

    /// Runs `cmd` with a caller-supplied budget for this call only.
    pub fn execute_with_timeout<C: Command>(&self, cmd: &C, timeout_ms: u32) -> Result<C::Output> {
        let mut inner = self.inner.lock();
        Self::run(&mut inner, cmd, timeout_ms)
    }

    /// Sends a caller-built request and copies `resp.len()` bytes of the response out.
    ///
    /// Only the response address is stamped. `NVM_INSTALL_UPDATE` runs with the
    /// NVM budget; everything else gets the larger of `app_timeout_ms` and the
    /// channel default.
    pub fn passthrough(&self, req: &mut [u8], resp: &mut [u8], app_timeout_ms: u32) -> Result<()> {
        let Ok((header, _)) = RequestHeader::mut_from_prefix(req) else {
            return Err(HwrmError::InvalidRequest {
                reason: "passthrough request shorter than a header",
            });
        };
        let mut inner = self.inner.lock();
        header.resp_addr = U64::new(inner.engine.resp_addr());
        let opcode = opcode_of(req);
        let timeout_ms = if opcode == Opcode::NVM_INSTALL_UPDATE {
            NVM_TIMEOUT_MS
        } else {
            app_timeout_ms.max(inner.timeout_ms)
        };

        match inner.engine.transact(req, timeout_ms) {
            Ok(_) => {
                inner.engine.read_response(resp);
                Ok(())
            }
            Err(err) => {
                warn!("[hwrm] passthrough {opcode} failed: {err}");
                Err(err)
            }
        }
    }

    /// Runs the version handshake and adopts the limits firmware reports.
    pub fn handshake(&self) -> Result<FirmwareInfo> {
        let mut inner = self.inner.lock();
        let staging = inner.engine.staging_capacity();
        let mut limits = inner.engine.limits();
        limits.max_req_len = DEFAULT_MAX_REQ_LEN;
        inner.engine.set_limits(limits);
        inner.timeout_ms = HANDSHAKE_TIMEOUT_MS;

        let fw = Self::run(&mut inner, &VerGet, HANDSHAKE_TIMEOUT_MS)?;
        let caps = fw.caps;
        inner.engine.set_limits(caps.limits(limits, staging));
        inner.timeout_ms = caps.timeout_ms;
        inner.caps = Some(caps);
        info!(
            "[hwrm] firmware {} interface {} window={}B ext={}B short={} timeout={}ms",
            fw.fw_version,
            fw.intf_version,
            inner.engine.limits().max_req_len,
            inner.engine.limits().max_ext_req_len,
            inner.engine.limits().short_cmd_required,
            inner.timeout_ms
        );
        Ok(fw)
    }

    /// Capabilities adopted by the last successful handshake.
    #[must_use]
    pub fn capabilities(&self) -> Option<Capabilities> {
        self.inner.lock().caps
    }

    /// Current size limits.
    #[must_use]
    pub fn limits(&self) -> Limits {
        self.inner.lock().engine.limits()
    }

    /// Default completion budget.
    #[must_use]
    pub fn timeout_ms(&self) -> u32 {
        self.inner.lock().timeout_ms
    }

    /// Replaces the default completion budget.
    pub fn set_timeout_ms(&self, timeout_ms: u32) {
        self.inner.lock().timeout_ms = timeout_ms;
    }

    /// Sequence number the next request will carry.
    #[must_use]
    pub fn next_seq(&self) -> u16 {
        self.inner.lock().engine.next_seq()
    }

    /// State reached by the most recent request.
    #[must_use]
    pub fn last_state(&self) -> TransportState {
        self.inner.lock().engine.state()
    }

    fn run<C: Command>(inner: &mut Inner<W, B, D>, cmd: &C, timeout_ms: u32) -> Result<C::Output> {
        let mut req = C::Request::new_zeroed();
        cmd.build(&mut req)?;
        let limits = inner.engine.limits();
        let len = cmd.request_len(&limits).min(size_of::<C::Request>());

        let bytes = req.as_mut_bytes();
        let (header, _) =
            RequestHeader::mut_from_prefix(bytes).map_err(|_| HwrmError::InvalidRequest {
                reason: "request layout lacks a header",
            })?;
        init_header(header, C::OPCODE, inner.engine.resp_addr());

        let resp_len = inner.engine.transact(&mut bytes[..len], timeout_ms)?;
        let mut resp = vec![0u8; usize::from(resp_len)];
        inner.engine.read_response(&mut resp);
        cmd.decode(&Response::new(&resp))
    }
}

impl<W, B, D> core::fmt::Debug for CommandChannel<W, B, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CommandChannel").finish_non_exhaustive()
    }
}
