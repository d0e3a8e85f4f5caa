// Author: Lukas Bower
// Purpose: Single in-flight request engine: window copy, doorbell, completion polling.

//! Transport engine.
//!
//! One call to [`Engine::transact`] walks the request through
//! `Idle -> HeaderStamped -> Transmitting -> AwaitingLength -> AwaitingValid
//! -> Decoded` and ends in `Success`, `FirmwareError` or `Timeout`. The engine
//! never retries. It assumes exclusive access; [`crate::CommandChannel`]
//! provides that.

use hwrm_wire::{
    FwStatus, DOORBELL_OFFSET, DOORBELL_TRIGGER, RESP_ERROR_CODE_OFFSET, RESP_LEN_OFFSET,
    RESP_VALID_KEY, SHORT_REQ_LEN,
};
use log::{debug, trace, warn};
use zerocopy::IntoBytes;

use crate::error::{HwrmError, PollStage, Result};
use crate::hal::barrier::{dma_rmb, dma_wmb};
use crate::hal::{DmaBuffer, Delay, RegisterWindow};
use crate::header::{opcode_of, set_seq};
use crate::short_cmd;

/// Progress of the most recent request through the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    /// No request has been issued yet.
    Idle,
    /// Sequence number assigned and response buffer cleared.
    HeaderStamped,
    /// Request bytes are being written to the window.
    Transmitting,
    /// Doorbell rung; waiting for a plausible response length.
    AwaitingLength,
    /// Length seen; waiting for the trailing valid marker.
    AwaitingValid,
    /// Response complete; status being decoded.
    Decoded,
    /// Firmware reported success.
    Success,
    /// Firmware reported a non-zero status.
    FirmwareError,
    /// A poll stage exhausted its budget.
    Timeout,
}

/// Negotiated size limits of the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Capacity of the direct request window.
    pub max_req_len: usize,
    /// Largest request accepted through the short form.
    pub max_ext_req_len: usize,
    /// Every request must use the short form.
    pub short_cmd_required: bool,
}

impl Limits {
    /// Returns true when a request of `len` bytes must go out in short form.
    #[must_use]
    pub const fn needs_short(&self, len: usize) -> bool {
        self.short_cmd_required || len > self.max_req_len
    }
}

/// Owner of the register window, response buffer and staging buffer.
pub struct Engine<W, B, D> {
    window: W,
    resp: B,
    staging: B,
    delay: D,
    seq: u16,
    limits: Limits,
    state: TransportState,
}

impl<W, B, D> Engine<W, B, D>
where
    W: RegisterWindow,
    B: DmaBuffer,
    D: Delay,
{
    /// Assembles an engine; callers validate sizes beforehand.
    pub fn new(window: W, resp: B, staging: B, delay: D, limits: Limits) -> Self {
        Self {
            window,
            resp,
            staging,
            delay,
            seq: 0,
            limits,
            state: TransportState::Idle,
        }
    }

    /// Physical address of the response buffer.
    #[must_use]
    pub fn resp_addr(&self) -> u64 {
        self.resp.paddr()
    }

    /// Capacity of the response buffer.
    #[must_use]
    pub fn resp_capacity(&self) -> usize {
        self.resp.len()
    }

    /// Capacity of the short-form staging buffer.
    #[must_use]
    pub fn staging_capacity(&self) -> usize {
        self.staging.len()
    }

    /// Current limits.
    #[must_use]
    pub const fn limits(&self) -> Limits {
        self.limits
    }

    /// Replaces the limits, typically after the version handshake.
    pub fn set_limits(&mut self, limits: Limits) {
        self.limits = limits;
    }

    /// Sequence number the next request will carry.
    #[must_use]
    pub const fn next_seq(&self) -> u16 {
        self.seq
    }

    /// State reached by the most recent request.
    #[must_use]
    pub const fn state(&self) -> TransportState {
        self.state
    }

    /// Sends `request` and waits up to `timeout_ms` for its completion.
    ///
    /// `request` must start with a stamped header; its sequence number is
    /// overwritten. Returns the reported response length on success.
    pub fn transact(&mut self, request: &mut [u8], timeout_ms: u32) -> Result<u16> {
        let opcode = opcode_of(request);
        let seq = self.seq;
        self.seq = self.seq.wrapping_add(1);
        set_seq(request, seq);
        self.resp.fill(0, self.resp.len(), 0);
        self.enter(TransportState::HeaderStamped);

        self.enter(TransportState::Transmitting);
        if self.limits.needs_short(request.len()) {
            let desc = match short_cmd::stage(&mut self.staging, request, self.limits.max_ext_req_len)
            {
                Ok(desc) => desc,
                Err(err) => {
                    self.state = TransportState::Idle;
                    return Err(err);
                }
            };
            self.transmit(desc.as_bytes(), SHORT_REQ_LEN);
        } else {
            self.transmit(request, self.limits.max_req_len);
        }

        self.enter(TransportState::AwaitingLength);
        let Some(len) = self.poll_length(timeout_ms) else {
            self.enter(TransportState::Timeout);
            warn!(
                "[hwrm] {opcode} (seq {seq:#x}) timed out after {timeout_ms} ms: response length never valid"
            );
            return Err(HwrmError::Timeout {
                opcode,
                stage: PollStage::Length,
                timeout_ms,
            });
        };

        self.enter(TransportState::AwaitingValid);
        if !self.poll_valid(usize::from(len) - 1, timeout_ms) {
            self.enter(TransportState::Timeout);
            warn!(
                "[hwrm] {opcode} (seq {seq:#x}) timed out after {timeout_ms} ms: valid marker missing at byte {}",
                len - 1
            );
            return Err(HwrmError::Timeout {
                opcode,
                stage: PollStage::ValidMarker,
                timeout_ms,
            });
        }
        dma_rmb();

        self.enter(TransportState::Decoded);
        let status = FwStatus(self.resp.read_u16_le(RESP_ERROR_CODE_OFFSET));
        if status.is_success() {
            self.enter(TransportState::Success);
            return Ok(len);
        }

        self.enter(TransportState::FirmwareError);
        if status == FwStatus::FAIL {
            debug!("[hwrm] {opcode} (seq {seq:#x}) returned {status}");
        } else {
            warn!("[hwrm] {opcode} (seq {seq:#x}) failed: {status}");
        }
        Err(HwrmError::Firmware { opcode, status })
    }

    /// Copies the response buffer into `out`, starting at byte 0.
    pub fn read_response(&self, out: &mut [u8]) {
        self.resp.read(0, out);
    }

    fn enter(&mut self, state: TransportState) {
        trace!("[hwrm] transport {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    /// Copies `bytes` into the window a word at a time, zero-fills up to
    /// `fill_len`, then rings the doorbell.
    fn transmit(&mut self, bytes: &[u8], fill_len: usize) {
        let mut offset = 0;
        for chunk in bytes.chunks(4) {
            let mut word = [0u8; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            self.window.write32(offset, u32::from_le_bytes(word));
            offset += 4;
        }
        while offset < fill_len {
            self.window.write32(offset, 0);
            offset += 4;
        }
        dma_wmb();
        self.window.write32(DOORBELL_OFFSET, DOORBELL_TRIGGER);
    }

    fn poll_length(&mut self, timeout_ms: u32) -> Option<u16> {
        let capacity = self.resp.len();
        for _ in 0..timeout_ms {
            let len = self.resp.read_u16_le(RESP_LEN_OFFSET);
            if len != 0 && usize::from(len) <= capacity {
                return Some(len);
            }
            self.delay.delay_ms(1);
        }
        None
    }

    fn poll_valid(&mut self, marker: usize, timeout_ms: u32) -> bool {
        for _ in 0..timeout_ms {
            if self.resp.read_u8(marker) == RESP_VALID_KEY {
                return true;
            }
            self.delay.delay_ms(1);
        }
        false
    }
}

impl<W, B, D> core::fmt::Debug for Engine<W, B, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Engine")
            .field("seq", &self.seq)
            .field("limits", &self.limits)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
