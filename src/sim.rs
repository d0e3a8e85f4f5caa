// Author: Lukas Bower
// Purpose: Host-side firmware model for exercising the channel without hardware.

//! Simulated HWRM device.
//!
//! [`SimDevice`] owns a shared physical address space of DMA regions, a
//! register window and a virtual millisecond clock. Ringing the doorbell
//! decodes the window (resolving short descriptors through the staged
//! buffer), hands the request to a firmware callback and writes the reply
//! into the response buffer named by the request header. [`SimDelay`]
//! advances the clock instead of sleeping, so timeout paths run instantly.

use std::collections::BTreeMap;
use std::sync::Arc;

use hwrm_wire::{
    FwStatus, Opcode, ShortInput, DOORBELL_OFFSET, DOORBELL_TRIGGER, RESP_BUF_LEN,
    RESP_VALID_KEY, SHORT_CMD_SIGNATURE,
};
use spin::Mutex;
use zerocopy::{FromBytes, Immutable, IntoBytes};

use crate::channel::CommandChannel;
use crate::config::ChannelConfig;
use crate::error::Result;
use crate::hal::{clip, Delay, DmaBuffer, RegisterWindow};

/// Register window length exposed by [`SimDevice::channel`].
pub const SIM_WINDOW_LEN: usize = 0x200;
/// Physical address of the response buffer used by [`SimDevice::channel`].
pub const SIM_RESP_ADDR: u64 = 0x1000_0000;
/// Physical address of the staging buffer used by [`SimDevice::channel`].
pub const SIM_STAGING_ADDR: u64 = 0x2000_0000;
/// Staging buffer length used by [`SimDevice::channel`].
pub const SIM_STAGING_LEN: usize = 4096;

/// A request as firmware saw it at doorbell time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimRequest {
    /// Opcode from the request header.
    pub opcode: Opcode,
    /// Sequence number from the request header.
    pub seq: u16,
    /// Response address from the request header.
    pub resp_addr: u64,
    /// Request bytes: the staged request for short form, the window otherwise.
    pub bytes: Vec<u8>,
    /// Descriptor when the request arrived in short form.
    pub short: Option<ShortInput>,
}

impl SimRequest {
    /// Decodes the request as `T`, zero-extending short input.
    #[must_use]
    pub fn parse<T: FromBytes + IntoBytes + Immutable + zerocopy::KnownLayout>(&self) -> T {
        crate::command::Response::new(&self.bytes).parse()
    }
}

/// How the simulated firmware answers a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimReply {
    /// Successful response; status, header echo, length and valid marker
    /// are filled in.
    Respond(Vec<u8>),
    /// Error response carrying `status`.
    Status(FwStatus),
    /// Never answer.
    Stall,
    /// Write a successful response and its length but never the valid marker.
    StallMarker(Vec<u8>),
    /// Write bytes verbatim.
    RespondRaw(Vec<u8>),
    /// Publish the length after `length_after_ms` and the marker after
    /// `valid_after_ms` of simulated time.
    Deferred {
        /// Delay before the response body and length appear.
        length_after_ms: u64,
        /// Delay before the valid marker appears.
        valid_after_ms: u64,
        /// Response bytes, completed as for [`SimReply::Respond`].
        bytes: Vec<u8>,
    },
}

impl SimReply {
    /// Successful response with no payload.
    #[must_use]
    pub fn ok() -> Self {
        Self::Respond(vec![0; 16])
    }

    /// Successful response carrying `out`.
    #[must_use]
    pub fn respond<T: IntoBytes + Immutable>(out: &T) -> Self {
        Self::Respond(out.as_bytes().to_vec())
    }
}

type Firmware = Box<dyn FnMut(&SimRequest) -> SimReply + Send>;

struct Pending {
    resp_addr: u64,
    length_at: u64,
    valid_at: u64,
    bytes: Vec<u8>,
    length_done: bool,
}

struct SimState {
    regions: BTreeMap<u64, Vec<u8>>,
    window: Vec<u8>,
    window_writes: Vec<(usize, u32)>,
    doorbells: usize,
    clock_ms: u64,
    requests: Vec<SimRequest>,
    pending: Option<Pending>,
    firmware: Firmware,
}

impl SimState {
    fn region_mut(&mut self, paddr: u64) -> Option<(&mut Vec<u8>, usize)> {
        let (&base, mem) = self.regions.range_mut(..=paddr).next_back()?;
        let offset = usize::try_from(paddr - base).ok()?;
        (offset < mem.len()).then_some((mem, offset))
    }

    fn read_phys(&mut self, paddr: u64, len: usize) -> Vec<u8> {
        let mut out = vec![0u8; len];
        if let Some((mem, offset)) = self.region_mut(paddr) {
            let count = clip(offset, len, mem.len());
            out[..count].copy_from_slice(&mem[offset..offset + count]);
        }
        out
    }

    fn write_phys(&mut self, paddr: u64, offset: usize, data: &[u8]) {
        if let Some((mem, base)) = self.region_mut(paddr) {
            let start = base + offset;
            let count = clip(start, data.len(), mem.len());
            if count > 0 {
                mem[start..start + count].copy_from_slice(&data[..count]);
            }
        }
    }

    fn ring_doorbell(&mut self) {
        self.doorbells += 1;
        if self.window.len() < hwrm_wire::SHORT_REQ_LEN {
            return;
        }
        let window = &self.window;
        let word = |off: usize| u16::from_le_bytes([window[off], window[off + 1]]);
        let short = (word(2) == SHORT_CMD_SIGNATURE)
            .then(|| ShortInput::read_from_prefix(window).ok().map(|(desc, _)| desc))
            .flatten();

        let bytes = match short {
            Some(desc) => self.read_phys(desc.req_addr.get(), usize::from(desc.size.get())),
            None => self.window[..DOORBELL_OFFSET.min(self.window.len())].to_vec(),
        };
        let mut request = SimRequest {
            opcode: Opcode(0xffff),
            seq: 0,
            resp_addr: 0,
            bytes,
            short,
        };
        if request.bytes.len() >= 16 {
            let hdr: hwrm_wire::RequestHeader = request.parse();
            request.opcode = Opcode(hdr.req_type.get());
            request.seq = hdr.seq_id.get();
            request.resp_addr = hdr.resp_addr.get();
        }

        let reply = (self.firmware)(&request);
        let resp_addr = request.resp_addr;
        self.requests.push(request.clone());

        match reply {
            SimReply::Stall => {}
            SimReply::Respond(bytes) => {
                let bytes = complete(&request, bytes, FwStatus::SUCCESS, true);
                self.write_phys(resp_addr, 0, &bytes);
            }
            SimReply::Status(status) => {
                let bytes = complete(&request, vec![0u8; 16], status, true);
                self.write_phys(resp_addr, 0, &bytes);
            }
            SimReply::StallMarker(bytes) => {
                let bytes = complete(&request, bytes, FwStatus::SUCCESS, false);
                self.write_phys(resp_addr, 0, &bytes);
            }
            SimReply::RespondRaw(bytes) => self.write_phys(resp_addr, 0, &bytes),
            SimReply::Deferred {
                length_after_ms,
                valid_after_ms,
                bytes,
            } => {
                self.pending = Some(Pending {
                    resp_addr,
                    length_at: self.clock_ms + length_after_ms,
                    valid_at: self.clock_ms + valid_after_ms.max(length_after_ms),
                    bytes: complete(&request, bytes, FwStatus::SUCCESS, true),
                    length_done: false,
                });
                self.advance(0);
            }
        }
    }

    fn advance(&mut self, ms: u64) {
        self.clock_ms += ms;
        let Some(mut pending) = self.pending.take() else {
            return;
        };
        let now = self.clock_ms;
        if !pending.length_done && now >= pending.length_at {
            let body = pending.bytes.len().saturating_sub(1);
            self.write_phys(pending.resp_addr, 0, &pending.bytes[..body]);
            pending.length_done = true;
        }
        if pending.length_done && now >= pending.valid_at {
            self.write_phys(pending.resp_addr, 0, &pending.bytes);
            return;
        }
        self.pending = Some(pending);
    }
}

/// Fills in status, header echo and length, and optionally the marker.
fn complete(request: &SimRequest, mut bytes: Vec<u8>, status: FwStatus, valid: bool) -> Vec<u8> {
    if bytes.len() < 8 {
        bytes.resize(8, 0);
    }
    bytes.truncate(RESP_BUF_LEN);
    let len = bytes.len() as u16;
    bytes[..2].copy_from_slice(&status.0.to_le_bytes());
    bytes[2..4].copy_from_slice(&request.opcode.0.to_le_bytes());
    bytes[4..6].copy_from_slice(&request.seq.to_le_bytes());
    bytes[6..8].copy_from_slice(&len.to_le_bytes());
    let last = bytes.len() - 1;
    bytes[last] = if valid { RESP_VALID_KEY } else { 0 };
    bytes
}

/// Simulated device shared by the window, DMA and delay handles.
#[derive(Clone)]
pub struct SimDevice {
    state: Arc<Mutex<SimState>>,
}

impl SimDevice {
    /// Creates a device whose firmware answers through `firmware`.
    pub fn new<F>(firmware: F) -> Self
    where
        F: FnMut(&SimRequest) -> SimReply + Send + 'static,
    {
        Self {
            state: Arc::new(Mutex::new(SimState {
                regions: BTreeMap::new(),
                window: Vec::new(),
                window_writes: Vec::new(),
                doorbells: 0,
                clock_ms: 0,
                requests: Vec::new(),
                pending: None,
                firmware: Box::new(firmware),
            })),
        }
    }

    /// Device whose firmware answers every request with an empty success.
    #[must_use]
    pub fn always_ok() -> Self {
        Self::new(|_| SimReply::ok())
    }

    /// Replaces the firmware callback.
    pub fn set_firmware<F>(&self, firmware: F)
    where
        F: FnMut(&SimRequest) -> SimReply + Send + 'static,
    {
        self.state.lock().firmware = Box::new(firmware);
    }

    /// Maps a register window of `len` bytes.
    #[must_use]
    pub fn window(&self, len: usize) -> SimWindow {
        self.state.lock().window = vec![0; len];
        SimWindow {
            state: Arc::clone(&self.state),
            len,
        }
    }

    /// Allocates a zeroed DMA region at `paddr`.
    #[must_use]
    pub fn dma(&self, paddr: u64, len: usize) -> SimDma {
        self.state.lock().regions.insert(paddr, vec![0; len]);
        SimDma {
            state: Arc::clone(&self.state),
            paddr,
            len,
        }
    }

    /// Virtual clock handle.
    #[must_use]
    pub fn delay(&self) -> SimDelay {
        SimDelay {
            state: Arc::clone(&self.state),
        }
    }

    /// Builds a channel over a fresh window, response buffer and staging buffer.
    pub fn channel(&self, config: &ChannelConfig) -> Result<CommandChannel<SimWindow, SimDma, SimDelay>> {
        CommandChannel::new(
            config,
            self.window(SIM_WINDOW_LEN),
            self.dma(SIM_RESP_ADDR, RESP_BUF_LEN),
            self.dma(SIM_STAGING_ADDR, SIM_STAGING_LEN),
            self.delay(),
        )
    }

    /// Current window contents.
    #[must_use]
    pub fn window_bytes(&self) -> Vec<u8> {
        self.state.lock().window.clone()
    }

    /// Every `(offset, value)` register write so far.
    #[must_use]
    pub fn window_writes(&self) -> Vec<(usize, u32)> {
        self.state.lock().window_writes.clone()
    }

    /// Number of doorbell rings.
    #[must_use]
    pub fn doorbells(&self) -> usize {
        self.state.lock().doorbells
    }

    /// Simulated milliseconds elapsed.
    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        self.state.lock().clock_ms
    }

    /// Requests seen by firmware, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<SimRequest> {
        self.state.lock().requests.clone()
    }

    /// Contents of the DMA region starting at `paddr`.
    #[must_use]
    pub fn region_bytes(&self, paddr: u64) -> Vec<u8> {
        self.state
            .lock()
            .regions
            .get(&paddr)
            .cloned()
            .unwrap_or_default()
    }

    /// Overwrites memory at `paddr`, as a late firmware write would.
    pub fn poke(&self, paddr: u64, data: &[u8]) {
        self.state.lock().write_phys(paddr, 0, data);
    }
}

impl core::fmt::Debug for SimDevice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("SimDevice")
            .field("doorbells", &state.doorbells)
            .field("clock_ms", &state.clock_ms)
            .field("regions", &state.regions.len())
            .finish_non_exhaustive()
    }
}

/// Register window of a [`SimDevice`].
pub struct SimWindow {
    state: Arc<Mutex<SimState>>,
    len: usize,
}

impl RegisterWindow for SimWindow {
    fn len(&self) -> usize {
        self.len
    }

    fn write32(&mut self, offset: usize, value: u32) {
        let mut state = self.state.lock();
        state.window_writes.push((offset, value));
        if let Some(slot) = state.window.get_mut(offset..offset + 4) {
            slot.copy_from_slice(&value.to_le_bytes());
        }
        if offset == DOORBELL_OFFSET && value == DOORBELL_TRIGGER {
            state.ring_doorbell();
        }
    }
}

/// DMA region of a [`SimDevice`].
pub struct SimDma {
    state: Arc<Mutex<SimState>>,
    paddr: u64,
    len: usize,
}

impl DmaBuffer for SimDma {
    fn paddr(&self) -> u64 {
        self.paddr
    }

    fn len(&self) -> usize {
        self.len
    }

    fn read(&self, offset: usize, out: &mut [u8]) {
        let state = self.state.lock();
        out.fill(0);
        if let Some(mem) = state.regions.get(&self.paddr) {
            let count = clip(offset, out.len(), mem.len());
            if count > 0 {
                out[..count].copy_from_slice(&mem[offset..offset + count]);
            }
        }
    }

    fn write(&mut self, offset: usize, data: &[u8]) {
        self.state.lock().write_phys(self.paddr, offset, data);
    }

    fn fill(&mut self, offset: usize, len: usize, byte: u8) {
        let mut state = self.state.lock();
        if let Some(mem) = state.regions.get_mut(&self.paddr) {
            let count = clip(offset, len, mem.len());
            if count > 0 {
                mem[offset..offset + count].fill(byte);
            }
        }
    }
}

/// Virtual clock of a [`SimDevice`].
pub struct SimDelay {
    state: Arc<Mutex<SimState>>,
}

impl Delay for SimDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.state.lock().advance(u64::from(ms));
    }
}
