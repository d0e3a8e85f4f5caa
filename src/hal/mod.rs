// Author: Lukas Bower

//! Device access seams used by the transport engine.
//!
//! The engine never touches raw pointers itself. It drives a register
//! window, two DMA buffers and a millisecond clock through the traits below,
//! so the same code runs against mapped hardware and against the host-side
//! firmware model behind the `sim` feature.

use thiserror::Error;

pub mod barrier;
pub mod dma;
pub mod mmio;

pub use dma::DmaRegion;
pub use mmio::MmioWindow;

/// Errors raised when wrapping a mapped region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegionError {
    /// The supplied virtual address was null.
    #[error("null virtual address")]
    NullVaddr,
    /// The supplied physical address was null.
    #[error("null physical address")]
    NullPaddr,
    /// The supplied range length was zero.
    #[error("empty range")]
    EmptyRange,
    /// The supplied virtual address is not 32-bit aligned.
    #[error("misaligned base address")]
    Misaligned,
}

/// Memory-mapped register window holding the direct request area and the doorbell.
pub trait RegisterWindow {
    /// Length of the mapped window in bytes.
    fn len(&self) -> usize;

    /// Writes one 32-bit register at `offset` in device (little-endian) order.
    ///
    /// `offset` must be 4-byte aligned and leave room for the full word.
    fn write32(&mut self, offset: usize, value: u32);
}

/// Coherent DMA buffer shared with firmware.
///
/// Offsets outside the buffer are ignored on write and read back as zero.
pub trait DmaBuffer {
    /// Bus address firmware uses to reach the buffer.
    fn paddr(&self) -> u64;

    /// Capacity of the buffer in bytes.
    fn len(&self) -> usize;

    /// Copies bytes out of the buffer starting at `offset`.
    fn read(&self, offset: usize, out: &mut [u8]);

    /// Copies bytes into the buffer starting at `offset`.
    fn write(&mut self, offset: usize, data: &[u8]);

    /// Sets `len` bytes starting at `offset` to `byte`.
    fn fill(&mut self, offset: usize, len: usize, byte: u8);

    /// Reads one byte.
    fn read_u8(&self, offset: usize) -> u8 {
        let mut byte = [0u8; 1];
        self.read(offset, &mut byte);
        byte[0]
    }

    /// Reads a little-endian half-word.
    fn read_u16_le(&self, offset: usize) -> u16 {
        let mut word = [0u8; 2];
        self.read(offset, &mut word);
        u16::from_le_bytes(word)
    }
}

/// Millisecond wait used between completion polls.
pub trait Delay {
    /// Blocks the caller for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

/// Busy-wait delay on the monotonic clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpinDelay;

impl Delay for SpinDelay {
    fn delay_ms(&mut self, ms: u32) {
        let deadline =
            std::time::Instant::now() + std::time::Duration::from_millis(u64::from(ms));
        while std::time::Instant::now() < deadline {
            core::hint::spin_loop();
        }
    }
}

/// Clips `[offset, offset + len)` to a buffer of `capacity` bytes.
pub(crate) fn clip(offset: usize, len: usize, capacity: usize) -> usize {
    capacity.saturating_sub(offset).min(len)
}
