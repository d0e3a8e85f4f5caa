// Author: Lukas Bower
// Purpose: Volatile view over a coherent DMA buffer shared with firmware.
#![allow(unsafe_code)]

use core::ptr::{self, NonNull};

use super::{clip, DmaBuffer, RegionError};

/// Coherent DMA buffer mapped into the driver.
#[derive(Debug)]
pub struct DmaRegion {
    vaddr: NonNull<u8>,
    paddr: u64,
    len: usize,
}

// Access goes through `&self`/`&mut self` under the channel gate only.
unsafe impl Send for DmaRegion {}

impl DmaRegion {
    /// Wraps an allocated coherent buffer.
    ///
    /// # Safety
    ///
    /// `vaddr` must map `len` bytes of coherent memory reachable by the
    /// device at `paddr` for the lifetime of the returned value.
    pub unsafe fn new(vaddr: *mut u8, paddr: u64, len: usize) -> Result<Self, RegionError> {
        let vaddr = NonNull::new(vaddr).ok_or(RegionError::NullVaddr)?;
        if paddr == 0 {
            return Err(RegionError::NullPaddr);
        }
        if len == 0 {
            return Err(RegionError::EmptyRange);
        }
        Ok(Self { vaddr, paddr, len })
    }

    /// Virtual base address of the buffer.
    #[must_use]
    pub const fn vaddr(&self) -> *mut u8 {
        self.vaddr.as_ptr()
    }
}

impl DmaBuffer for DmaRegion {
    fn paddr(&self) -> u64 {
        self.paddr
    }

    fn len(&self) -> usize {
        self.len
    }

    fn read(&self, offset: usize, out: &mut [u8]) {
        let count = clip(offset, out.len(), self.len);
        for (idx, slot) in out.iter_mut().enumerate() {
            *slot = if idx < count {
                // SAFETY: offset + idx < len by `clip`.
                unsafe { ptr::read_volatile(self.vaddr.as_ptr().add(offset + idx)) }
            } else {
                0
            };
        }
    }

    fn write(&mut self, offset: usize, data: &[u8]) {
        let count = clip(offset, data.len(), self.len);
        for (idx, byte) in data[..count].iter().enumerate() {
            // SAFETY: offset + idx < len by `clip`.
            unsafe { ptr::write_volatile(self.vaddr.as_ptr().add(offset + idx), *byte) };
        }
    }

    fn fill(&mut self, offset: usize, len: usize, byte: u8) {
        let count = clip(offset, len, self.len);
        for idx in 0..count {
            // SAFETY: offset + idx < len by `clip`.
            unsafe { ptr::write_volatile(self.vaddr.as_ptr().add(offset + idx), byte) };
        }
    }
}
