// Author: Lukas Bower
//! Volatile access to a mapped register BAR.
#![allow(unsafe_code)]

use core::ptr::{self, NonNull};

use super::{RegionError, RegisterWindow};

/// Mapped HWRM register window.
#[derive(Debug)]
pub struct MmioWindow {
    base: NonNull<u8>,
    len: usize,
}

// The window is only reached through `&mut self`, which the channel gate serialises.
unsafe impl Send for MmioWindow {}

impl MmioWindow {
    /// Wraps an existing device mapping.
    ///
    /// # Safety
    ///
    /// `base` must point at `len` bytes of device memory mapped uncached for
    /// the lifetime of the returned value, and nothing else may write it.
    pub unsafe fn new(base: *mut u8, len: usize) -> Result<Self, RegionError> {
        let base = NonNull::new(base).ok_or(RegionError::NullVaddr)?;
        if len == 0 {
            return Err(RegionError::EmptyRange);
        }
        if base.as_ptr() as usize % 4 != 0 {
            return Err(RegionError::Misaligned);
        }
        Ok(Self { base, len })
    }

    /// Returns the virtual base pointer of the mapping.
    #[must_use]
    pub const fn as_ptr(&self) -> *mut u8 {
        self.base.as_ptr()
    }
}

impl RegisterWindow for MmioWindow {
    fn len(&self) -> usize {
        self.len
    }

    fn write32(&mut self, offset: usize, value: u32) {
        if offset % 4 != 0 || offset.checked_add(4).map_or(true, |end| end > self.len) {
            log::error!("[hwrm] mmio write32 out of window: offset={offset:#x}");
            return;
        }
        // SAFETY: bounds and alignment checked above; mapping validity per `new`.
        unsafe {
            ptr::write_volatile(self.base.as_ptr().add(offset).cast::<u32>(), value.to_le());
        }
    }
}
