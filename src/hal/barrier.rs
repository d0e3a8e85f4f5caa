// Author: Lukas Bower
//! DMA ordering barriers around doorbell writes and completion reads.
#![allow(unsafe_code)]

use core::sync::atomic::{fence, Ordering};

/// Orders prior stores to device-visible memory before subsequent stores.
#[inline(always)]
pub fn dma_wmb() {
    fence(Ordering::Release);
    #[cfg(target_arch = "aarch64")]
    unsafe {
        core::arch::asm!("dmb ishst", options(nostack, preserves_flags));
    }
    #[cfg(target_arch = "x86_64")]
    unsafe {
        core::arch::asm!("sfence", options(nostack, preserves_flags));
    }
}

/// Orders a completion flag read before reads of the payload it guards.
#[inline(always)]
pub fn dma_rmb() {
    fence(Ordering::Acquire);
    // Only payload loads follow the marker check; the next store to the
    // device is ordered by `dma_wmb`, so a load-only barrier suffices.
    #[cfg(target_arch = "aarch64")]
    unsafe {
        core::arch::asm!("dmb ishld", options(nostack, preserves_flags));
    }
}
