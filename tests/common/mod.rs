// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.1
// Date Modified: 2026-10-16
// Author: Lukas Bower

#![allow(dead_code)]

use bnxt_hwrm::sim::SimDevice;
use bnxt_hwrm::wire::Opcode;
use bnxt_hwrm::{ChannelConfig, Command, CommandChannel, Response, Result};

pub type SimChannel =
    CommandChannel<bnxt_hwrm::sim::SimWindow, bnxt_hwrm::sim::SimDma, bnxt_hwrm::sim::SimDelay>;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn channel(dev: &SimDevice, config: ChannelConfig) -> SimChannel {
    dev.channel(&config).expect("channel")
}

/// Opaque `N`-byte command; bytes after the header are filled with the given byte.
pub struct Raw<const N: usize>(pub u8);

impl<const N: usize> Command for Raw<N> {
    const OPCODE: Opcode = Opcode::FUNC_QCFG;
    type Request = [u8; N];
    type Output = Vec<u8>;

    fn build(&self, req: &mut [u8; N]) -> Result<()> {
        for byte in req.iter_mut().skip(16) {
            *byte = self.0;
        }
        Ok(())
    }

    fn decode(&self, resp: &Response<'_>) -> Result<Vec<u8>> {
        Ok(resp.bytes().to_vec())
    }
}
