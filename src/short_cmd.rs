// Author: Lukas Bower
// Purpose: Repackage oversized or firmware-mandated requests into the short form.

//! Short-form request staging.
//!
//! The full request is copied into a DMA staging buffer and replaced on the
//! wire by a 16-byte descriptor that points at it.

use hwrm_wire::{ShortInput, SHORT_CMD_SIGNATURE};
use zerocopy::byteorder::little_endian::{U16, U64};
use zerocopy::FromZeros;

use crate::error::{HwrmError, Result};
use crate::hal::DmaBuffer;
use crate::header::opcode_of;

/// Stages `request` and returns the descriptor to transmit in its place.
///
/// The staging buffer holds `request` followed by zeros up to `ext_len`.
pub fn stage<B: DmaBuffer>(staging: &mut B, request: &[u8], ext_len: usize) -> Result<ShortInput> {
    let max = ext_len.min(staging.len());
    if request.len() > max {
        return Err(HwrmError::RequestTooLarge {
            len: request.len(),
            max,
        });
    }
    let size = u16::try_from(request.len()).map_err(|_| HwrmError::RequestTooLarge {
        len: request.len(),
        max: usize::from(u16::MAX),
    })?;

    staging.write(0, request);
    staging.fill(request.len(), max - request.len(), 0);

    let mut desc = ShortInput::new_zeroed();
    desc.req_type = U16::new(opcode_of(request).value());
    desc.signature = U16::new(SHORT_CMD_SIGNATURE);
    desc.size = U16::new(size);
    desc.req_addr = U64::new(staging.paddr());
    log::debug!(
        "[hwrm] staged {} byte request in short form at {:#x}",
        request.len(),
        staging.paddr()
    );
    Ok(desc)
}
