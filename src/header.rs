// Author: Lukas Bower
// Purpose: Stamp the common request header onto outgoing command buffers.

//! Request header stamping.

use hwrm_wire::{Opcode, RequestHeader, REQ_SEQ_ID_OFFSET, UNUSED_ID};
use zerocopy::byteorder::little_endian::{U16, U64};

/// Writes opcode, unused ring/target sentinels and the response address.
///
/// The sequence number is left for the transport to assign at send time.
pub fn init_header(header: &mut RequestHeader, opcode: Opcode, resp_addr: u64) {
    header.req_type = U16::new(opcode.value());
    header.cmpl_ring = U16::new(UNUSED_ID);
    header.target_id = U16::new(UNUSED_ID);
    header.resp_addr = U64::new(resp_addr);
}

/// Writes `seq` into a serialised request.
pub(crate) fn set_seq(request: &mut [u8], seq: u16) {
    if let Some(slot) = request.get_mut(REQ_SEQ_ID_OFFSET..REQ_SEQ_ID_OFFSET + 2) {
        slot.copy_from_slice(&seq.to_le_bytes());
    }
}

/// Reads the opcode of a serialised request.
pub(crate) fn opcode_of(request: &[u8]) -> Opcode {
    match request {
        [lo, hi, ..] => Opcode(u16::from_le_bytes([*lo, *hi])),
        _ => Opcode(UNUSED_ID),
    }
}
