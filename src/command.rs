// Author: Lukas Bower
// Purpose: Typed command seam shared by every opcode encoder.

//! The [`Command`] trait captures the populate, stamp, send, decode shape
//! every firmware command shares.

use core::mem::size_of;

use hwrm_wire::{Opcode, ResponseHeader};
use zerocopy::{FromBytes, FromZeros, Immutable, IntoBytes, KnownLayout};

use crate::error::Result;
use crate::transport::Limits;

/// A firmware command with a fixed request layout and a decoded output.
pub trait Command {
    /// Opcode stamped into the request header.
    const OPCODE: Opcode;

    /// Wire request; must begin with [`hwrm_wire::RequestHeader`].
    type Request: FromBytes + IntoBytes + KnownLayout + Immutable;

    /// Decoded result handed back to the caller.
    type Output;

    /// Fills the command-specific fields of a zeroed request.
    fn build(&self, req: &mut Self::Request) -> Result<()>;

    /// Number of request bytes to transmit under `limits`.
    fn request_len(&self, _limits: &Limits) -> usize {
        size_of::<Self::Request>()
    }

    /// Budget override for commands known to run long.
    fn timeout_ms(&self) -> Option<u32> {
        None
    }

    /// Decodes a successful response.
    fn decode(&self, resp: &Response<'_>) -> Result<Self::Output>;
}

/// Completed response, `resp_len` bytes long.
#[derive(Debug, Clone, Copy)]
pub struct Response<'a> {
    bytes: &'a [u8],
}

impl<'a> Response<'a> {
    /// Wraps the bytes firmware reported.
    #[must_use]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Raw response bytes, valid marker included.
    #[must_use]
    pub const fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Reported response length.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True when firmware reported an empty response.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Common response header.
    #[must_use]
    pub fn header(&self) -> ResponseHeader {
        self.parse()
    }

    /// Decodes the response as `T`.
    ///
    /// Responses shorter than `T` read as zero past their end, which is how
    /// older firmware omits trailing fields.
    #[must_use]
    pub fn parse<T>(&self) -> T
    where
        T: FromBytes + IntoBytes + KnownLayout + Immutable,
    {
        let mut out = T::new_zeroed();
        let dst = out.as_mut_bytes();
        let count = dst.len().min(self.bytes.len());
        dst[..count].copy_from_slice(&self.bytes[..count]);
        out
    }
}
