//! Core traits of the P25 payload codec.
//!
//! Every block structure implements [`P25Block`], which lets the payload
//! assembler, the voice generator and the tests treat them uniformly. The
//! transport side exposes [`RtpListener`](crate::rtp::RtpListener) instead.

use bytes::BytesMut;

use crate::error::P25PayloadError;

/// A bit-packed block of the P25 payload.
pub trait P25Block: Sized {
    /// Short name used in diagnostics and XML element names.
    const NAME: &'static str;

    /// Parses a block from the start of `data`.
    ///
    /// Fixed size blocks read exactly their size and ignore anything after it.
    ///
    /// # Errors
    /// - [`P25PayloadError`] - `data` is too short or holds an invalid value
    fn from_bytes(data: &[u8]) -> Result<Self, P25PayloadError>;

    /// Serialized length in bytes.
    fn encoded_len(&self) -> usize;

    /// Appends the wire form to `out`.
    fn encode_into(&self, out: &mut BytesMut);

    /// Wire form as an owned buffer.
    fn to_bytes(&self) -> Vec<u8> {
        let mut out = BytesMut::with_capacity(self.encoded_len());
        self.encode_into(&mut out);
        out.to_vec()
    }

    /// Human readable field list consumed by trace viewers.
    fn to_issi_string(&self) -> String;

    /// Single XML element describing the block.
    fn to_xml(&self) -> String;
}

/// Fails with `NotEnoughData` unless `data` holds at least `needed` bytes.
pub(crate) fn require_len(
    data: &[u8],
    needed: usize,
    context: crate::error::ParseContext,
) -> Result<(), P25PayloadError> {
    if data.len() < needed {
        return Err(P25PayloadError::NotEnoughData {
            needed,
            got: data.len(),
            context,
        });
    }
    Ok(())
}
