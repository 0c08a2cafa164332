//! Byte and bit-field primitives shared by every block codec.
//!
//! All multi-byte quantities on the P25 and RTP wire are big-endian. Decoders
//! always mask a field to its declared width while unpacking, so a decoded
//! value can never exceed the range its setter would have accepted.

use crate::error::{Field, P25PayloadError, RangeError};

/// Largest value representable in `bits` bits, for `bits` in `0..=64`.
#[inline]
pub const fn max_value_for_bits(bits: u32) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

/// Extracts `width` bits at `shift` from `word`.
#[inline]
pub const fn extract(word: u64, shift: u32, width: u32) -> u64 {
    (word >> shift) & max_value_for_bits(width)
}

/// Validates that `value` fits in `bits` bits.
///
/// # Errors
/// - [`RangeError`] - `value` exceeds `max_value_for_bits(bits)`
#[inline]
pub fn check_range(field: Field, value: u64, bits: u32) -> Result<(), RangeError> {
    let max = max_value_for_bits(bits);
    if value > max {
        return Err(RangeError { field, value, max });
    }
    Ok(())
}

/// Reads a big-endian `u16` at `offset`. Caller guarantees the bounds.
#[inline]
pub(crate) fn read_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([data[offset], data[offset + 1]])
}

/// Reads a big-endian `u32` at `offset`. Caller guarantees the bounds.
#[inline]
pub(crate) fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

/// Reads a big-endian `u64` at `offset`. Caller guarantees the bounds.
#[inline]
pub(crate) fn read_u64(data: &[u8], offset: usize) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(&data[offset..offset + 8]);
    u64::from_be_bytes(word)
}

/// Renders bytes as space separated, upper-case, two digit hex ("0A FF 00").
pub fn write_bytes(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 3);
    for (i, byte) in data.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&format!("{byte:02X}"));
    }
    out
}

/// Parses the output of [`write_bytes`] back into bytes.
///
/// Tokens are split on whitespace; each must be one or two hex digits.
///
/// # Errors
/// - [`P25PayloadError::MalformedHex`] - A token is not a hex byte
pub fn read_bytes(text: &str) -> Result<Vec<u8>, P25PayloadError> {
    text.split_whitespace()
        .map(|token| {
            if token.len() > 2 {
                return Err(P25PayloadError::MalformedHex(token.to_string()));
            }
            u8::from_str_radix(token, 16)
                .map_err(|_| P25PayloadError::MalformedHex(token.to_string()))
        })
        .collect()
}
