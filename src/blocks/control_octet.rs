//! The one-byte control octet that opens every P25 payload.

use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};

use crate::bits::{check_range, extract};
use crate::constants::CONTROL_OCTET_LENGTH;
use crate::error::{Field, P25PayloadError, ParseContext, RangeError};
use crate::render;
use crate::traits::{P25Block, require_len};

/// `S`(1) signal bit, `C`(1) compact bit, `BHC`(6) block header count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ControlOctet {
    signal: u8,
    compact: u8,
    block_header_count: u8,
}

impl ControlOctet {
    /// Builds a control octet, validating every field.
    ///
    /// # Errors
    /// - [`RangeError`] - A field exceeds its bit width
    pub fn new(signal: u8, compact: u8, block_header_count: u8) -> Result<Self, RangeError> {
        let mut octet = Self::default();
        octet.set_signal(signal)?;
        octet.set_compact(compact)?;
        octet.set_block_header_count(block_header_count)?;
        Ok(octet)
    }

    pub fn signal(&self) -> u8 {
        self.signal
    }

    pub fn set_signal(&mut self, signal: u8) -> Result<(), RangeError> {
        check_range(Field::SignalBit, signal as u64, 1)?;
        self.signal = signal;
        Ok(())
    }

    pub fn compact(&self) -> u8 {
        self.compact
    }

    pub fn set_compact(&mut self, compact: u8) -> Result<(), RangeError> {
        check_range(Field::CompactBit, compact as u64, 1)?;
        self.compact = compact;
        Ok(())
    }

    pub fn block_header_count(&self) -> u8 {
        self.block_header_count
    }

    pub fn set_block_header_count(&mut self, count: u8) -> Result<(), RangeError> {
        check_range(Field::BlockHeaderCount, count as u64, 6)?;
        self.block_header_count = count;
        Ok(())
    }

    /// The packed byte.
    pub const fn to_byte(&self) -> u8 {
        ((self.signal & 0x01) << 7) | ((self.compact & 0x01) << 6) | (self.block_header_count & 0x3F)
    }

    /// Unpacks a byte. Every byte is a valid control octet.
    pub const fn from_byte(byte: u8) -> Self {
        let word = byte as u64;
        Self {
            signal: extract(word, 7, 1) as u8,
            compact: extract(word, 6, 1) as u8,
            block_header_count: extract(word, 0, 6) as u8,
        }
    }
}

impl P25Block for ControlOctet {
    const NAME: &'static str = "control-octet";

    fn from_bytes(data: &[u8]) -> Result<Self, P25PayloadError> {
        require_len(data, CONTROL_OCTET_LENGTH, ParseContext::ControlOctet)?;
        Ok(Self::from_byte(data[0]))
    }

    fn encoded_len(&self) -> usize {
        CONTROL_OCTET_LENGTH
    }

    fn encode_into(&self, out: &mut BytesMut) {
        out.put_u8(self.to_byte());
    }

    fn to_issi_string(&self) -> String {
        format!(
            "\tSignal bit S-bit: {}\n\tCompact: {}\n\tBlock header count: {}\n",
            render::binary_flag(self.signal as u64),
            render::binary_flag(self.compact as u64),
            render::integer_binary(self.block_header_count as u64, 6),
        )
    }

    fn to_xml(&self) -> String {
        format!(
            "<control-octet\n signalBit=\"{}\"\n compactBit=\"{}\"\n blockHeaderCount=\"{}\"\n/>",
            self.signal, self.compact, self.block_header_count
        )
    }
}
