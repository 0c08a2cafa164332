//! Four-byte block header describing one block of the payload body.
//!
//! ```text
//!  31 30       24 23                    10 9            0
//! +--+-----------+------------------------+--------------+
//! |E |    BT     |          TSO           |      BL      |
//! +--+-----------+------------------------+--------------+
//! ```

use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};

use crate::bits::{check_range, extract, read_u32};
use crate::constants::BLOCK_HEADER_LENGTH;
use crate::error::{Field, P25PayloadError, ParseContext, RangeError};
use crate::fields::{BlockKind, BlockType, PayloadType};
use crate::render;
use crate::traits::{P25Block, require_len};

/// Header announcing the type, time offset and length of one payload block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockHeader {
    payload_type: PayloadType,
    block_type: BlockType,
    timestamp_offset: u16,
    block_length: u16,
}

impl Default for BlockHeader {
    fn default() -> Self {
        Self {
            payload_type: PayloadType::Iana,
            block_type: BlockType::IMBE_VOICE,
            timestamp_offset: 0,
            block_length: 0,
        }
    }
}

impl BlockHeader {
    /// Builds a header, validating TSO and BL widths.
    ///
    /// # Errors
    /// - [`RangeError`] - TSO exceeds 14 bits or BL exceeds 10 bits
    pub fn new(
        payload_type: PayloadType,
        block_type: BlockType,
        timestamp_offset: u16,
        block_length: u16,
    ) -> Result<Self, RangeError> {
        let mut header = Self {
            payload_type,
            block_type,
            ..Self::default()
        };
        header.set_timestamp_offset(timestamp_offset)?;
        header.set_block_length(block_length)?;
        Ok(header)
    }

    pub fn payload_type(&self) -> PayloadType {
        self.payload_type
    }

    pub fn set_payload_type(&mut self, payload_type: PayloadType) {
        self.payload_type = payload_type;
    }

    pub fn block_type(&self) -> BlockType {
        self.block_type
    }

    pub fn set_block_type(&mut self, block_type: BlockType) {
        self.block_type = block_type;
    }

    /// Sets BT from a raw index.
    ///
    /// # Errors
    /// - [`P25PayloadError::Range`] - `index` exceeds 7 bits
    pub fn set_block_type_index(&mut self, index: u8) -> Result<(), P25PayloadError> {
        check_range(Field::BlockType, index as u64, 7)?;
        self.block_type = BlockType::from_index(index)?;
        Ok(())
    }

    pub fn timestamp_offset(&self) -> u16 {
        self.timestamp_offset
    }

    pub fn set_timestamp_offset(&mut self, offset: u16) -> Result<(), RangeError> {
        check_range(Field::TimestampOffset, offset as u64, 14)?;
        self.timestamp_offset = offset;
        Ok(())
    }

    pub fn block_length(&self) -> u16 {
        self.block_length
    }

    pub fn set_block_length(&mut self, length: u16) -> Result<(), RangeError> {
        check_range(Field::BlockLength, length as u64, 10)?;
        self.block_length = length;
        Ok(())
    }

    /// The packed 32-bit word.
    pub fn to_word(&self) -> u32 {
        ((self.payload_type.value() as u32 & 0x01) << 31)
            | ((self.block_type.index() as u32 & 0x7F) << 24)
            | ((self.timestamp_offset as u32 & 0x3FFF) << 10)
            | (self.block_length as u32 & 0x03FF)
    }

    /// Unpacks a word, rejecting block types this codec cannot carry.
    ///
    /// # Errors
    /// - [`P25PayloadError::UnsupportedBlockType`] - BT is reserved or future expansion
    pub fn from_word(word: u32) -> Result<Self, P25PayloadError> {
        let word = word as u64;
        let index = extract(word, 24, 7) as u8;
        let block_type = BlockType::from_index(index)?;
        if block_type.kind() == BlockKind::Unsupported {
            return Err(P25PayloadError::UnsupportedBlockType(index));
        }
        Ok(Self {
            payload_type: PayloadType::from_bit(extract(word, 31, 1) == 1),
            block_type,
            timestamp_offset: extract(word, 10, 14) as u16,
            block_length: extract(word, 0, 10) as u16,
        })
    }
}

impl P25Block for BlockHeader {
    const NAME: &'static str = "block-header";

    fn from_bytes(data: &[u8]) -> Result<Self, P25PayloadError> {
        require_len(data, BLOCK_HEADER_LENGTH, ParseContext::BlockHeader)?;
        Self::from_word(read_u32(data, 0))
    }

    fn encoded_len(&self) -> usize {
        BLOCK_HEADER_LENGTH
    }

    fn encode_into(&self, out: &mut BytesMut) {
        out.put_u32(self.to_word());
    }

    fn to_issi_string(&self) -> String {
        format!(
            "{}: {}\nBlock Type: {}\nTimestamp offset: {}\nLength: {}",
            self.payload_type,
            render::binary_flag(self.payload_type.value() as u64),
            render::text_integer_binary(
                self.block_type.description(),
                self.block_type.index() as u64,
                7
            ),
            render::integer_hex(self.timestamp_offset as u64, 14),
            render::integer_binary(self.block_length as u64, 10),
        )
    }

    fn to_xml(&self) -> String {
        format!(
            "<block-header\n payloadType=\"{}\"\n blockType=\"{}\"\n timeStampOffset=\"{}\"\n blockLength=\"{}\"\n/>",
            self.payload_type, self.block_type, self.timestamp_offset, self.block_length
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_packet_type_header() {
        let header =
            BlockHeader::new(PayloadType::ProfileSpecific, BlockType::PACKET_TYPE, 0, 4).unwrap();
        assert_eq!(header.to_bytes(), vec![0x81, 0x00, 0x00, 0x04]);
        assert_eq!(BlockHeader::from_bytes(&[0x81, 0x00, 0x00, 0x04]).unwrap(), header);
    }

    #[test]
    fn packs_all_fields_at_max() {
        let header = BlockHeader::new(
            PayloadType::ProfileSpecific,
            BlockType::from_index(127).unwrap(),
            0x3FFF,
            0x3FF,
        )
        .unwrap();
        assert_eq!(header.to_word(), 0xFFFF_FFFF);
        assert_eq!(BlockHeader::from_word(0xFFFF_FFFF).unwrap(), header);
    }

    #[test]
    fn voice_header_carries_time_offset() {
        let header =
            BlockHeader::new(PayloadType::ProfileSpecific, BlockType::IMBE_VOICE, 320, 17).unwrap();
        let decoded = BlockHeader::from_bytes(&header.to_bytes()).unwrap();
        assert_eq!(decoded.timestamp_offset(), 320);
        assert_eq!(decoded.block_length(), 17);
        assert_eq!(decoded.block_type(), BlockType::IMBE_VOICE);
    }

    #[test]
    fn reserved_block_types_fail_decode() {
        // BT = 9, Start of Stream
        assert_eq!(
            BlockHeader::from_word(0x0900_0000),
            Err(P25PayloadError::UnsupportedBlockType(9))
        );
        assert_eq!(
            BlockHeader::from_word(0x1000_0000),
            Err(P25PayloadError::UnsupportedBlockType(16))
        );
        assert!(BlockHeader::from_word(0x0F00_0018).is_ok());
    }

    #[test]
    fn range_checks() {
        let mut header = BlockHeader::default();
        assert!(header.set_timestamp_offset(0x3FFF).is_ok());
        assert!(header.set_timestamp_offset(0x4000).is_err());
        assert!(header.set_block_length(0x3FF).is_ok());
        assert_eq!(
            header.set_block_length(0x400).unwrap_err().field,
            Field::BlockLength
        );
        assert!(header.set_block_type_index(127).is_ok());
        assert!(matches!(
            header.set_block_type_index(128),
            Err(P25PayloadError::Range(_))
        ));
    }

    #[test]
    fn short_input_is_rejected() {
        assert!(matches!(
            BlockHeader::from_bytes(&[0x81, 0x00]),
            Err(P25PayloadError::NotEnoughData { needed: 4, got: 2, .. })
        ));
    }

    #[test]
    fn issi_string_layout() {
        let header =
            BlockHeader::new(PayloadType::ProfileSpecific, BlockType::PACKET_TYPE, 0, 4).unwrap();
        assert_eq!(
            header.to_issi_string(),
            "P25 profile specific type: %b1\nBlock Type: Packet Type (%b0000001)\n\
             Timestamp offset: 0 (%x00000000000000)\nLength: 4 (%b0000000100)"
        );
    }
}
