//! IMBE voice block: one 20 ms codec frame plus its status bits and an
//! optional trailer of low speed data or encryption sync.
//!
//! ```text
//!  bytes 0..4    FT(8) | U0(12) | U1(12)
//!  bytes 4..12   U2(12) | U3(12) | U4(11) | U5(11) | U6(11) | U7(7)
//!  bytes 12..14  Et(3) | Er(3) | M(1) | L(1) | E4(1) | E1(3) | SF(2) | Reserved(2)
//!  bytes 14..    additional frame data (0, 3 or 4 bytes)
//! ```
//!
//! The frame type places the block at a position 1..=18 of the voice
//! superframe. Positions 9 and 18 carry 3 bytes of low speed data and
//! positions 12 through 17 carry 4 bytes of encryption sync.

use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};

use crate::bits::{
    check_range, extract, max_value_for_bits, read_u16, read_u32, read_u64, write_bytes,
};
use crate::constants::{
    ENCRYPTION_SYNC_LENGTH, IMBE_FRAMES_PER_CYCLE, IMBE_VOICE_BLOCK_FIXED_LENGTH,
    LOW_SPEED_DATA_LENGTH,
};
use crate::error::{Field, P25PayloadError, ParseContext, RangeError};
use crate::render;
use crate::traits::{P25Block, require_len};

/// Bit width of U0..U7.
pub const MESSAGE_VECTOR_BITS: [u32; 8] = [12, 12, 12, 12, 11, 11, 11, 7];

/// Frame types used on the ISSI, indexed by position - 1.
const ISSI_FRAME_TYPES: [u8; IMBE_FRAMES_PER_CYCLE] = [
    0xC2, 0xC3, 0xC4, 0xC5, 0xC6, 0xC7, 0xC8, 0xC9, 0x6A, 0xCB, 0xCC, 0x6D, 0x6E, 0x6F, 0x70,
    0x71, 0x72, 0x73,
];

/// Frame types used on the common air interface, indexed by position - 1.
const CAI_FRAME_TYPES: [u8; IMBE_FRAMES_PER_CYCLE] = [
    0x62, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68, 0x69, 0x6A, 0x6B, 0x6C, 0x6D, 0x6E, 0x6F, 0x70,
    0x71, 0x72, 0x73,
];

/// Offset of U0..U7 in the 88-bit voice frame that follows the FT byte.
const VOICE_FRAME_RANGE: std::ops::Range<usize> = 1..12;

#[inline]
fn table_slot(position: usize) -> Option<usize> {
    if position == 0 {
        None
    } else {
        Some((position - 1) % IMBE_FRAMES_PER_CYCLE)
    }
}

/// An IMBE voice block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ImbeVoiceBlock {
    frame_type: u8,
    message_vectors: [u16; 8],
    encoded_errors: u8,
    raw_errors: u8,
    mute_frame: u8,
    lost_frame: u8,
    e4: u8,
    e1: u8,
    super_frame: u8,
    reserved: u8,
    additional_frame_data: Vec<u8>,
}

impl ImbeVoiceBlock {
    /// ISSI frame type for `position`, wrapping every 18 frames. Position 0
    /// has no frame type and yields 0.
    pub fn issi_frame_type(position: usize) -> u8 {
        table_slot(position).map_or(0, |slot| ISSI_FRAME_TYPES[slot])
    }

    /// CAI frame type for `position`, wrapping every 18 frames.
    pub fn cai_frame_type(position: usize) -> u8 {
        table_slot(position).map_or(0, |slot| CAI_FRAME_TYPES[slot])
    }

    /// Position 1..=18 of an ISSI frame type, or 0 if it is not one.
    pub fn issi_frame_position(frame_type: u8) -> usize {
        ISSI_FRAME_TYPES
            .iter()
            .position(|&ft| ft == frame_type)
            .map_or(0, |i| i + 1)
    }

    /// Position 1..=18 of a CAI frame type, or 0 if it is not one.
    pub fn cai_frame_position(frame_type: u8) -> usize {
        CAI_FRAME_TYPES
            .iter()
            .position(|&ft| ft == frame_type)
            .map_or(0, |i| i + 1)
    }

    /// Trailer bytes carried at `position`.
    pub fn trailer_length(position: usize) -> usize {
        match table_slot(position).map(|slot| slot + 1) {
            Some(9) | Some(18) => LOW_SPEED_DATA_LENGTH,
            Some(12..=17) => ENCRYPTION_SYNC_LENGTH,
            _ => 0,
        }
    }

    /// Empty block at `position` with the ISSI frame type and a zeroed
    /// trailer of the right size.
    pub fn at_position(position: usize) -> Self {
        Self {
            frame_type: Self::issi_frame_type(position),
            additional_frame_data: vec![0; Self::trailer_length(position)],
            ..Self::default()
        }
    }

    pub fn frame_type(&self) -> u8 {
        self.frame_type
    }

    pub fn set_frame_type(&mut self, frame_type: u8) {
        self.frame_type = frame_type;
    }

    /// Superframe position of the frame type, trying the ISSI table first
    /// and then the CAI table. 0 if the frame type is in neither.
    pub fn position(&self) -> usize {
        match Self::issi_frame_position(self.frame_type) {
            0 => Self::cai_frame_position(self.frame_type),
            position => position,
        }
    }

    /// Total length the frame type calls for, or `None` if the frame type
    /// has no known position.
    pub fn expected_len(&self) -> Option<usize> {
        match self.position() {
            0 => None,
            position => Some(IMBE_VOICE_BLOCK_FIXED_LENGTH + Self::trailer_length(position)),
        }
    }

    /// U`index`, or `None` past U7.
    pub fn message_vector(&self, index: usize) -> Option<u16> {
        self.message_vectors.get(index).copied()
    }

    pub fn message_vectors(&self) -> &[u16; 8] {
        &self.message_vectors
    }

    /// Sets U`index`, checking it against that vector's width.
    ///
    /// # Errors
    /// - [`RangeError`] - `index` is not 0..=7 or `value` is too wide
    pub fn set_message_vector(&mut self, index: usize, value: u16) -> Result<(), RangeError> {
        let field = Field::MessageVector(index.min(u8::MAX as usize) as u8);
        let Some(&bits) = MESSAGE_VECTOR_BITS.get(index) else {
            return Err(RangeError {
                field,
                value: index as u64,
                max: (MESSAGE_VECTOR_BITS.len() - 1) as u64,
            });
        };
        check_range(field, value as u64, bits)?;
        self.message_vectors[index] = value;
        Ok(())
    }

    /// Sets U0..U7 at once. Nothing changes if any value is too wide.
    pub fn set_message_vectors(&mut self, vectors: [u16; 8]) -> Result<(), RangeError> {
        for (index, (&value, &bits)) in vectors.iter().zip(&MESSAGE_VECTOR_BITS).enumerate() {
            check_range(Field::MessageVector(index as u8), value as u64, bits)?;
        }
        self.message_vectors = vectors;
        Ok(())
    }

    pub fn encoded_errors(&self) -> u8 {
        self.encoded_errors
    }

    pub fn set_encoded_errors(&mut self, value: u8) -> Result<(), RangeError> {
        check_range(Field::EncodedErrors, value as u64, 3)?;
        self.encoded_errors = value;
        Ok(())
    }

    pub fn raw_errors(&self) -> u8 {
        self.raw_errors
    }

    pub fn set_raw_errors(&mut self, value: u8) -> Result<(), RangeError> {
        check_range(Field::RawErrors, value as u64, 3)?;
        self.raw_errors = value;
        Ok(())
    }

    pub fn mute_frame(&self) -> u8 {
        self.mute_frame
    }

    pub fn set_mute_frame(&mut self, value: u8) -> Result<(), RangeError> {
        check_range(Field::MuteFrame, value as u64, 1)?;
        self.mute_frame = value;
        Ok(())
    }

    pub fn lost_frame(&self) -> u8 {
        self.lost_frame
    }

    pub fn set_lost_frame(&mut self, value: u8) -> Result<(), RangeError> {
        check_range(Field::LostFrame, value as u64, 1)?;
        self.lost_frame = value;
        Ok(())
    }

    pub fn e4(&self) -> u8 {
        self.e4
    }

    pub fn set_e4(&mut self, value: u8) -> Result<(), RangeError> {
        check_range(Field::E4, value as u64, 1)?;
        self.e4 = value;
        Ok(())
    }

    pub fn e1(&self) -> u8 {
        self.e1
    }

    pub fn set_e1(&mut self, value: u8) -> Result<(), RangeError> {
        check_range(Field::E1, value as u64, 3)?;
        self.e1 = value;
        Ok(())
    }

    /// Free running superframe counter.
    pub fn super_frame(&self) -> u8 {
        self.super_frame
    }

    pub fn set_super_frame(&mut self, value: u8) -> Result<(), RangeError> {
        check_range(Field::VoiceSuperFrame, value as u64, 2)?;
        self.super_frame = value;
        Ok(())
    }

    pub fn reserved(&self) -> u8 {
        self.reserved
    }

    pub fn set_reserved(&mut self, value: u8) -> Result<(), RangeError> {
        check_range(Field::VoiceReserved, value as u64, 2)?;
        self.reserved = value;
        Ok(())
    }

    /// Low speed data or encryption sync following the fixed part.
    pub fn additional_frame_data(&self) -> &[u8] {
        &self.additional_frame_data
    }

    /// Replaces the trailer. Block length is 10 bits, so the trailer can
    /// be at most 1009 bytes.
    pub fn set_additional_frame_data(&mut self, data: Vec<u8>) -> Result<(), RangeError> {
        let max = max_value_for_bits(10) as usize - IMBE_VOICE_BLOCK_FIXED_LENGTH;
        if data.len() > max {
            return Err(RangeError {
                field: Field::AdditionalFrameData,
                value: data.len() as u64,
                max: max as u64,
            });
        }
        self.additional_frame_data = data;
        Ok(())
    }

    fn first_word(&self) -> u32 {
        ((self.frame_type as u32) << 24)
            | ((self.message_vectors[0] as u32 & 0xFFF) << 12)
            | (self.message_vectors[1] as u32 & 0xFFF)
    }

    fn second_word(&self) -> u64 {
        let u = |i: usize| {
            self.message_vectors[i] as u64 & max_value_for_bits(MESSAGE_VECTOR_BITS[i])
        };
        (u(2) << 52) | (u(3) << 40) | (u(4) << 29) | (u(5) << 18) | (u(6) << 7) | u(7)
    }

    fn status_word(&self) -> u16 {
        ((self.encoded_errors as u16 & 0x7) << 13)
            | ((self.raw_errors as u16 & 0x7) << 10)
            | ((self.mute_frame as u16 & 0x1) << 9)
            | ((self.lost_frame as u16 & 0x1) << 8)
            | ((self.e4 as u16 & 0x1) << 7)
            | ((self.e1 as u16 & 0x7) << 4)
            | ((self.super_frame as u16 & 0x3) << 2)
            | (self.reserved as u16 & 0x3)
    }

    fn voice_frame(&self) -> Vec<u8> {
        let bytes = self.to_bytes();
        bytes[VOICE_FRAME_RANGE].to_vec()
    }
}

impl P25Block for ImbeVoiceBlock {
    const NAME: &'static str = "imbe-voice";

    /// Every byte past the fixed part becomes the trailer, so callers pass
    /// exactly the declared block length.
    fn from_bytes(data: &[u8]) -> Result<Self, P25PayloadError> {
        require_len(data, IMBE_VOICE_BLOCK_FIXED_LENGTH, ParseContext::ImbeVoiceBlock)?;
        let first = read_u32(data, 0) as u64;
        let second = read_u64(data, 4);
        let status = read_u16(data, 12) as u64;
        Ok(Self {
            frame_type: extract(first, 24, 8) as u8,
            message_vectors: [
                extract(first, 12, 12) as u16,
                extract(first, 0, 12) as u16,
                extract(second, 52, 12) as u16,
                extract(second, 40, 12) as u16,
                extract(second, 29, 11) as u16,
                extract(second, 18, 11) as u16,
                extract(second, 7, 11) as u16,
                extract(second, 0, 7) as u16,
            ],
            encoded_errors: extract(status, 13, 3) as u8,
            raw_errors: extract(status, 10, 3) as u8,
            mute_frame: extract(status, 9, 1) as u8,
            lost_frame: extract(status, 8, 1) as u8,
            e4: extract(status, 7, 1) as u8,
            e1: extract(status, 4, 3) as u8,
            super_frame: extract(status, 2, 2) as u8,
            reserved: extract(status, 0, 2) as u8,
            additional_frame_data: data[IMBE_VOICE_BLOCK_FIXED_LENGTH..].to_vec(),
        })
    }

    fn encoded_len(&self) -> usize {
        IMBE_VOICE_BLOCK_FIXED_LENGTH + self.additional_frame_data.len()
    }

    fn encode_into(&self, out: &mut BytesMut) {
        out.put_u32(self.first_word());
        out.put_u64(self.second_word());
        out.put_u16(self.status_word());
        out.put_slice(&self.additional_frame_data);
    }

    fn to_issi_string(&self) -> String {
        let mut out = format!(
            "\tFrame Type: {}\n\tVoice Frame: {}\n\tET: {}\n\tER: {}\n\tMute Frame: {}\n\tLost Frame: {}\n\tE4: {}\n\tE1: {}\n\tFree Running Super Frame Counter: {}\n\tReserved: {}",
            render::hex(self.frame_type as u64, 2),
            render::hex_bytes(&self.voice_frame(), 22),
            render::integer_binary(self.encoded_errors as u64, 3),
            render::integer_binary(self.raw_errors as u64, 3),
            render::binary_flag(self.mute_frame as u64),
            render::binary_flag(self.lost_frame as u64),
            render::binary_flag(self.e4 as u64),
            render::binary(self.e1 as u64, 3),
            render::integer_binary(self.super_frame as u64, 2),
            render::binary(self.reserved as u64, 2),
        );
        if !self.additional_frame_data.is_empty() {
            out.push_str(&format!(
                "\n\tAdditionalFrameData:\"{}\"",
                write_bytes(&self.additional_frame_data)
            ));
        }
        out
    }

    fn to_xml(&self) -> String {
        let trailer = if self.additional_frame_data.is_empty() {
            String::new()
        } else {
            format!(
                "\n additionalFrameData=\"{}\"",
                write_bytes(&self.additional_frame_data)
            )
        };
        format!(
            "<imbe-voice\n frameType=\"{}\"\n voiceFrame=\"{}\"\n ET=\"{}\"\n ER=\"{}\"\n muteFrame=\"{}\"\n lostFrame=\"{}\"\n E4=\"{}\"\n E1=\"{}\"\n SF=\"{}\"\n reserved=\"{}\"{}\n/>",
            self.frame_type,
            write_bytes(&self.voice_frame()),
            self.encoded_errors,
            self.raw_errors,
            self.mute_frame,
            self.lost_frame,
            self.e4,
            self.e1,
            self.super_frame,
            self.reserved,
            trailer,
        )
    }
}
