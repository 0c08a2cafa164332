//! The ISSI header word that opens a voice burst.
//!
//! ```text
//!  bytes 0..9   Message Indicator (72 bits)
//!  byte  9      AlgID
//!  bytes 10..12 KeyID
//!  byte  12     MFID
//!  bytes 13..15 GroupID
//!  bytes 15..17 NID
//!  byte  17     SF(2) | VBB(2) | Reserved(4)
//! ```

use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};

use crate::bits::{check_range, read_u16, write_bytes};
use crate::constants::{ISSI_HEADER_WORD_LENGTH, MESSAGE_INDICATOR_LENGTH};
use crate::error::{Field, P25PayloadError, ParseContext, RangeError};
use crate::render;
use crate::traits::{P25Block, require_len};

/// ISSI header word. A group id of 0 means a unit-to-unit call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct IssiHeaderWord {
    message_indicator: [u8; MESSAGE_INDICATOR_LENGTH],
    algorithm_id: u8,
    key_id: u16,
    manufacturer_id: u8,
    group_id: u16,
    network_id: u16,
    super_frame_counter: u8,
    voice_block_count: u8,
    reserved: u8,
}

impl IssiHeaderWord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message_indicator(&self) -> &[u8; MESSAGE_INDICATOR_LENGTH] {
        &self.message_indicator
    }

    /// Copies `indicator` over the start of the message indicator. Shorter
    /// inputs leave the remaining bytes untouched.
    ///
    /// # Errors
    /// - [`RangeError`] - `indicator` is longer than 9 bytes
    pub fn set_message_indicator(&mut self, indicator: &[u8]) -> Result<(), RangeError> {
        if indicator.len() > MESSAGE_INDICATOR_LENGTH {
            return Err(RangeError {
                field: Field::MessageIndicator,
                value: indicator.len() as u64,
                max: MESSAGE_INDICATOR_LENGTH as u64,
            });
        }
        self.message_indicator[..indicator.len()].copy_from_slice(indicator);
        Ok(())
    }

    pub fn algorithm_id(&self) -> u8 {
        self.algorithm_id
    }

    pub fn set_algorithm_id(&mut self, algorithm_id: u8) {
        self.algorithm_id = algorithm_id;
    }

    pub fn key_id(&self) -> u16 {
        self.key_id
    }

    pub fn set_key_id(&mut self, key_id: u16) {
        self.key_id = key_id;
    }

    pub fn manufacturer_id(&self) -> u8 {
        self.manufacturer_id
    }

    pub fn set_manufacturer_id(&mut self, manufacturer_id: u8) {
        self.manufacturer_id = manufacturer_id;
    }

    pub fn group_id(&self) -> u16 {
        self.group_id
    }

    pub fn set_group_id(&mut self, group_id: u16) {
        self.group_id = group_id;
    }

    pub fn network_id(&self) -> u16 {
        self.network_id
    }

    pub fn set_network_id(&mut self, network_id: u16) {
        self.network_id = network_id;
    }

    pub fn super_frame_counter(&self) -> u8 {
        self.super_frame_counter
    }

    pub fn set_super_frame_counter(&mut self, counter: u8) -> Result<(), RangeError> {
        check_range(Field::SuperFrameCounter, counter as u64, 2)?;
        self.super_frame_counter = counter;
        Ok(())
    }

    /// VBB: number of voice blocks in the packet.
    pub fn voice_block_count(&self) -> u8 {
        self.voice_block_count
    }

    pub fn set_voice_block_count(&mut self, count: u8) -> Result<(), RangeError> {
        check_range(Field::VoiceBlockCount, count as u64, 2)?;
        self.voice_block_count = count;
        Ok(())
    }

    pub fn reserved(&self) -> u8 {
        self.reserved
    }

    pub fn set_reserved(&mut self, reserved: u8) -> Result<(), RangeError> {
        check_range(Field::HeaderReserved, reserved as u64, 4)?;
        self.reserved = reserved;
        Ok(())
    }

    fn trailing_byte(&self) -> u8 {
        ((self.super_frame_counter & 0x03) << 6)
            | ((self.voice_block_count & 0x03) << 4)
            | (self.reserved & 0x0F)
    }
}

impl P25Block for IssiHeaderWord {
    const NAME: &'static str = "issi-header-word";

    fn from_bytes(data: &[u8]) -> Result<Self, P25PayloadError> {
        require_len(data, ISSI_HEADER_WORD_LENGTH, ParseContext::IssiHeaderWord)?;
        let mut message_indicator = [0u8; MESSAGE_INDICATOR_LENGTH];
        message_indicator.copy_from_slice(&data[..MESSAGE_INDICATOR_LENGTH]);
        let last = data[17];
        Ok(Self {
            message_indicator,
            algorithm_id: data[9],
            key_id: read_u16(data, 10),
            manufacturer_id: data[12],
            group_id: read_u16(data, 13),
            network_id: read_u16(data, 15),
            super_frame_counter: last >> 6,
            voice_block_count: (last >> 4) & 0x03,
            reserved: last & 0x0F,
        })
    }

    fn encoded_len(&self) -> usize {
        ISSI_HEADER_WORD_LENGTH
    }

    fn encode_into(&self, out: &mut BytesMut) {
        out.put_slice(&self.message_indicator);
        out.put_u8(self.algorithm_id);
        out.put_u16(self.key_id);
        out.put_u8(self.manufacturer_id);
        out.put_u16(self.group_id);
        out.put_u16(self.network_id);
        out.put_u8(self.trailing_byte());
    }

    fn to_issi_string(&self) -> String {
        format!(
            "\tMessage Indicator: {}\n\tAlgID: {}\n\tKeyID: {}\n\tMFID: {}\n\tGroupID: {}\n\tNetworkID: {}\n\tFree Running Super Frame Counter: {}\n\tVBB: {}\n\tReserved: {}",
            render::hex_bytes(&self.message_indicator, 18),
            render::hex(self.algorithm_id as u64, 2),
            render::hex(self.key_id as u64, 4),
            render::hex(self.manufacturer_id as u64, 2),
            render::hex(self.group_id as u64, 4),
            render::hex(self.network_id as u64, 6),
            render::binary(self.super_frame_counter as u64, 2),
            render::binary(self.voice_block_count as u64, 2),
            render::binary(self.reserved as u64, 4),
        )
    }

    fn to_xml(&self) -> String {
        format!(
            "<issi-header-word\n messageIndicator=\"{}\"\n algId=\"{}\"\n keyId=\"{}\"\n manufacturerID=\"{}\"\n groupID=\"{}\"\n networkID=\"{}\"\n superFrameCounter=\"{}\"\n vbb=\"{}\"\n reserved=\"{}\"\n/>",
            write_bytes(&self.message_indicator),
            self.algorithm_id,
            self.key_id,
            self.manufacturer_id,
            self.group_id,
            self.network_id,
            self.super_frame_counter,
            self.voice_block_count,
            self.reserved,
        )
    }
}
