//! The mandatory ISSI packet type block.
//!
//! ```text
//!  31 30      24 23      16 15     9  8  7        0
//! +--+----------+----------+--------+---+----------+
//! |M |    PT    |    SO    |  TSN   | L | Interval |
//! +--+----------+----------+--------+---+----------+
//! ```

use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};

use crate::bits::{check_range, extract, read_u32};
use crate::constants::ISSI_PACKET_TYPE_LENGTH;
use crate::error::{Field, P25PayloadError, ParseContext, RangeError};
use crate::fields::{PacketType, ServiceOptions};
use crate::render;
use crate::traits::{P25Block, require_len};

/// Packet type block: mute status, packet type, service options,
/// transmission sequence number, losing audio flag and heartbeat interval.
///
/// Equality ignores the service options, which vary between otherwise
/// identical packets of one call. Use [`IssiPacketType::fields_eq`] for a
/// full comparison.
#[derive(Debug, Clone, Copy, Eq, Serialize, Deserialize)]
pub struct IssiPacketType {
    mute_status: u8,
    packet_type: u8,
    service_options: ServiceOptions,
    transmission_sequence_number: u8,
    losing_audio: u8,
    interval: u8,
}

impl Default for IssiPacketType {
    fn default() -> Self {
        Self::new(PacketType::PttTransmitRequest)
    }
}

impl PartialEq for IssiPacketType {
    fn eq(&self, other: &Self) -> bool {
        self.mute_status == other.mute_status
            && self.packet_type == other.packet_type
            && self.transmission_sequence_number == other.transmission_sequence_number
            && self.losing_audio == other.losing_audio
            && self.interval == other.interval
    }
}

impl IssiPacketType {
    /// A block of the given type with every other field zero.
    pub fn new(packet_type: PacketType) -> Self {
        Self {
            mute_status: 0,
            packet_type: packet_type.value(),
            service_options: ServiceOptions::from_byte(0),
            transmission_sequence_number: 0,
            losing_audio: 0,
            interval: 0,
        }
    }

    /// Compares all six fields, service options included.
    pub fn fields_eq(&self, other: &Self) -> bool {
        self == other && self.service_options == other.service_options
    }

    pub fn mute_status(&self) -> u8 {
        self.mute_status
    }

    pub fn set_mute_status(&mut self, mute_status: u8) -> Result<(), RangeError> {
        check_range(Field::MuteStatus, mute_status as u64, 1)?;
        self.mute_status = mute_status;
        Ok(())
    }

    /// The named packet type PT carries.
    ///
    /// # Errors
    /// - [`P25PayloadError::UnknownPacketType`] - PT has no defined meaning
    pub fn packet_type(&self) -> Result<PacketType, P25PayloadError> {
        PacketType::from_value(self.packet_type)
    }

    /// Raw 7-bit PT.
    pub fn packet_type_value(&self) -> u8 {
        self.packet_type
    }

    pub fn set_packet_type(&mut self, packet_type: PacketType) {
        self.packet_type = packet_type.value();
    }

    /// Sets PT to any 7-bit value, named or not.
    pub fn set_packet_type_value(&mut self, packet_type: u8) -> Result<(), RangeError> {
        check_range(Field::PacketType, packet_type as u64, 7)?;
        self.packet_type = packet_type;
        Ok(())
    }

    /// Whether the control octet's S bit is set for this packet type.
    pub fn is_signalling(&self) -> bool {
        self.packet_type().is_ok_and(PacketType::is_signalling)
    }

    pub fn service_options(&self) -> ServiceOptions {
        self.service_options
    }

    pub fn set_service_options(&mut self, service_options: ServiceOptions) {
        self.service_options = service_options;
    }

    pub fn transmission_sequence_number(&self) -> u8 {
        self.transmission_sequence_number
    }

    pub fn set_transmission_sequence_number(&mut self, tsn: u8) -> Result<(), RangeError> {
        check_range(Field::TransmissionSequenceNumber, tsn as u64, 7)?;
        self.transmission_sequence_number = tsn;
        Ok(())
    }

    pub fn losing_audio(&self) -> u8 {
        self.losing_audio
    }

    pub fn set_losing_audio(&mut self, losing_audio: u8) -> Result<(), RangeError> {
        check_range(Field::LosingAudio, losing_audio as u64, 1)?;
        self.losing_audio = losing_audio;
        Ok(())
    }

    /// Heartbeat interval in seconds.
    pub fn interval(&self) -> u8 {
        self.interval
    }

    pub fn set_interval(&mut self, interval: u8) {
        self.interval = interval;
    }

    /// The packed 32-bit word.
    pub fn to_word(&self) -> u32 {
        ((self.mute_status as u32 & 0x01) << 31)
            | ((self.packet_type as u32 & 0x7F) << 24)
            | ((self.service_options.to_byte() as u32) << 16)
            | ((self.transmission_sequence_number as u32 & 0x7F) << 9)
            | ((self.losing_audio as u32 & 0x01) << 8)
            | self.interval as u32
    }

    /// Unpacks a word. Every word is a valid packet type block; PT values
    /// with no name are kept as they are.
    pub fn from_word(word: u32) -> Self {
        let word = word as u64;
        Self {
            mute_status: extract(word, 31, 1) as u8,
            packet_type: extract(word, 24, 7) as u8,
            service_options: ServiceOptions::from_byte(extract(word, 16, 8) as u8),
            transmission_sequence_number: extract(word, 9, 7) as u8,
            losing_audio: extract(word, 8, 1) as u8,
            interval: extract(word, 0, 8) as u8,
        }
    }

    fn packet_type_name(&self) -> &'static str {
        self.packet_type()
            .map_or("Unknown packet type", PacketType::name)
    }
}

impl P25Block for IssiPacketType {
    const NAME: &'static str = "issi-packet-type";

    fn from_bytes(data: &[u8]) -> Result<Self, P25PayloadError> {
        require_len(data, ISSI_PACKET_TYPE_LENGTH, ParseContext::IssiPacketType)?;
        Ok(Self::from_word(read_u32(data, 0)))
    }

    fn encoded_len(&self) -> usize {
        ISSI_PACKET_TYPE_LENGTH
    }

    fn encode_into(&self, out: &mut BytesMut) {
        out.put_u32(self.to_word());
    }

    fn to_issi_string(&self) -> String {
        format!(
            "\tMute status M-bit: {}\n\tPacket type: {} {}{}\n\tTransmission sequence number: {}\n\tLosing audio L-bit: {}\n\tInterval: {}",
            render::binary_flag(self.mute_status as u64),
            self.packet_type_name(),
            render::integer_binary(self.packet_type as u64, 7),
            render::text_binary(
                "\n\tService options",
                self.service_options.to_byte() as u64,
                8
            ),
            render::integer_hex(self.transmission_sequence_number as u64, 4),
            render::binary_flag(self.losing_audio as u64),
            render::hex(self.interval as u64, 2),
        )
    }

    fn to_xml(&self) -> String {
        format!(
            "<issi-packet-type\n muteStatus=\"{}\"\n packetType=\"{}\"\n serviceOptions=\"{}\"\n transmissionSequenceNumber=\"{}\"\n losingAudio=\"{}\"\n interval=\"{}\"\n/>",
            self.mute_status,
            self.packet_type_name(),
            self.service_options.to_byte(),
            self.transmission_sequence_number,
            self.losing_audio,
            self.interval
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heartbeat() -> IssiPacketType {
        let mut pt = IssiPacketType::new(PacketType::Heartbeat);
        pt.set_interval(20);
        pt
    }

    #[test]
    fn heartbeat_wire_form() {
        let pt = heartbeat();
        assert_eq!(pt.to_bytes(), vec![0x09, 0x00, 0x00, 0x14]);

        let decoded = IssiPacketType::from_bytes(&[0x09, 0x00, 0x00, 0x14]).unwrap();
        assert_eq!(decoded.mute_status(), 0);
        assert_eq!(decoded.packet_type(), Ok(PacketType::Heartbeat));
        assert_eq!(decoded.service_options().to_byte(), 0x00);
        assert_eq!(decoded.transmission_sequence_number(), 0);
        assert_eq!(decoded.losing_audio(), 0);
        assert_eq!(decoded.interval(), 20);
    }

    #[test]
    fn all_fields_at_max() {
        let mut pt = IssiPacketType::new(PacketType::PttTransmitProgress);
        pt.set_mute_status(1).unwrap();
        pt.set_service_options(ServiceOptions::from_byte(0x80));
        pt.set_transmission_sequence_number(127).unwrap();
        pt.set_losing_audio(1).unwrap();
        pt.set_interval(255);

        let decoded = IssiPacketType::from_bytes(&pt.to_bytes()).unwrap();
        assert!(decoded.fields_eq(&pt));
        assert_eq!(pt.to_word(), 0x8280_FFFF);
    }

    #[test]
    fn equality_ignores_service_options() {
        let a = heartbeat();
        let mut b = heartbeat();
        b.set_service_options(ServiceOptions::from_byte(0xA4));
        assert_eq!(a, b);
        assert!(!a.fields_eq(&b));

        b.set_losing_audio(1).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn range_checks() {
        let mut pt = IssiPacketType::default();
        assert!(pt.set_mute_status(2).is_err());
        assert!(pt.set_losing_audio(2).is_err());
        assert_eq!(
            pt.set_transmission_sequence_number(128).unwrap_err().field,
            Field::TransmissionSequenceNumber
        );
    }

    #[test]
    fn unnamed_packet_types_survive_the_wire() {
        for wire in [[0x0E, 0x00, 0x00, 0x00], [0x7F, 0x00, 0x00, 0x00], [0xFF, 0xA4, 0x03, 0x01]] {
            let decoded = IssiPacketType::from_bytes(&wire).unwrap();
            assert_eq!(decoded.to_bytes(), wire.to_vec());
            assert!(!decoded.is_signalling());
        }
        let decoded = IssiPacketType::from_bytes(&[0x7F, 0x00, 0x00, 0x00]).unwrap();
        assert_eq!(decoded.packet_type_value(), 127);
        assert_eq!(decoded.packet_type(), Err(P25PayloadError::UnknownPacketType(127)));
        assert!(decoded.to_issi_string().contains("Unknown packet type 127 (%b1111111)"));
    }

    #[test]
    fn packet_type_value_is_seven_bits() {
        let mut pt = IssiPacketType::default();
        pt.set_packet_type_value(127).unwrap();
        assert_eq!(pt.to_word() >> 24, 0x7F);
        let err = pt.set_packet_type_value(128).unwrap_err();
        assert_eq!((err.field, err.max), (Field::PacketType, 127));
        assert_eq!(pt.packet_type_value(), 127);
    }

    #[test]
    fn issi_string_layout() {
        let text = heartbeat().to_issi_string();
        assert!(text.starts_with("\tMute status M-bit: %b0\n\tPacket type: Heartbeat 9 (%b0001001)"));
        assert!(text.contains("\n\tService options: %b00000000"));
        assert!(text.ends_with("\n\tInterval: %x14"));
    }
}
