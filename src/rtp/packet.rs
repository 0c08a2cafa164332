//! RTP packet with the fixed 12-byte header used by ISSI.
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |V=2|P|X|  CC   |M|     PT      |       sequence number         |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                           timestamp                           |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                             SSRC                              |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! CSRC lists and header extensions are never carried; `CC` and `X` are
//! plain header fields here.

use bytes::{BufMut, Bytes, BytesMut};

use crate::bits::{check_range, extract, read_u32};
use crate::constants::{RTP_FIXED_HEADER_LENGTH, RTP_MAX_PAYLOAD_LENGTH, RTP_VERSION};
use crate::error::{Field, RangeError, RtpError};
use crate::types::{SequenceNumber, Ssrc, Timestamp};

/// One RTP datagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtpPacket {
    version: u8,
    padding: u8,
    extension: u8,
    csrc_count: u8,
    marker: u8,
    payload_type: u8,
    sequence_number: SequenceNumber,
    timestamp: Timestamp,
    ssrc: Ssrc,
    payload: Bytes,
}

impl Default for RtpPacket {
    fn default() -> Self {
        Self {
            version: RTP_VERSION,
            padding: 0,
            extension: 0,
            csrc_count: 0,
            marker: 0,
            payload_type: 0,
            sequence_number: SequenceNumber::default(),
            timestamp: Timestamp::default(),
            ssrc: Ssrc::default(),
            payload: Bytes::new(),
        }
    }
}

impl RtpPacket {
    /// Version 2 packet with every other field zero and no payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Version 2 packet carrying `payload`.
    ///
    /// # Errors
    /// - [`RtpError::PayloadTooLarge`] - `payload` exceeds 512 bytes
    pub fn with_payload(payload: impl Into<Bytes>) -> Result<Self, RtpError> {
        let mut packet = Self::default();
        packet.set_payload(payload)?;
        Ok(packet)
    }

    /// Parses a received datagram. Everything after the fixed header is payload.
    ///
    /// # Errors
    /// - [`RtpError::NotEnoughData`] - Fewer than 12 bytes
    /// - [`RtpError::PayloadTooLarge`] - More than 512 payload bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self, RtpError> {
        if data.len() < RTP_FIXED_HEADER_LENGTH {
            return Err(RtpError::NotEnoughData {
                needed: RTP_FIXED_HEADER_LENGTH,
                got: data.len(),
            });
        }
        let first = read_u32(data, 0) as u64;
        let mut packet = Self {
            version: extract(first, 30, 2) as u8,
            padding: extract(first, 29, 1) as u8,
            extension: extract(first, 28, 1) as u8,
            csrc_count: extract(first, 24, 4) as u8,
            marker: extract(first, 23, 1) as u8,
            payload_type: extract(first, 16, 7) as u8,
            sequence_number: SequenceNumber::new(extract(first, 0, 16) as u16),
            timestamp: Timestamp::new(read_u32(data, 4)),
            ssrc: Ssrc::new(read_u32(data, 8)),
            payload: Bytes::new(),
        };
        packet.set_payload(Bytes::copy_from_slice(&data[RTP_FIXED_HEADER_LENGTH..]))?;
        Ok(packet)
    }

    /// Total wire length.
    pub fn encoded_len(&self) -> usize {
        RTP_FIXED_HEADER_LENGTH + self.payload.len()
    }

    /// Appends the wire form to `out`.
    pub fn encode_into(&self, out: &mut BytesMut) {
        let first = ((self.version as u32 & 0x03) << 30)
            | ((self.padding as u32 & 0x01) << 29)
            | ((self.extension as u32 & 0x01) << 28)
            | ((self.csrc_count as u32 & 0x0F) << 24)
            | ((self.marker as u32 & 0x01) << 23)
            | ((self.payload_type as u32 & 0x7F) << 16)
            | self.sequence_number.value() as u32;
        out.reserve(self.encoded_len());
        out.put_u32(first);
        out.put_u32(self.timestamp.value());
        out.put_u32(self.ssrc.value());
        out.put_slice(&self.payload);
    }

    /// Wire form as an owned buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = BytesMut::with_capacity(self.encoded_len());
        self.encode_into(&mut out);
        out.to_vec()
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn set_version(&mut self, version: u8) -> Result<(), RangeError> {
        check_range(Field::RtpVersion, version as u64, 2)?;
        self.version = version;
        Ok(())
    }

    pub fn padding(&self) -> u8 {
        self.padding
    }

    pub fn set_padding(&mut self, padding: u8) -> Result<(), RangeError> {
        check_range(Field::RtpPadding, padding as u64, 1)?;
        self.padding = padding;
        Ok(())
    }

    pub fn extension(&self) -> u8 {
        self.extension
    }

    pub fn set_extension(&mut self, extension: u8) -> Result<(), RangeError> {
        check_range(Field::RtpExtension, extension as u64, 1)?;
        self.extension = extension;
        Ok(())
    }

    pub fn csrc_count(&self) -> u8 {
        self.csrc_count
    }

    pub fn set_csrc_count(&mut self, csrc_count: u8) -> Result<(), RangeError> {
        check_range(Field::RtpCsrcCount, csrc_count as u64, 4)?;
        self.csrc_count = csrc_count;
        Ok(())
    }

    pub fn marker(&self) -> u8 {
        self.marker
    }

    pub fn set_marker(&mut self, marker: u8) -> Result<(), RangeError> {
        check_range(Field::RtpMarker, marker as u64, 1)?;
        self.marker = marker;
        Ok(())
    }

    pub fn payload_type(&self) -> u8 {
        self.payload_type
    }

    pub fn set_payload_type(&mut self, payload_type: u8) -> Result<(), RangeError> {
        check_range(Field::RtpPayloadType, payload_type as u64, 7)?;
        self.payload_type = payload_type;
        Ok(())
    }

    pub fn sequence_number(&self) -> SequenceNumber {
        self.sequence_number
    }

    /// Overwritten by [`RtpSession::send_rtp_packet`](crate::rtp::RtpSession::send_rtp_packet).
    pub fn set_sequence_number(&mut self, sequence_number: SequenceNumber) {
        self.sequence_number = sequence_number;
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn set_timestamp(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    pub fn ssrc(&self) -> Ssrc {
        self.ssrc
    }

    pub fn set_ssrc(&mut self, ssrc: Ssrc) {
        self.ssrc = ssrc;
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    /// Replaces the payload.
    ///
    /// # Errors
    /// - [`RtpError::PayloadTooLarge`] - `payload` exceeds 512 bytes
    pub fn set_payload(&mut self, payload: impl Into<Bytes>) -> Result<(), RtpError> {
        let payload = payload.into();
        if payload.len() > RTP_MAX_PAYLOAD_LENGTH {
            return Err(RtpError::PayloadTooLarge {
                size: payload.len(),
                max: RTP_MAX_PAYLOAD_LENGTH,
            });
        }
        self.payload = payload;
        Ok(())
    }

    /// Header fields as an XML element. The payload is not included.
    pub fn to_xml(&self) -> String {
        format!(
            "<rtp-packet\n version=\"{}\"\n padding=\"{}\"\n headerExtension=\"{}\"\n csrcCount=\"{}\"\n marker=\"{}\"\n payloadType=\"{}\"\n sequenceNumber=\"{}\"\n timeStamp=\"{}\"\n SSRC=\"{}\"\n/>",
            self.version,
            self.padding,
            self.extension,
            self.csrc_count,
            self.marker,
            self.payload_type,
            self.sequence_number.value(),
            self.timestamp.value(),
            self.ssrc.value(),
        )
    }
}

impl TryFrom<&[u8]> for RtpPacket {
    type Error = RtpError;

    fn try_from(data: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(data)
    }
}
