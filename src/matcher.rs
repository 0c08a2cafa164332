//! Conformance matching of captured traffic against expected traffic.
//!
//! Only the fields the ISSI conformance tests treat as mandatory are
//! compared, in a fixed order, stopping at the first difference:
//!
//! 1. RTP header `V`, `P`, `X`, `CC`, `M`, `PT`, then `SSRC`. `SN` and `TS` are skipped.
//! 2. RTP payload length.
//! 3. Control octet `S`, `C`, `BHC`, then the block header count.
//! 4. For each block header in order: `E`, `BT`, `TSO`, `BL`, then the
//!    block it announces. Packet type blocks compare `M`, `PT` and `L`.
//!    PTT control words (RF or console) compare `WACN`, `SystemID`,
//!    `UnitID` and `TP`. ISSI header words and voice blocks are not compared.

use std::fmt;

use crate::blocks::{BlockHeader, ControlOctet, IssiPacketType, PttControlWord};
use crate::error::{Field, P25PayloadError};
use crate::fields::BlockKind;
use crate::payload::P25Payload;
use crate::rtp::RtpPacket;

/// First field found to differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    pub field: Field,
    /// Index of the block header, for fields inside the payload's blocks.
    pub block: Option<usize>,
    pub expected: u64,
    pub actual: u64,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} fields do not match: {} != {}",
            self.field, self.expected, self.actual
        )?;
        if let Some(block) = self.block {
            write!(f, " (block {block})")?;
        }
        Ok(())
    }
}

/// Outcome of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    Match,
    Mismatch(Mismatch),
}

impl MatchResult {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchResult::Match)
    }

    pub fn mismatch(&self) -> Option<&Mismatch> {
        match self {
            MatchResult::Match => None,
            MatchResult::Mismatch(mismatch) => Some(mismatch),
        }
    }
}

impl From<Result<(), Mismatch>> for MatchResult {
    fn from(result: Result<(), Mismatch>) -> Self {
        match result {
            Ok(()) => MatchResult::Match,
            Err(mismatch) => {
                tracing::debug!(
                    field = %mismatch.field,
                    block = ?mismatch.block,
                    expected = mismatch.expected,
                    actual = mismatch.actual,
                    "Packets do not match"
                );
                MatchResult::Mismatch(mismatch)
            }
        }
    }
}

fn compare(
    field: Field,
    block: Option<usize>,
    expected: impl Into<u64>,
    actual: impl Into<u64>,
) -> Result<(), Mismatch> {
    let (expected, actual) = (expected.into(), actual.into());
    if expected != actual {
        return Err(Mismatch {
            field,
            block,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Compares two RTP packets and the P25 payloads they carry.
///
/// # Errors
/// - [`P25PayloadError`] - Either payload does not decode
pub fn match_rtp(expected: &RtpPacket, actual: &RtpPacket) -> Result<MatchResult, P25PayloadError> {
    if let Err(mismatch) = match_rtp_header(expected, actual) {
        return Ok(MatchResult::from(Err(mismatch)));
    }
    let expected_payload = P25Payload::from_bytes(expected.payload())?;
    let actual_payload = P25Payload::from_bytes(actual.payload())?;
    Ok(match_payloads(&expected_payload, &actual_payload))
}

fn match_rtp_header(expected: &RtpPacket, actual: &RtpPacket) -> Result<(), Mismatch> {
    compare(Field::RtpVersion, None, expected.version(), actual.version())?;
    compare(Field::RtpPadding, None, expected.padding(), actual.padding())?;
    compare(Field::RtpExtension, None, expected.extension(), actual.extension())?;
    compare(Field::RtpCsrcCount, None, expected.csrc_count(), actual.csrc_count())?;
    compare(Field::RtpMarker, None, expected.marker(), actual.marker())?;
    compare(
        Field::RtpPayloadType,
        None,
        expected.payload_type(),
        actual.payload_type(),
    )?;
    compare(Field::RtpSsrc, None, expected.ssrc().value(), actual.ssrc().value())?;
    compare(
        Field::RtpPayload,
        None,
        expected.payload_len() as u64,
        actual.payload_len() as u64,
    )
}

/// Compares two decoded P25 payloads.
pub fn match_payloads(expected: &P25Payload, actual: &P25Payload) -> MatchResult {
    MatchResult::from(match_payload_fields(expected, actual))
}

fn match_payload_fields(expected: &P25Payload, actual: &P25Payload) -> Result<(), Mismatch> {
    match_control_octet(expected.control_octet(), actual.control_octet())?;
    let (expected_headers, actual_headers) = (expected.block_headers(), actual.block_headers());
    compare(
        Field::BlockHeaderCount,
        None,
        expected_headers.len() as u64,
        actual_headers.len() as u64,
    )?;

    for (i, (expected_header, actual_header)) in
        expected_headers.iter().zip(actual_headers).enumerate()
    {
        match_block_header(i, expected_header, actual_header)?;
        match expected_header.block_type().kind() {
            BlockKind::PacketType => {
                match_packet_type(i, expected.packet_type(), actual.packet_type())?
            }
            BlockKind::PttControlWord => {
                if let (Some(e), Some(a)) = (expected.ptt_control_word(), actual.ptt_control_word())
                {
                    match_ptt_control_word(i, e, a)?;
                }
            }
            BlockKind::ConsolePttControlWord => {
                if let (Some(e), Some(a)) = (
                    expected.console_ptt_control_word(),
                    actual.console_ptt_control_word(),
                ) {
                    match_ptt_control_word(i, e.ptt_control_word(), a.ptt_control_word())?;
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn match_control_octet(expected: &ControlOctet, actual: &ControlOctet) -> Result<(), Mismatch> {
    compare(Field::SignalBit, None, expected.signal(), actual.signal())?;
    compare(Field::CompactBit, None, expected.compact(), actual.compact())?;
    compare(
        Field::BlockHeaderCount,
        None,
        expected.block_header_count(),
        actual.block_header_count(),
    )
}

fn match_block_header(
    block: usize,
    expected: &BlockHeader,
    actual: &BlockHeader,
) -> Result<(), Mismatch> {
    let block = Some(block);
    compare(
        Field::PayloadType,
        block,
        expected.payload_type().value(),
        actual.payload_type().value(),
    )?;
    compare(
        Field::BlockType,
        block,
        expected.block_type().index(),
        actual.block_type().index(),
    )?;
    compare(
        Field::TimestampOffset,
        block,
        expected.timestamp_offset(),
        actual.timestamp_offset(),
    )?;
    compare(
        Field::BlockLength,
        block,
        expected.block_length(),
        actual.block_length(),
    )
}

fn match_packet_type(
    block: usize,
    expected: &IssiPacketType,
    actual: &IssiPacketType,
) -> Result<(), Mismatch> {
    let block = Some(block);
    compare(Field::MuteStatus, block, expected.mute_status(), actual.mute_status())?;
    compare(
        Field::PacketType,
        block,
        expected.packet_type_value(),
        actual.packet_type_value(),
    )?;
    compare(
        Field::LosingAudio,
        block,
        expected.losing_audio(),
        actual.losing_audio(),
    )
}

fn match_ptt_control_word(
    block: usize,
    expected: &PttControlWord,
    actual: &PttControlWord,
) -> Result<(), Mismatch> {
    let block = Some(block);
    compare(Field::WacnId, block, expected.wacn_id(), actual.wacn_id())?;
    compare(Field::SystemId, block, expected.system_id(), actual.system_id())?;
    compare(Field::UnitId, block, expected.unit_id(), actual.unit_id())?;
    compare(
        Field::TransmitPriority,
        block,
        expected.transmit_priority(),
        actual.transmit_priority(),
    )
}
