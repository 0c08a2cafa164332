//! Property-based tests for the P25 block codecs and RTP framing.
//!
//! Uses QuickCheck to check that range checks agree with bit widths, that
//! packed words survive a decode/encode cycle, and that voice framing
//! repeats with the superframe.

use quickcheck::TestResult;
use quickcheck_macros::quickcheck as qc_quickcheck;

use p25issi::bits::{check_range, max_value_for_bits, read_bytes, write_bytes};
use p25issi::blocks::{BlockHeader, ImbeVoiceBlock, IssiPacketType, PttControlWord};
use p25issi::constants::{IMBE_FRAMES_PER_CYCLE, RTP_FIXED_HEADER_LENGTH, RTP_MAX_PAYLOAD_LENGTH};
use p25issi::error::Field;
use p25issi::fields::{BlockKind, BlockType, PacketType};
use p25issi::{ImbeVoiceGenerator, P25Block, P25Payload, RtpPacket};

/// Property: a value passes the range check exactly when it fits the width.
#[qc_quickcheck]
fn range_check_agrees_with_width(value: u64, bits: u8) -> TestResult {
    let bits = u32::from(bits % 65);
    let fits = bits == 64 || value >> bits == 0;
    TestResult::from_bool(check_range(Field::UnitId, value, bits).is_ok() == fits)
}

/// Property: a rejected value reports the largest value the width allows.
#[qc_quickcheck]
fn range_error_reports_maximum(value: u64, bits: u8) -> TestResult {
    let bits = u32::from(bits % 64);
    match check_range(Field::SystemId, value, bits) {
        Ok(()) => TestResult::discard(),
        Err(e) => TestResult::from_bool(e.max == max_value_for_bits(bits) && e.value == value),
    }
}

/// Property: the hex dump parses back to the same bytes.
#[qc_quickcheck]
fn hex_dump_parses_back(data: Vec<u8>) -> bool {
    read_bytes(&write_bytes(&data)).is_ok_and(|parsed| parsed == data)
}

/// Property: every block header word naming a carried block type re-encodes unchanged.
#[qc_quickcheck]
fn block_header_words_are_stable(word: u32) -> TestResult {
    match BlockHeader::from_word(word) {
        Ok(header) => TestResult::from_bool(header.to_word() == word),
        Err(_) => {
            let index = ((word >> 24) & 0x7F) as u8;
            let rejected = BlockType::from_index(index)
                .map_or(true, |block_type| block_type.kind() == BlockKind::Unsupported);
            TestResult::from_bool(rejected)
        }
    }
}

/// Property: every PTT control word re-encodes unchanged.
#[qc_quickcheck]
fn ptt_control_words_are_stable(word: u64) -> bool {
    let decoded = PttControlWord::from_word(word);
    decoded.to_word() == word
        && PttControlWord::from_bytes(&decoded.to_bytes()).is_ok_and(|again| again == decoded)
}

/// Property: every packet type word re-encodes unchanged, named PT or not.
#[qc_quickcheck]
fn packet_type_words_are_stable(word: u32) -> bool {
    let block = IssiPacketType::from_word(word);
    let packet_type = ((word >> 24) & 0x7F) as u8;
    block.to_word() == word
        && block.packet_type_value() == packet_type
        && block.packet_type().is_ok() == PacketType::from_value(packet_type).is_ok()
}

/// Property: the trailer a position carries repeats every superframe.
#[qc_quickcheck]
fn trailer_length_repeats_each_superframe(position: u16) -> TestResult {
    if position == 0 {
        return TestResult::discard();
    }
    let position = usize::from(position);
    TestResult::from_bool(
        ImbeVoiceBlock::trailer_length(position)
            == ImbeVoiceBlock::trailer_length(position + IMBE_FRAMES_PER_CYCLE)
    )
}

/// Property: generated voice blocks sit at their superframe slot with the
/// trailer that slot calls for.
#[qc_quickcheck]
fn generated_blocks_match_their_slot(position: u16, frame: Vec<u16>) -> TestResult {
    if position == 0 || frame.len() < 8 {
        return TestResult::discard();
    }
    let widths = [12, 12, 12, 12, 11, 11, 11, 7];
    let mut vectors = [0u16; 8];
    for (i, width) in widths.into_iter().enumerate() {
        vectors[i] = frame[i] & ((1 << width) - 1);
    }
    let generator = ImbeVoiceGenerator::from_frames(vec![vectors]).unwrap();
    let position = usize::from(position);
    let block = generator.block_at(position);
    let slot = (position - 1) % IMBE_FRAMES_PER_CYCLE + 1;
    TestResult::from_bool(
        block.position() == slot
            && block.encoded_len() == block.expected_len().unwrap_or(0)
            && block.message_vectors() == &vectors
            && ImbeVoiceBlock::from_bytes(&block.to_bytes()).is_ok_and(|decoded| decoded == block),
    )
}

/// Property: progress payloads survive encode and decode for any identity
/// and any run of voice positions.
#[qc_quickcheck]
fn progress_payloads_survive_the_wire(
    wacn: u32,
    system: u16,
    unit: u32,
    first_position: u8,
    voice_count: u8,
) -> TestResult {
    let word = match PttControlWord::new(wacn & 0xF_FFFF, system & 0xFFF, unit & 0xFF_FFFF, 0) {
        Ok(word) => word,
        Err(_) => return TestResult::failed(),
    };
    let first_position = usize::from(first_position) + 1;
    let payload = P25Payload::builder(IssiPacketType::new(PacketType::PttTransmitProgress))
        .ptt_control_word(word)
        .voice_blocks(
            (0..usize::from(voice_count % 4))
                .map(|i| ImbeVoiceBlock::at_position(first_position + i)),
        )
        .build();
    let payload = match payload {
        Ok(payload) => payload,
        Err(_) => return TestResult::failed(),
    };
    let decoded = payload
        .to_bytes()
        .and_then(|bytes| P25Payload::from_bytes(&bytes));
    TestResult::from_bool(decoded.is_ok_and(|decoded| decoded == payload))
}

/// Property: any datagram of legal size decodes and re-encodes byte for byte.
#[qc_quickcheck]
fn rtp_datagrams_are_stable(header: Vec<u8>, payload: Vec<u8>) -> TestResult {
    if header.len() < RTP_FIXED_HEADER_LENGTH || payload.len() > RTP_MAX_PAYLOAD_LENGTH {
        return TestResult::discard();
    }
    let mut datagram = header[..RTP_FIXED_HEADER_LENGTH].to_vec();
    datagram.extend_from_slice(&payload);
    match RtpPacket::from_bytes(&datagram) {
        Ok(packet) => TestResult::from_bool(
            packet.to_bytes() == datagram && packet.payload_len() == payload.len(),
        ),
        Err(_) => TestResult::failed(),
    }
}
