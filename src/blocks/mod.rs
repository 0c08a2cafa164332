//! Bit-packed block structures of the P25 payload.
//!
//! Each structure implements [`P25Block`](crate::traits::P25Block). The
//! [`Block`] sum type is what the payload assembler dispatches on once a
//! block header has said what follows.

pub mod block_header;
pub mod console_ptt_control_word;
pub mod control_octet;
pub mod imbe_voice;
pub mod issi_header_word;
pub mod issi_packet_type;
pub mod manufacturer_specific;
pub mod ptt_control_word;

pub use block_header::BlockHeader;
pub use console_ptt_control_word::ConsolePttControlWord;
pub use control_octet::ControlOctet;
pub use imbe_voice::ImbeVoiceBlock;
pub use issi_header_word::IssiHeaderWord;
pub use issi_packet_type::IssiPacketType;
pub use manufacturer_specific::ManufacturerSpecific;
pub use ptt_control_word::PttControlWord;

use crate::error::{P25PayloadError, ParseContext};
use crate::fields::BlockKind;
use crate::traits::P25Block;

/// One decoded payload block body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    PacketType(IssiPacketType),
    PttControlWord(PttControlWord),
    ConsolePttControlWord(ConsolePttControlWord),
    IssiHeaderWord(IssiHeaderWord),
    ImbeVoice(ImbeVoiceBlock),
}

impl Block {
    /// Number of body bytes `header` announces: the fixed size for fixed
    /// blocks, BL for everything else.
    pub fn body_length(header: &BlockHeader) -> usize {
        header
            .block_type()
            .fixed_body_length()
            .unwrap_or(header.block_length() as usize)
    }

    /// Structure name used when the body runs short.
    pub fn parse_context(kind: BlockKind) -> ParseContext {
        match kind {
            BlockKind::PacketType => ParseContext::IssiPacketType,
            BlockKind::PttControlWord => ParseContext::PttControlWord,
            BlockKind::ConsolePttControlWord => ParseContext::ConsolePttControlWord,
            BlockKind::IssiHeaderWord => ParseContext::IssiHeaderWord,
            BlockKind::ImbeVoice => ParseContext::ImbeVoiceBlock,
            BlockKind::ManufacturerSpecific => ParseContext::ManufacturerSpecific,
            BlockKind::Unsupported => ParseContext::BlockHeader,
        }
    }

    /// Decodes the body `data` that follows `header`'s slot in the payload.
    ///
    /// `data` must be exactly the body: IMBE voice blocks take every byte
    /// past their fixed part as trailer.
    ///
    /// # Errors
    /// - [`P25PayloadError::ManufacturerSpecificUnsupported`] - The header names a manufacturer block
    /// - [`P25PayloadError::UnsupportedBlockType`] - The header names a reserved block type
    /// - [`P25PayloadError`] - The body is too short for its type
    pub fn decode(header: &BlockHeader, data: &[u8]) -> Result<Self, P25PayloadError> {
        let block_type = header.block_type();
        let block = match block_type.kind() {
            BlockKind::PacketType => Block::PacketType(IssiPacketType::from_bytes(data)?),
            BlockKind::PttControlWord => Block::PttControlWord(PttControlWord::from_bytes(data)?),
            BlockKind::ConsolePttControlWord => {
                Block::ConsolePttControlWord(ConsolePttControlWord::from_bytes(data)?)
            }
            BlockKind::IssiHeaderWord => Block::IssiHeaderWord(IssiHeaderWord::from_bytes(data)?),
            BlockKind::ImbeVoice => Block::ImbeVoice(ImbeVoiceBlock::from_bytes(data)?),
            BlockKind::ManufacturerSpecific => {
                return Err(P25PayloadError::ManufacturerSpecificUnsupported);
            }
            BlockKind::Unsupported => {
                return Err(P25PayloadError::UnsupportedBlockType(block_type.index()));
            }
        };
        Ok(block)
    }
}
