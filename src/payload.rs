//! The P25 payload carried in every ISSI RTP packet.
//!
//! ```text
//! +---------------+------------------------+--------------------------------+
//! | control octet | BHC x 4-byte headers   | block bodies, in header order  |
//! +---------------+------------------------+--------------------------------+
//! ```
//!
//! A payload always carries one ISSI packet type block. PTT Request, Start
//! and Progress add a PTT control word (RF or console). Request and
//! Progress may add an ISSI header word and up to three IMBE voice blocks.
//! Decode and encode enforce the same rules, so any payload that decodes
//! re-encodes to the bytes it came from.

use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};

use crate::blocks::{
    Block, BlockHeader, ConsolePttControlWord, ControlOctet, ImbeVoiceBlock, IssiHeaderWord,
    IssiPacketType, ManufacturerSpecific, PttControlWord,
};
use crate::constants::{
    BLOCK_HEADER_LENGTH, CONTROL_OCTET_LENGTH, IMBE_TIME_OFFSET, MAX_IMBE_VOICE_BLOCKS,
};
use crate::error::P25PayloadError;
use crate::fields::{BlockKind, BlockType, PacketType, PayloadType};
use crate::traits::P25Block;

/// A decoded or assembled P25 payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct P25Payload {
    control_octet: ControlOctet,
    block_headers: Vec<BlockHeader>,
    packet_type: IssiPacketType,
    ptt_control_word: Option<PttControlWord>,
    console_ptt_control_word: Option<ConsolePttControlWord>,
    issi_header_word: Option<IssiHeaderWord>,
    voice_blocks: Vec<ImbeVoiceBlock>,
}

/// Assembles a [`P25Payload`] from typed blocks and derives its headers.
#[derive(Debug, Clone)]
pub struct P25PayloadBuilder {
    packet_type: IssiPacketType,
    ptt_control_word: Option<PttControlWord>,
    console_ptt_control_word: Option<ConsolePttControlWord>,
    issi_header_word: Option<IssiHeaderWord>,
    voice_blocks: Vec<ImbeVoiceBlock>,
    manufacturer_specific: Vec<ManufacturerSpecific>,
}

impl P25PayloadBuilder {
    pub fn ptt_control_word(mut self, word: PttControlWord) -> Self {
        self.ptt_control_word = Some(word);
        self
    }

    pub fn console_ptt_control_word(mut self, word: ConsolePttControlWord) -> Self {
        self.console_ptt_control_word = Some(word);
        self
    }

    pub fn issi_header_word(mut self, word: IssiHeaderWord) -> Self {
        self.issi_header_word = Some(word);
        self
    }

    pub fn voice_block(mut self, block: ImbeVoiceBlock) -> Self {
        self.voice_blocks.push(block);
        self
    }

    pub fn voice_blocks(mut self, blocks: impl IntoIterator<Item = ImbeVoiceBlock>) -> Self {
        self.voice_blocks.extend(blocks);
        self
    }

    /// Accepted so callers can describe the traffic they have, but
    /// [`build`](Self::build) rejects it.
    pub fn manufacturer_specific(mut self, block: ManufacturerSpecific) -> Self {
        self.manufacturer_specific.push(block);
        self
    }

    /// Derives the control octet and block headers and checks which blocks
    /// the packet type allows.
    ///
    /// Headers are emitted as packet type, PTT control word, console PTT
    /// control word, ISSI header word, then one per voice block with TSO
    /// advancing 160 samples per block. All use the profile specific
    /// payload type. VBB of the header word is set to the voice block count.
    ///
    /// # Errors
    /// - [`P25PayloadError::ManufacturerSpecificUnsupported`] - Manufacturer blocks were added
    /// - [`P25PayloadError::TooManyVoiceBlocks`] - More than three voice blocks
    /// - [`P25PayloadError::MissingPttControlWord`] - The packet type needs one
    /// - [`P25PayloadError::BlockNotAllowed`] - Voice data outside Request or Progress
    /// - [`P25PayloadError::Range`] - A voice block is too long for its header
    pub fn build(self) -> Result<P25Payload, P25PayloadError> {
        if !self.manufacturer_specific.is_empty() {
            return Err(P25PayloadError::ManufacturerSpecificUnsupported);
        }
        if self.voice_blocks.len() > MAX_IMBE_VOICE_BLOCKS {
            return Err(P25PayloadError::TooManyVoiceBlocks(self.voice_blocks.len()));
        }

        let mut issi_header_word = self.issi_header_word;
        if let Some(word) = issi_header_word.as_mut() {
            word.set_voice_block_count(self.voice_blocks.len() as u8)?;
        }

        let mut block_headers = vec![profile_header(
            BlockType::PACKET_TYPE,
            0,
            self.packet_type.encoded_len(),
        )?];
        if let Some(word) = &self.ptt_control_word {
            block_headers.push(profile_header(
                BlockType::PTT_CONTROL_WORD,
                0,
                word.encoded_len(),
            )?);
        }
        if let Some(word) = &self.console_ptt_control_word {
            block_headers.push(profile_header(
                BlockType::CONSOLE_PTT_CONTROL_WORD,
                0,
                word.encoded_len(),
            )?);
        }
        if let Some(word) = &issi_header_word {
            block_headers.push(profile_header(
                BlockType::ISSI_HEADER_INFO,
                0,
                word.encoded_len(),
            )?);
        }
        for (index, block) in self.voice_blocks.iter().enumerate() {
            block_headers.push(profile_header(
                BlockType::IMBE_VOICE,
                index as u16 * IMBE_TIME_OFFSET,
                block.encoded_len(),
            )?);
        }

        let signal = self.packet_type.is_signalling() as u8;
        let control_octet = ControlOctet::new(signal, 0, block_headers.len() as u8)?;

        let payload = P25Payload {
            control_octet,
            block_headers,
            packet_type: self.packet_type,
            ptt_control_word: self.ptt_control_word,
            console_ptt_control_word: self.console_ptt_control_word,
            issi_header_word,
            voice_blocks: self.voice_blocks,
        };
        payload.check_arity()?;
        Ok(payload)
    }
}

fn profile_header(
    block_type: BlockType,
    timestamp_offset: u16,
    length: usize,
) -> Result<BlockHeader, P25PayloadError> {
    let length = u16::try_from(length).unwrap_or(u16::MAX);
    Ok(BlockHeader::new(
        PayloadType::ProfileSpecific,
        block_type,
        timestamp_offset,
        length,
    )?)
}

/// Places a once-only block, refusing a second copy.
fn place_once<T>(
    slot: &mut Option<T>,
    block: T,
    name: &'static str,
) -> Result<(), P25PayloadError> {
    if slot.is_some() {
        return Err(P25PayloadError::DuplicateBlock(name));
    }
    *slot = Some(block);
    Ok(())
}

/// A voice block's BL must agree with the trailer its frame type implies.
/// Frame types outside both tables are taken at their declared length.
fn check_voice_length(block: &ImbeVoiceBlock, declared: usize) -> Result<(), P25PayloadError> {
    match block.expected_len() {
        Some(expected) if expected != declared => Err(P25PayloadError::InvalidVoiceBlockLength {
            frame_type: block.frame_type(),
            expected,
            got: declared,
        }),
        _ => Ok(()),
    }
}

/// Which bodies the header walk of an encode has consumed.
#[derive(Default)]
struct BodyCursor {
    packet_type: bool,
    ptt_control_word: bool,
    console_ptt_control_word: bool,
    issi_header_word: bool,
    voice_blocks: usize,
}

impl BodyCursor {
    fn take(flag: &mut bool, present: bool, name: &'static str) -> Result<(), P25PayloadError> {
        if *flag || !present {
            return Err(P25PayloadError::HeaderBodyMismatch(name));
        }
        *flag = true;
        Ok(())
    }
}

impl P25Payload {
    /// Starts a payload around its mandatory packet type block.
    pub fn builder(packet_type: IssiPacketType) -> P25PayloadBuilder {
        P25PayloadBuilder {
            packet_type,
            ptt_control_word: None,
            console_ptt_control_word: None,
            issi_header_word: None,
            voice_blocks: Vec::new(),
            manufacturer_specific: Vec::new(),
        }
    }

    /// Decodes a payload.
    ///
    /// # Errors
    /// - [`P25PayloadError::NotEnoughData`] - Input ends inside a header or body
    /// - [`P25PayloadError::NoBlockHeaders`] - BHC is zero
    /// - [`P25PayloadError::UnsupportedBlockType`] - A header names a block this codec cannot carry
    /// - [`P25PayloadError::ManufacturerSpecificUnsupported`] - A manufacturer block is present
    /// - [`P25PayloadError::InvalidVoiceBlockLength`] - BL contradicts a voice frame type
    /// - [`P25PayloadError::DuplicateBlock`] - A once-only block repeats
    /// - [`P25PayloadError::TrailingBytes`] - Data remains after the last body
    /// - [`P25PayloadError::MissingPacketType`] - No packet type block
    /// - Any arity error [`P25PayloadBuilder::build`] reports
    pub fn from_bytes(data: &[u8]) -> Result<Self, P25PayloadError> {
        let control_octet = ControlOctet::from_bytes(data)?;
        let count = control_octet.block_header_count() as usize;
        if count == 0 {
            return Err(P25PayloadError::NoBlockHeaders);
        }

        let mut offset = CONTROL_OCTET_LENGTH;
        let mut block_headers = Vec::with_capacity(count);
        for _ in 0..count {
            block_headers.push(BlockHeader::from_bytes(&data[offset..])?);
            offset += BLOCK_HEADER_LENGTH;
        }

        let mut packet_type = None;
        let mut ptt_control_word = None;
        let mut console_ptt_control_word = None;
        let mut issi_header_word = None;
        let mut voice_blocks = Vec::new();

        for header in &block_headers {
            let kind = header.block_type().kind();
            let length = Block::body_length(header);
            let available = data.len() - offset;
            if available < length {
                return Err(P25PayloadError::NotEnoughData {
                    needed: length,
                    got: available,
                    context: Block::parse_context(kind),
                });
            }
            let body = &data[offset..offset + length];
            offset += length;

            match Block::decode(header, body)? {
                Block::PacketType(block) => {
                    place_once(&mut packet_type, block, IssiPacketType::NAME)?
                }
                Block::PttControlWord(block) => {
                    place_once(&mut ptt_control_word, block, PttControlWord::NAME)?
                }
                Block::ConsolePttControlWord(block) => place_once(
                    &mut console_ptt_control_word,
                    block,
                    ConsolePttControlWord::NAME,
                )?,
                Block::IssiHeaderWord(block) => {
                    place_once(&mut issi_header_word, block, IssiHeaderWord::NAME)?
                }
                Block::ImbeVoice(block) => {
                    check_voice_length(&block, length)?;
                    voice_blocks.push(block);
                }
            }
        }

        if offset < data.len() {
            return Err(P25PayloadError::TrailingBytes {
                extra: data.len() - offset,
            });
        }

        let payload = Self {
            control_octet,
            block_headers,
            packet_type: packet_type.ok_or(P25PayloadError::MissingPacketType)?,
            ptt_control_word,
            console_ptt_control_word,
            issi_header_word,
            voice_blocks,
        };
        payload.check_arity()?;
        Ok(payload)
    }

    /// Serialized length assuming the headers and bodies agree.
    pub fn encoded_len(&self) -> usize {
        CONTROL_OCTET_LENGTH
            + self.block_headers.len() * BLOCK_HEADER_LENGTH
            + self.packet_type.encoded_len()
            + self.ptt_control_word.map_or(0, |w| w.encoded_len())
            + self.console_ptt_control_word.map_or(0, |w| w.encoded_len())
            + self.issi_header_word.map_or(0, |w| w.encoded_len())
            + self.voice_blocks.iter().map(P25Block::encoded_len).sum::<usize>()
    }

    /// Appends the wire form to `out`. Nothing is written on error.
    ///
    /// # Errors
    /// - [`P25PayloadError::NoBlockHeaders`] - The header list is empty
    /// - [`P25PayloadError::BlockCountMismatch`] - BHC disagrees with the header list
    /// - [`P25PayloadError::HeaderBodyMismatch`] - A header has no block, or a block no header
    /// - [`P25PayloadError::InvalidVoiceBlockLength`] - A voice header's BL disagrees with its block
    /// - Any arity error [`P25PayloadBuilder::build`] reports
    pub fn encode_into(&self, out: &mut BytesMut) -> Result<(), P25PayloadError> {
        if self.block_headers.is_empty() {
            return Err(P25PayloadError::NoBlockHeaders);
        }
        let declared = self.control_octet.block_header_count() as usize;
        if declared != self.block_headers.len() {
            return Err(P25PayloadError::BlockCountMismatch {
                declared,
                actual: self.block_headers.len(),
            });
        }
        self.check_arity()?;

        let mut bodies = BytesMut::with_capacity(self.encoded_len());
        let mut cursor = BodyCursor::default();
        for header in &self.block_headers {
            match header.block_type().kind() {
                BlockKind::PacketType => {
                    BodyCursor::take(&mut cursor.packet_type, true, IssiPacketType::NAME)?;
                    self.packet_type.encode_into(&mut bodies);
                }
                BlockKind::PttControlWord => {
                    BodyCursor::take(
                        &mut cursor.ptt_control_word,
                        self.ptt_control_word.is_some(),
                        PttControlWord::NAME,
                    )?;
                    if let Some(word) = &self.ptt_control_word {
                        word.encode_into(&mut bodies);
                    }
                }
                BlockKind::ConsolePttControlWord => {
                    BodyCursor::take(
                        &mut cursor.console_ptt_control_word,
                        self.console_ptt_control_word.is_some(),
                        ConsolePttControlWord::NAME,
                    )?;
                    if let Some(word) = &self.console_ptt_control_word {
                        word.encode_into(&mut bodies);
                    }
                }
                BlockKind::IssiHeaderWord => {
                    BodyCursor::take(
                        &mut cursor.issi_header_word,
                        self.issi_header_word.is_some(),
                        IssiHeaderWord::NAME,
                    )?;
                    if let Some(word) = &self.issi_header_word {
                        word.encode_into(&mut bodies);
                    }
                }
                BlockKind::ImbeVoice => {
                    let block = self
                        .voice_blocks
                        .get(cursor.voice_blocks)
                        .ok_or(P25PayloadError::HeaderBodyMismatch(ImbeVoiceBlock::NAME))?;
                    let declared = header.block_length() as usize;
                    if declared != block.encoded_len() {
                        return Err(P25PayloadError::InvalidVoiceBlockLength {
                            frame_type: block.frame_type(),
                            expected: block.encoded_len(),
                            got: declared,
                        });
                    }
                    block.encode_into(&mut bodies);
                    cursor.voice_blocks += 1;
                }
                BlockKind::ManufacturerSpecific => {
                    return Err(P25PayloadError::ManufacturerSpecificUnsupported);
                }
                BlockKind::Unsupported => {
                    return Err(P25PayloadError::UnsupportedBlockType(
                        header.block_type().index(),
                    ));
                }
            }
        }

        let unreferenced = [
            (!cursor.packet_type, IssiPacketType::NAME),
            (
                self.ptt_control_word.is_some() && !cursor.ptt_control_word,
                PttControlWord::NAME,
            ),
            (
                self.console_ptt_control_word.is_some() && !cursor.console_ptt_control_word,
                ConsolePttControlWord::NAME,
            ),
            (
                self.issi_header_word.is_some() && !cursor.issi_header_word,
                IssiHeaderWord::NAME,
            ),
            (
                cursor.voice_blocks != self.voice_blocks.len(),
                ImbeVoiceBlock::NAME,
            ),
        ];
        if let Some(&(_, name)) = unreferenced.iter().find(|(missing, _)| *missing) {
            return Err(P25PayloadError::HeaderBodyMismatch(name));
        }

        self.control_octet.encode_into(out);
        for header in &self.block_headers {
            header.encode_into(out);
        }
        out.put_slice(&bodies);
        Ok(())
    }

    /// The wire form.
    ///
    /// # Errors
    /// See [`P25Payload::encode_into`].
    pub fn to_bytes(&self) -> Result<Vec<u8>, P25PayloadError> {
        let mut out = BytesMut::with_capacity(self.encoded_len());
        self.encode_into(&mut out)?;
        Ok(out.to_vec())
    }

    /// Unnamed PT values need no PTT control word and carry no voice.
    fn check_arity(&self) -> Result<(), P25PayloadError> {
        let packet_type = self.packet_type.packet_type().ok();
        let needs_ptt = packet_type.filter(|named| named.requires_ptt_control_word());
        if let (Some(named), None, None) = (
            needs_ptt,
            &self.ptt_control_word,
            &self.console_ptt_control_word,
        ) {
            return Err(P25PayloadError::MissingPttControlWord(named));
        }
        if !packet_type.is_some_and(PacketType::carries_voice) {
            let packet_type = self.packet_type.packet_type_value();
            if self.issi_header_word.is_some() {
                return Err(not_allowed(IssiHeaderWord::NAME, packet_type));
            }
            if !self.voice_blocks.is_empty() {
                return Err(not_allowed(ImbeVoiceBlock::NAME, packet_type));
            }
        }
        if self.voice_blocks.len() > MAX_IMBE_VOICE_BLOCKS {
            return Err(P25PayloadError::TooManyVoiceBlocks(self.voice_blocks.len()));
        }
        Ok(())
    }

    pub fn control_octet(&self) -> &ControlOctet {
        &self.control_octet
    }

    /// Direct access to the control octet. Changing BHC here makes the
    /// payload fail to encode until the header list agrees.
    pub fn control_octet_mut(&mut self) -> &mut ControlOctet {
        &mut self.control_octet
    }

    pub fn block_headers(&self) -> &[BlockHeader] {
        &self.block_headers
    }

    /// Replaces the header list without touching BHC or the bodies.
    pub fn set_block_headers(&mut self, block_headers: Vec<BlockHeader>) {
        self.block_headers = block_headers;
    }

    pub fn packet_type(&self) -> &IssiPacketType {
        &self.packet_type
    }

    pub fn ptt_control_word(&self) -> Option<&PttControlWord> {
        self.ptt_control_word.as_ref()
    }

    pub fn console_ptt_control_word(&self) -> Option<&ConsolePttControlWord> {
        self.console_ptt_control_word.as_ref()
    }

    pub fn issi_header_word(&self) -> Option<&IssiHeaderWord> {
        self.issi_header_word.as_ref()
    }

    pub fn voice_blocks(&self) -> &[ImbeVoiceBlock] {
        &self.voice_blocks
    }

    /// Shorthand for the packet type carried.
    ///
    /// # Errors
    /// - [`P25PayloadError::UnknownPacketType`] - PT has no defined meaning
    pub fn kind(&self) -> Result<PacketType, P25PayloadError> {
        self.packet_type.packet_type()
    }

    /// Control octet, headers, then each body titled by its block type.
    pub fn to_issi_string(&self) -> String {
        let mut out = format!("Control Octet\n{}", self.control_octet.to_issi_string());
        for (index, header) in self.block_headers.iter().enumerate() {
            out.push_str(&format!(
                "Block Header {}\n{}\n",
                index + 1,
                header.to_issi_string()
            ));
        }
        let mut sections = vec![(
            BlockType::PACKET_TYPE.description(),
            self.packet_type.to_issi_string(),
        )];
        if let Some(word) = &self.ptt_control_word {
            sections.push((BlockType::PTT_CONTROL_WORD.description(), word.to_issi_string()));
        }
        if let Some(word) = &self.console_ptt_control_word {
            sections.push((
                BlockType::CONSOLE_PTT_CONTROL_WORD.description(),
                word.to_issi_string(),
            ));
        }
        if let Some(word) = &self.issi_header_word {
            sections.push((BlockType::ISSI_HEADER_INFO.description(), word.to_issi_string()));
        }
        for block in &self.voice_blocks {
            sections.push((BlockType::IMBE_VOICE.description(), block.to_issi_string()));
        }
        for (title, body) in sections {
            out.push_str(&format!("{title}\n{body}\n"));
        }
        out
    }

    /// `<p25-payload>` element wrapping every block element.
    pub fn to_xml(&self) -> String {
        let mut out = String::from("<p25-payload>\n");
        out.push_str(&self.control_octet.to_xml());
        out.push('\n');
        for header in &self.block_headers {
            out.push_str(&header.to_xml());
            out.push('\n');
        }
        if let Some(word) = &self.issi_header_word {
            out.push_str(&word.to_xml());
            out.push('\n');
        }
        out.push_str(&self.packet_type.to_xml());
        out.push('\n');
        if let Some(word) = &self.ptt_control_word {
            out.push_str(&word.to_xml());
            out.push('\n');
        }
        if let Some(word) = &self.console_ptt_control_word {
            out.push_str(&word.to_xml());
            out.push('\n');
        }
        for block in &self.voice_blocks {
            out.push_str(&block.to_xml());
            out.push('\n');
        }
        out.push_str("</p25-payload>");
        out
    }
}

fn not_allowed(block: &'static str, packet_type: u8) -> P25PayloadError {
    P25PayloadError::BlockNotAllowed { block, packet_type }
}

impl TryFrom<&[u8]> for P25Payload {
    type Error = P25PayloadError;

    fn try_from(data: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(data)
    }
}
