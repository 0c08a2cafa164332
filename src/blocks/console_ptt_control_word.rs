//! The console PTT control word, sent by dispatch consoles in place of the
//! RF control word. Its first eight bytes are an ordinary [`PttControlWord`].

use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};

use crate::bits::{check_range, extract, read_u64};
use crate::blocks::PttControlWord;
use crate::constants::CONSOLE_PTT_CONTROL_WORD_LENGTH;
use crate::error::{Field, P25PayloadError, ParseContext, RangeError};
use crate::fields::{ConsoleTransmissionRequestPriority, TransmissionDescriptor};
use crate::render;
use crate::traits::{P25Block, require_len};

const CONSOLE_ID_BITS: u32 = 56;

/// Console PTT control word: the RF control word followed by the console
/// id, transmission descriptor, voice source id and console transmission
/// request priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConsolePttControlWord {
    ptt: PttControlWord,
    console_id: u64,
    transmission_descriptor: u8,
    voice_source_id: u64,
    console_transmission_priority: u8,
}

impl Default for ConsolePttControlWord {
    fn default() -> Self {
        Self {
            ptt: PttControlWord::default(),
            console_id: 0,
            transmission_descriptor: TransmissionDescriptor::Trunking.value(),
            voice_source_id: 0,
            console_transmission_priority: 1,
        }
    }
}

impl ConsolePttControlWord {
    /// Wraps an RF control word with default console fields.
    pub fn new(ptt: PttControlWord) -> Self {
        Self {
            ptt,
            ..Self::default()
        }
    }

    pub fn ptt_control_word(&self) -> &PttControlWord {
        &self.ptt
    }

    pub fn ptt_control_word_mut(&mut self) -> &mut PttControlWord {
        &mut self.ptt
    }

    pub fn console_id(&self) -> u64 {
        self.console_id
    }

    pub fn set_console_id(&mut self, console_id: u64) -> Result<(), RangeError> {
        check_range(Field::ConsoleId, console_id, CONSOLE_ID_BITS)?;
        self.console_id = console_id;
        Ok(())
    }

    /// Raw TD byte.
    pub fn transmission_descriptor_value(&self) -> u8 {
        self.transmission_descriptor
    }

    /// TD decoded.
    ///
    /// # Errors
    /// - [`RangeError`] - TD names no defined descriptor
    pub fn transmission_descriptor(&self) -> Result<TransmissionDescriptor, RangeError> {
        TransmissionDescriptor::from_value(self.transmission_descriptor)
    }

    pub fn set_transmission_descriptor(&mut self, descriptor: TransmissionDescriptor) {
        self.transmission_descriptor = descriptor.value();
    }

    pub fn voice_source_id(&self) -> u64 {
        self.voice_source_id
    }

    pub fn set_voice_source_id(&mut self, voice_source_id: u64) -> Result<(), RangeError> {
        check_range(Field::VoiceSourceId, voice_source_id, CONSOLE_ID_BITS)?;
        self.voice_source_id = voice_source_id;
        Ok(())
    }

    /// Raw CTXP byte.
    pub fn console_transmission_priority_value(&self) -> u8 {
        self.console_transmission_priority
    }

    /// CTXP decoded.
    ///
    /// # Errors
    /// - [`RangeError`] - CTXP is beyond Priority 8
    pub fn console_transmission_priority(
        &self,
    ) -> Result<ConsoleTransmissionRequestPriority, RangeError> {
        ConsoleTransmissionRequestPriority::from_value(self.console_transmission_priority)
    }

    pub fn set_console_transmission_priority(
        &mut self,
        priority: ConsoleTransmissionRequestPriority,
    ) {
        self.console_transmission_priority = priority.value();
    }

    fn from_words(first: u64, second: u64, third: u64) -> Self {
        Self {
            ptt: PttControlWord::from_word(first),
            console_id: extract(second, 8, CONSOLE_ID_BITS),
            transmission_descriptor: extract(second, 0, 8) as u8,
            voice_source_id: extract(third, 8, CONSOLE_ID_BITS),
            console_transmission_priority: extract(third, 0, 8) as u8,
        }
    }
}

impl P25Block for ConsolePttControlWord {
    const NAME: &'static str = "console-ptt-control-word";

    fn from_bytes(data: &[u8]) -> Result<Self, P25PayloadError> {
        require_len(
            data,
            CONSOLE_PTT_CONTROL_WORD_LENGTH,
            ParseContext::ConsolePttControlWord,
        )?;
        Ok(Self::from_words(
            read_u64(data, 0),
            read_u64(data, 8),
            read_u64(data, 16),
        ))
    }

    fn encoded_len(&self) -> usize {
        CONSOLE_PTT_CONTROL_WORD_LENGTH
    }

    fn encode_into(&self, out: &mut BytesMut) {
        let id_mask = crate::bits::max_value_for_bits(CONSOLE_ID_BITS);
        out.put_u64(self.ptt.to_word());
        out.put_u64(((self.console_id & id_mask) << 8) | self.transmission_descriptor as u64);
        out.put_u64(
            ((self.voice_source_id & id_mask) << 8) | self.console_transmission_priority as u64,
        );
    }

    fn to_issi_string(&self) -> String {
        format!(
            "{}\n\tConsole ID: {}\n\tTransmission Descriptor: {}\n\tVoice Source ID: {}\n\tConsole Transmission Priority: {}",
            self.ptt.issi_fields(),
            render::hex(self.console_id, 7),
            render::hex(self.transmission_descriptor as u64, 2),
            render::hex(self.voice_source_id, 7),
            render::hex(self.console_transmission_priority as u64, 2),
        )
    }

    fn to_xml(&self) -> String {
        format!(
            "<console-ptt-control-word{}\n consoleId=\"{}\"\n transmissionDescriptor=\"{}\"\n voiceSourceId=\"{}\"\n consoleTransmissionRequestPriority=\"{}\"\n/>",
            self.ptt.xml_attributes(),
            self.console_id,
            render::hex(self.transmission_descriptor as u64, 2),
            self.voice_source_id,
            render::hex(self.console_transmission_priority as u64, 2),
        )
    }
}
