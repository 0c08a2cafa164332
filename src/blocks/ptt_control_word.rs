//! The RF PTT control word: who is talking and at what priority.
//!
//! ```text
//!  63            44 43      32 31                 8 7      0
//! +----------------+----------+--------------------+--------+
//! |      WACN      |  System  |        Unit        |   TP   |
//! +----------------+----------+--------------------+--------+
//! ```

use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};

use crate::bits::{check_range, extract, read_u64};
use crate::constants::PTT_CONTROL_WORD_LENGTH;
use crate::error::{Field, P25PayloadError, ParseContext, RangeError};
use crate::fields::TransmitPriorityType;
use crate::render;
use crate::traits::{P25Block, require_len};

/// PTT control word: WACN-ID(20), System-ID(12), Unit-ID(24) and the
/// transmit priority byte, whose upper nibble is a [`TransmitPriorityType`]
/// and lower nibble a priority level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PttControlWord {
    wacn_id: u32,
    system_id: u16,
    unit_id: u32,
    transmit_priority: u8,
}

impl PttControlWord {
    /// Builds a control word, validating every field.
    ///
    /// # Errors
    /// - [`RangeError`] - A field exceeds its bit width
    pub fn new(
        wacn_id: u32,
        system_id: u16,
        unit_id: u32,
        transmit_priority: u8,
    ) -> Result<Self, RangeError> {
        let mut word = Self::default();
        word.set_wacn_id(wacn_id)?;
        word.set_system_id(system_id)?;
        word.set_unit_id(unit_id)?;
        word.set_transmit_priority(transmit_priority);
        Ok(word)
    }

    pub fn wacn_id(&self) -> u32 {
        self.wacn_id
    }

    pub fn set_wacn_id(&mut self, wacn_id: u32) -> Result<(), RangeError> {
        check_range(Field::WacnId, wacn_id as u64, 20)?;
        self.wacn_id = wacn_id;
        Ok(())
    }

    pub fn system_id(&self) -> u16 {
        self.system_id
    }

    pub fn set_system_id(&mut self, system_id: u16) -> Result<(), RangeError> {
        check_range(Field::SystemId, system_id as u64, 12)?;
        self.system_id = system_id;
        Ok(())
    }

    pub fn unit_id(&self) -> u32 {
        self.unit_id
    }

    pub fn set_unit_id(&mut self, unit_id: u32) -> Result<(), RangeError> {
        check_range(Field::UnitId, unit_id as u64, 24)?;
        self.unit_id = unit_id;
        Ok(())
    }

    /// The raw TP byte.
    pub fn transmit_priority(&self) -> u8 {
        self.transmit_priority
    }

    pub fn set_transmit_priority(&mut self, transmit_priority: u8) {
        self.transmit_priority = transmit_priority;
    }

    /// Upper nibble of TP as a raw value.
    pub fn transmit_priority_type_value(&self) -> u8 {
        self.transmit_priority >> 4
    }

    /// Upper nibble of TP.
    ///
    /// # Errors
    /// - [`RangeError`] - The nibble names no defined priority type
    pub fn transmit_priority_type(&self) -> Result<TransmitPriorityType, RangeError> {
        TransmitPriorityType::from_value(self.transmit_priority_type_value())
    }

    /// Lower nibble of TP.
    pub fn priority_level(&self) -> u8 {
        self.transmit_priority & 0x0F
    }

    /// Sets TP from its two halves.
    ///
    /// # Errors
    /// - [`RangeError`] - `level` exceeds 4 bits
    pub fn set_priority(
        &mut self,
        priority_type: TransmitPriorityType,
        level: u8,
    ) -> Result<(), RangeError> {
        check_range(Field::TransmitPriorityLevel, level as u64, 4)?;
        self.transmit_priority = (priority_type.value() << 4) | level;
        Ok(())
    }

    /// The packed 64-bit word.
    pub fn to_word(&self) -> u64 {
        ((self.wacn_id as u64 & 0xF_FFFF) << 44)
            | ((self.system_id as u64 & 0xFFF) << 32)
            | ((self.unit_id as u64 & 0xFF_FFFF) << 8)
            | self.transmit_priority as u64
    }

    /// Unpacks a word. Every word is a valid control word.
    pub fn from_word(word: u64) -> Self {
        Self {
            wacn_id: extract(word, 44, 20) as u32,
            system_id: extract(word, 32, 12) as u16,
            unit_id: extract(word, 8, 24) as u32,
            transmit_priority: extract(word, 0, 8) as u8,
        }
    }

    /// Field list shared with the console control word dump.
    pub(crate) fn issi_fields(&self) -> String {
        format!(
            "\tWide Area Communication Network: {}\n\tSystem ID: {}\n\tUnit ID: {}\n\tTransmit Priority: {}\n\tTransmit Level: {}",
            render::hex(self.wacn_id as u64, 5),
            render::hex(self.system_id as u64, 3),
            render::hex(self.unit_id as u64, 6),
            render::hex(self.transmit_priority_type_value() as u64, 2),
            render::hex(self.priority_level() as u64, 2),
        )
    }

    /// Attribute list shared with the console control word element.
    pub(crate) fn xml_attributes(&self) -> String {
        let priority_type = match self.transmit_priority_type() {
            Ok(tp) => tp.to_string(),
            Err(_) => self.transmit_priority_type_value().to_string(),
        };
        format!(
            "\n wacnId=\"{}\"\n systemId=\"{}\"\n unitId=\"{}\"\n transmitPriority=\"{}\"\n transmitPriorityLevel=\"{}\"",
            self.wacn_id,
            self.system_id,
            self.unit_id,
            priority_type,
            self.priority_level()
        )
    }
}

impl P25Block for PttControlWord {
    const NAME: &'static str = "ptt-control-word";

    fn from_bytes(data: &[u8]) -> Result<Self, P25PayloadError> {
        require_len(data, PTT_CONTROL_WORD_LENGTH, ParseContext::PttControlWord)?;
        Ok(Self::from_word(read_u64(data, 0)))
    }

    fn encoded_len(&self) -> usize {
        PTT_CONTROL_WORD_LENGTH
    }

    fn encode_into(&self, out: &mut BytesMut) {
        out.put_u64(self.to_word());
    }

    fn to_issi_string(&self) -> String {
        self.issi_fields()
    }

    fn to_xml(&self) -> String {
        format!("<ptt-control-word{}\n/>", self.xml_attributes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_all_fields_at_max() {
        let word = PttControlWord::new(0xF_FFFF, 0xFFF, 0xFF_FFFF, 0xFF).unwrap();
        assert_eq!(word.to_bytes(), vec![0xFF; 8]);
        assert_eq!(PttControlWord::from_bytes(&[0xFF; 8]).unwrap(), word);
    }

    #[test]
    fn field_offsets() {
        let word = PttControlWord::new(0xBEE00, 0x123, 0x00_0042, 0x21).unwrap();
        assert_eq!(
            word.to_bytes(),
            vec![0xBE, 0xE0, 0x01, 0x23, 0x00, 0x00, 0x42, 0x21]
        );
        assert_eq!(word.transmit_priority_type().unwrap(), TransmitPriorityType::PreemptivePriority);
        assert_eq!(word.priority_level(), 1);
    }

    #[test]
    fn priority_halves() {
        let mut word = PttControlWord::default();
        word.set_priority(TransmitPriorityType::Priority, 0xF).unwrap();
        assert_eq!(word.transmit_priority(), 0x1F);
        assert!(word.set_priority(TransmitPriorityType::Normal, 0x10).is_err());

        word.set_transmit_priority(0x30);
        assert!(word.transmit_priority_type().is_err());
        assert!(word.to_xml().contains("transmitPriority=\"3\""));
    }

    #[test]
    fn range_checks() {
        assert_eq!(
            PttControlWord::new(0x10_0000, 0, 0, 0).unwrap_err().field,
            Field::WacnId
        );
        assert_eq!(
            PttControlWord::new(0, 0x1000, 0, 0).unwrap_err().field,
            Field::SystemId
        );
        assert_eq!(
            PttControlWord::new(0, 0, 0x100_0000, 0).unwrap_err().field,
            Field::UnitId
        );
    }

    #[test]
    fn issi_string_layout() {
        let word = PttControlWord::new(1, 2, 3, 0x14).unwrap();
        assert_eq!(
            word.to_issi_string(),
            "\tWide Area Communication Network: %x00001\n\tSystem ID: %x002\n\tUnit ID: %x000003\n\
             \tTransmit Priority: %x01\n\tTransmit Level: %x04"
        );
    }
}
