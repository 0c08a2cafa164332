//! Block type indices and their registry.
//!
//! The registry is built once from a table of single entries and numbered
//! ranges, then shared read-only by every thread through [`registry`].

use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::{
    BT_CONSOLE_PTT_CONTROL_WORD, BT_IMBE_VOICE, BT_ISSI_HEADER_INFO,
    BT_MANUFACTURER_SPECIFIC_FIRST, BT_MAX, BT_PACKET_TYPE, BT_PTT_CONTROL_WORD,
};
use crate::error::P25PayloadError;

/// One row of the registry source table.
enum RegistryEntry {
    Single(u8, &'static str),
    Range(u8, u8, &'static str),
}

const REGISTRY_TABLE: &[RegistryEntry] = &[
    RegistryEntry::Single(0, "IMBE Voice"),
    RegistryEntry::Single(1, "Packet Type"),
    RegistryEntry::Range(2, 4, "Reserved 1, Type"),
    RegistryEntry::Single(5, "ISSI Header Information"),
    RegistryEntry::Single(6, "Voice Header Part 1"),
    RegistryEntry::Single(7, "Voice Header Part 2"),
    RegistryEntry::Single(8, "Reserved 2, Block PT"),
    RegistryEntry::Single(9, "Start of Stream"),
    RegistryEntry::Single(10, "End of Stream"),
    RegistryEntry::Single(11, "RF PTT Control Word"),
    RegistryEntry::Single(12, "Voter Report"),
    RegistryEntry::Single(13, "Voter Control"),
    RegistryEntry::Single(14, "TX Key Acknowledge"),
    RegistryEntry::Single(15, "Console PTT Control Word Block Type"),
    RegistryEntry::Range(16, 62, "Future Expansion, Type"),
    RegistryEntry::Range(63, 127, "Manufacturer Specific, Type"),
];

/// Immutable index to description table for block types.
#[derive(Debug)]
pub struct BlockTypeRegistry {
    descriptions: Vec<Option<String>>,
}

impl BlockTypeRegistry {
    fn build() -> Self {
        let mut descriptions = vec![None; BT_MAX as usize + 1];
        for entry in REGISTRY_TABLE {
            match *entry {
                RegistryEntry::Single(index, tag) => {
                    descriptions[index as usize] = Some(tag.to_string());
                }
                RegistryEntry::Range(first, last, prefix) => {
                    for index in first..=last {
                        descriptions[index as usize] = Some(format!("{prefix}{index}"));
                    }
                }
            }
        }
        Self { descriptions }
    }

    /// Description of `index`.
    ///
    /// # Errors
    /// - [`P25PayloadError::UnknownBlockTypeIndex`] - No table entry for `index`
    pub fn description(&self, index: u8) -> Result<&str, P25PayloadError> {
        self.descriptions
            .get(index as usize)
            .and_then(|d| d.as_deref())
            .ok_or(P25PayloadError::UnknownBlockTypeIndex(index))
    }

    /// Index whose description equals `description` exactly.
    ///
    /// # Errors
    /// - [`P25PayloadError::UnknownDescription`] - No entry matches
    pub fn index_of(&self, description: &str) -> Result<u8, P25PayloadError> {
        self.descriptions
            .iter()
            .position(|d| d.as_deref() == Some(description))
            .map(|index| index as u8)
            .ok_or_else(|| P25PayloadError::UnknownDescription(description.to_string()))
    }

    /// Number of registered indices.
    pub fn len(&self) -> usize {
        self.descriptions.iter().filter(|d| d.is_some()).count()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

static REGISTRY: LazyLock<BlockTypeRegistry> = LazyLock::new(BlockTypeRegistry::build);

/// Process-wide block type registry, built on first use.
pub fn registry() -> &'static BlockTypeRegistry {
    &REGISTRY
}

/// What a block type index means to the payload codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    ImbeVoice,
    PacketType,
    IssiHeaderWord,
    PttControlWord,
    ConsolePttControlWord,
    ManufacturerSpecific,
    /// Registered but not carried by this codec.
    Unsupported,
}

/// A registered block type index (0..=127).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockType(u8);

impl BlockType {
    pub const IMBE_VOICE: Self = Self(BT_IMBE_VOICE);
    pub const PACKET_TYPE: Self = Self(BT_PACKET_TYPE);
    pub const ISSI_HEADER_INFO: Self = Self(BT_ISSI_HEADER_INFO);
    pub const PTT_CONTROL_WORD: Self = Self(BT_PTT_CONTROL_WORD);
    pub const CONSOLE_PTT_CONTROL_WORD: Self = Self(BT_CONSOLE_PTT_CONTROL_WORD);

    /// Looks `index` up in the registry.
    ///
    /// # Errors
    /// - [`P25PayloadError::UnknownBlockTypeIndex`] - Index not registered
    pub fn from_index(index: u8) -> Result<Self, P25PayloadError> {
        registry().description(index)?;
        Ok(Self(index))
    }

    /// Finds the block type with exactly this description.
    ///
    /// # Errors
    /// - [`P25PayloadError::UnknownDescription`] - No entry matches
    pub fn from_description(description: &str) -> Result<Self, P25PayloadError> {
        registry().index_of(description).map(Self)
    }

    /// Wire value.
    #[inline]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Registered description.
    pub fn description(self) -> &'static str {
        registry().description(self.0).unwrap_or("Unknown")
    }

    /// Classification used for body dispatch.
    pub const fn kind(self) -> BlockKind {
        match self.0 {
            BT_IMBE_VOICE => BlockKind::ImbeVoice,
            BT_PACKET_TYPE => BlockKind::PacketType,
            BT_ISSI_HEADER_INFO => BlockKind::IssiHeaderWord,
            BT_PTT_CONTROL_WORD => BlockKind::PttControlWord,
            BT_CONSOLE_PTT_CONTROL_WORD => BlockKind::ConsolePttControlWord,
            BT_MANUFACTURER_SPECIFIC_FIRST..=BT_MAX => BlockKind::ManufacturerSpecific,
            _ => BlockKind::Unsupported,
        }
    }

    /// Fixed body length, or `None` when the header's BL decides.
    pub const fn fixed_body_length(self) -> Option<usize> {
        use crate::constants::*;
        match self.kind() {
            BlockKind::PacketType => Some(ISSI_PACKET_TYPE_LENGTH),
            BlockKind::PttControlWord => Some(PTT_CONTROL_WORD_LENGTH),
            BlockKind::ConsolePttControlWord => Some(CONSOLE_PTT_CONTROL_WORD_LENGTH),
            BlockKind::IssiHeaderWord => Some(ISSI_HEADER_WORD_LENGTH),
            BlockKind::ImbeVoice | BlockKind::ManufacturerSpecific | BlockKind::Unsupported => {
                None
            }
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl Serialize for BlockType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> Deserialize<'de> for BlockType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let index = u8::deserialize(deserializer)?;
        BlockType::from_index(index).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_covers_all_seven_bit_indices() {
        assert_eq!(registry().len(), 128);
        assert!(!registry().is_empty());
        assert_eq!(registry().description(0).unwrap(), "IMBE Voice");
        assert_eq!(registry().description(3).unwrap(), "Reserved 1, Type3");
        assert_eq!(registry().description(62).unwrap(), "Future Expansion, Type62");
        assert_eq!(
            registry().description(127).unwrap(),
            "Manufacturer Specific, Type127"
        );
    }

    #[test]
    fn lookup_beyond_table_fails() {
        assert_eq!(
            BlockType::from_index(128),
            Err(P25PayloadError::UnknownBlockTypeIndex(128))
        );
    }

    #[test]
    fn lookup_by_description() {
        assert_eq!(
            BlockType::from_description("RF PTT Control Word").unwrap(),
            BlockType::PTT_CONTROL_WORD
        );
        assert_eq!(
            BlockType::from_description("Future Expansion, Type16")
                .unwrap()
                .index(),
            16
        );
        assert!(matches!(
            BlockType::from_description("rf ptt control word"),
            Err(P25PayloadError::UnknownDescription(_))
        ));
    }

    #[test]
    fn kinds_and_body_lengths() {
        assert_eq!(BlockType::IMBE_VOICE.kind(), BlockKind::ImbeVoice);
        assert_eq!(BlockType::IMBE_VOICE.fixed_body_length(), None);
        assert_eq!(BlockType::PACKET_TYPE.fixed_body_length(), Some(4));
        assert_eq!(BlockType::PTT_CONTROL_WORD.fixed_body_length(), Some(8));
        assert_eq!(BlockType::CONSOLE_PTT_CONTROL_WORD.fixed_body_length(), Some(24));
        assert_eq!(BlockType::ISSI_HEADER_INFO.fixed_body_length(), Some(18));
        assert_eq!(
            BlockType::from_index(63).unwrap().kind(),
            BlockKind::ManufacturerSpecific
        );
        assert_eq!(BlockType::from_index(9).unwrap().kind(), BlockKind::Unsupported);
    }

    #[test]
    fn concurrent_lookups_see_same_table() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| registry() as *const BlockTypeRegistry as usize))
            .collect();
        let first = registry() as *const BlockTypeRegistry as usize;
        for handle in handles {
            assert_eq!(handle.join().unwrap(), first);
        }
    }
}
