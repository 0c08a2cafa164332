//! Transmit priority enumerations of the PTT control words.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Field, P25PayloadError, RangeError};

/// Upper nibble of the TP byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum TransmitPriorityType {
    #[default]
    Normal = 0,
    Priority = 1,
    PreemptivePriority = 2,
}

impl TransmitPriorityType {
    pub const ALL: [TransmitPriorityType; 3] = [
        TransmitPriorityType::Normal,
        TransmitPriorityType::Priority,
        TransmitPriorityType::PreemptivePriority,
    ];

    /// Maps a wire value.
    ///
    /// # Errors
    /// - [`RangeError`] - Value beyond `PreemptivePriority`
    pub fn from_value(value: u8) -> Result<Self, RangeError> {
        Self::ALL.get(value as usize).copied().ok_or(RangeError {
            field: Field::TransmitPriorityType,
            value: value as u64,
            max: 2,
        })
    }

    /// Case-insensitive lookup by description.
    ///
    /// # Errors
    /// - [`P25PayloadError::UnknownDescription`] - No match
    pub fn from_description(description: &str) -> Result<Self, P25PayloadError> {
        Self::ALL
            .iter()
            .copied()
            .find(|tp| tp.description().eq_ignore_ascii_case(description))
            .ok_or_else(|| P25PayloadError::UnknownDescription(description.to_string()))
    }

    /// Wire value.
    #[inline]
    pub const fn value(self) -> u8 {
        self as u8
    }

    pub const fn description(self) -> &'static str {
        match self {
            TransmitPriorityType::Normal => "Normal",
            TransmitPriorityType::Priority => "Priority",
            TransmitPriorityType::PreemptivePriority => "Preemptive Priority",
        }
    }
}

impl fmt::Display for TransmitPriorityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Console transmission descriptor (TD).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum TransmissionDescriptor {
    #[default]
    Trunking = 0,
    Conventional = 1,
}

impl TransmissionDescriptor {
    pub const ALL: [TransmissionDescriptor; 2] = [
        TransmissionDescriptor::Trunking,
        TransmissionDescriptor::Conventional,
    ];

    /// Maps a wire value.
    ///
    /// # Errors
    /// - [`RangeError`] - Value is neither 0 nor 1
    pub fn from_value(value: u8) -> Result<Self, RangeError> {
        Self::ALL.get(value as usize).copied().ok_or(RangeError {
            field: Field::TransmissionDescriptor,
            value: value as u64,
            max: 1,
        })
    }

    /// Lookup by description.
    ///
    /// # Errors
    /// - [`P25PayloadError::UnknownDescription`] - No match
    pub fn from_description(description: &str) -> Result<Self, P25PayloadError> {
        Self::ALL
            .iter()
            .copied()
            .find(|td| td.description() == description)
            .ok_or_else(|| P25PayloadError::UnknownDescription(description.to_string()))
    }

    /// Lookup by two-digit hex form.
    ///
    /// # Errors
    /// - [`P25PayloadError::UnknownDescription`] - No match
    pub fn from_hex_string(hex: &str) -> Result<Self, P25PayloadError> {
        Self::ALL
            .iter()
            .copied()
            .find(|td| td.hex_string() == hex)
            .ok_or_else(|| P25PayloadError::UnknownDescription(hex.to_string()))
    }

    #[inline]
    pub const fn value(self) -> u8 {
        self as u8
    }

    pub const fn hex_string(self) -> &'static str {
        match self {
            TransmissionDescriptor::Trunking => "00",
            TransmissionDescriptor::Conventional => "01",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            TransmissionDescriptor::Trunking => "Trunking transmission",
            TransmissionDescriptor::Conventional => "Conventional transmission",
        }
    }
}

impl fmt::Display for TransmissionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Console transmission request priority (CTXP), Priority 1 through 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ConsoleTransmissionRequestPriority(u8);

const CTXP_HEX: [&str; 8] = ["10", "30", "50", "70", "90", "B0", "D0", "F0"];

impl ConsoleTransmissionRequestPriority {
    /// Number of defined priorities.
    pub const COUNT: usize = CTXP_HEX.len();

    /// Maps a wire index (0 is Priority 1).
    ///
    /// # Errors
    /// - [`RangeError`] - Index beyond Priority 8
    pub fn from_value(value: u8) -> Result<Self, RangeError> {
        if value as usize >= Self::COUNT {
            return Err(RangeError {
                field: Field::ConsoleTransmissionPriority,
                value: value as u64,
                max: Self::COUNT as u64 - 1,
            });
        }
        Ok(Self(value))
    }

    /// Lookup by description ("Priority 3").
    ///
    /// # Errors
    /// - [`P25PayloadError::UnknownDescription`] - No match
    pub fn from_description(description: &str) -> Result<Self, P25PayloadError> {
        (0..Self::COUNT as u8)
            .map(Self)
            .find(|p| p.description() == description)
            .ok_or_else(|| P25PayloadError::UnknownDescription(description.to_string()))
    }

    /// Lookup by hex form ("B0").
    ///
    /// # Errors
    /// - [`P25PayloadError::UnknownDescription`] - No match
    pub fn from_hex_string(hex: &str) -> Result<Self, P25PayloadError> {
        CTXP_HEX
            .iter()
            .position(|h| *h == hex)
            .map(|index| Self(index as u8))
            .ok_or_else(|| P25PayloadError::UnknownDescription(hex.to_string()))
    }

    #[inline]
    pub const fn value(self) -> u8 {
        self.0
    }

    pub const fn hex_string(self) -> &'static str {
        CTXP_HEX[self.0 as usize]
    }

    pub fn description(self) -> String {
        format!("Priority {}", self.0 + 1)
    }
}

impl TryFrom<u8> for ConsoleTransmissionRequestPriority {
    type Error = RangeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<ConsoleTransmissionRequestPriority> for u8 {
    fn from(priority: ConsoleTransmissionRequestPriority) -> Self {
        priority.0
    }
}

impl fmt::Display for ConsoleTransmissionRequestPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Priority {}", self.0 + 1)
    }
}
