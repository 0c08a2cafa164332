//! The E bit of a block header.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Field, RangeError};

/// Whether a block's type index is IANA assigned or P25 profile specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PayloadType {
    #[default]
    Iana = 0,
    ProfileSpecific = 1,
}

impl PayloadType {
    /// Maps the 1-bit wire value.
    ///
    /// # Errors
    /// - [`RangeError`] - `value` is wider than one bit
    pub fn from_value(value: u8) -> Result<Self, RangeError> {
        match value {
            0 => Ok(PayloadType::Iana),
            1 => Ok(PayloadType::ProfileSpecific),
            _ => Err(RangeError {
                field: Field::PayloadType,
                value: value as u64,
                max: 1,
            }),
        }
    }

    /// Maps a decoded E bit.
    #[inline]
    pub const fn from_bit(bit: bool) -> Self {
        if bit {
            PayloadType::ProfileSpecific
        } else {
            PayloadType::Iana
        }
    }

    /// Wire value.
    #[inline]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Human readable name.
    pub const fn description(self) -> &'static str {
        match self {
            PayloadType::Iana => "IANA type",
            PayloadType::ProfileSpecific => "P25 profile specific type",
        }
    }
}

impl fmt::Display for PayloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_type_values() {
        assert_eq!(PayloadType::from_value(1).unwrap(), PayloadType::ProfileSpecific);
        assert_eq!(PayloadType::from_bit(false), PayloadType::Iana);
        assert_eq!(PayloadType::ProfileSpecific.value(), 1);
        assert!(PayloadType::from_value(2).is_err());
        assert_eq!(PayloadType::Iana.to_string(), "IANA type");
    }
}
