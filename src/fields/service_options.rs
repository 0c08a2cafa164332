//! The SO byte of the ISSI packet type block.
//!
//! ```text
//!   7   6   5   4   3   2   1   0
//! +---+---+---+---+---+-----------+
//! | E | P | D | M | R |  priority |
//! +---+---+---+---+---+-----------+
//! ```

use serde::{Deserialize, Serialize};

use crate::bits::check_range;
use crate::error::{Field, RangeError};

const EMERGENCY_BIT: u8 = 1 << 7;
const PROTECTED_BIT: u8 = 1 << 6;
const DUPLEX_BIT: u8 = 1 << 5;
const MODE_BIT: u8 = 1 << 4;
const RESERVED_BIT: u8 = 1 << 3;
const PRIORITY_MASK: u8 = 0x07;

/// Decoded service options.
///
/// The reserved bit is kept so that any received byte re-encodes unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceOptions {
    emergency: bool,
    protected: bool,
    duplex: bool,
    packet_mode: bool,
    reserved: bool,
    priority_level: u8,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            emergency: false,
            protected: false,
            duplex: false,
            packet_mode: false,
            reserved: false,
            priority_level: 4,
        }
    }
}

impl ServiceOptions {
    /// Decodes an SO byte. Every byte is accepted.
    pub const fn from_byte(byte: u8) -> Self {
        Self {
            emergency: byte & EMERGENCY_BIT != 0,
            protected: byte & PROTECTED_BIT != 0,
            duplex: byte & DUPLEX_BIT != 0,
            packet_mode: byte & MODE_BIT != 0,
            reserved: byte & RESERVED_BIT != 0,
            priority_level: byte & PRIORITY_MASK,
        }
    }

    /// Encodes back to the SO byte.
    pub const fn to_byte(self) -> u8 {
        let mut byte = self.priority_level & PRIORITY_MASK;
        if self.emergency {
            byte |= EMERGENCY_BIT;
        }
        if self.protected {
            byte |= PROTECTED_BIT;
        }
        if self.duplex {
            byte |= DUPLEX_BIT;
        }
        if self.packet_mode {
            byte |= MODE_BIT;
        }
        if self.reserved {
            byte |= RESERVED_BIT;
        }
        byte
    }

    pub fn is_emergency(&self) -> bool {
        self.emergency
    }

    pub fn set_emergency(&mut self, emergency: bool) {
        self.emergency = emergency;
    }

    pub fn is_protected(&self) -> bool {
        self.protected
    }

    pub fn set_protected(&mut self, protected: bool) {
        self.protected = protected;
    }

    pub fn is_duplex(&self) -> bool {
        self.duplex
    }

    pub fn set_duplex(&mut self, duplex: bool) {
        self.duplex = duplex;
    }

    /// True for packet mode, false for circuit mode.
    pub fn is_packet_mode(&self) -> bool {
        self.packet_mode
    }

    pub fn set_packet_mode(&mut self, packet_mode: bool) {
        self.packet_mode = packet_mode;
    }

    /// The reserved bit as received. Conformant senders leave it clear.
    pub fn is_reserved_set(&self) -> bool {
        self.reserved
    }

    pub fn priority_level(&self) -> u8 {
        self.priority_level
    }

    /// Sets the 3-bit priority level.
    ///
    /// # Errors
    /// - [`RangeError`] - `level` exceeds 7
    pub fn set_priority_level(&mut self, level: u8) -> Result<(), RangeError> {
        check_range(Field::PriorityLevel, level as u64, 3)?;
        self.priority_level = level;
        Ok(())
    }
}

impl From<u8> for ServiceOptions {
    fn from(byte: u8) -> Self {
        Self::from_byte(byte)
    }
}

impl From<ServiceOptions> for u8 {
    fn from(options: ServiceOptions) -> Self {
        options.to_byte()
    }
}
