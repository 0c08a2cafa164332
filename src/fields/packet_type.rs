//! ISSI packet types (the PT field of the packet type block).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::P25PayloadError;

/// Packet types carried in the 7-bit PT field.
///
/// The last three heartbeat variants are local indications only and never
/// cross the wire in a conformant exchange, but they decode like the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum PacketType {
    PttTransmitRequest = 0,
    PttTransmitGrant = 1,
    PttTransmitProgress = 2,
    PttTransmitEnd = 3,
    PttTransmitStart = 4,
    PttTransmitMute = 5,
    PttTransmitUnmute = 6,
    PttTransmitWait = 7,
    PttTransmitDeny = 8,
    Heartbeat = 9,
    HeartbeatQuery = 10,
    HeartbeatConnection = 11,
    HeartbeatMuteTransmission = 12,
    HeartbeatUnmuteTransmission = 13,
}

impl PacketType {
    /// Every packet type, indexed by wire value.
    pub const ALL: [PacketType; 14] = [
        PacketType::PttTransmitRequest,
        PacketType::PttTransmitGrant,
        PacketType::PttTransmitProgress,
        PacketType::PttTransmitEnd,
        PacketType::PttTransmitStart,
        PacketType::PttTransmitMute,
        PacketType::PttTransmitUnmute,
        PacketType::PttTransmitWait,
        PacketType::PttTransmitDeny,
        PacketType::Heartbeat,
        PacketType::HeartbeatQuery,
        PacketType::HeartbeatConnection,
        PacketType::HeartbeatMuteTransmission,
        PacketType::HeartbeatUnmuteTransmission,
    ];

    /// Maps a wire value.
    ///
    /// # Errors
    /// - [`P25PayloadError::UnknownPacketType`] - No packet type has this value
    pub fn from_value(value: u8) -> Result<Self, P25PayloadError> {
        Self::ALL
            .get(value as usize)
            .copied()
            .ok_or(P25PayloadError::UnknownPacketType(value))
    }

    /// Finds the packet type whose name matches exactly.
    ///
    /// # Errors
    /// - [`P25PayloadError::UnknownDescription`] - No packet type has this name
    pub fn from_name(name: &str) -> Result<Self, P25PayloadError> {
        Self::ALL
            .iter()
            .copied()
            .find(|pt| pt.name() == name)
            .ok_or_else(|| P25PayloadError::UnknownDescription(name.to_string()))
    }

    /// Wire value.
    #[inline]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Display name.
    pub const fn name(self) -> &'static str {
        match self {
            PacketType::PttTransmitRequest => "PTT Transmit Request",
            PacketType::PttTransmitGrant => "PTT Transmit Grant",
            PacketType::PttTransmitProgress => "PTT Transmit Progress",
            PacketType::PttTransmitEnd => "PTT Transmit End",
            PacketType::PttTransmitStart => "PTT Transmit Start",
            PacketType::PttTransmitMute => "PTT Transmit Mute",
            PacketType::PttTransmitUnmute => "PTT Transmit Unmute",
            PacketType::PttTransmitWait => "PTT Transmit Wait",
            PacketType::PttTransmitDeny => "PTT Transmit Deny",
            PacketType::Heartbeat => "Heartbeat",
            PacketType::HeartbeatQuery => "Heartbeat Query",
            PacketType::HeartbeatConnection => "Heartbeat Connection",
            PacketType::HeartbeatMuteTransmission => "Heartbeat Mute Transmission",
            PacketType::HeartbeatUnmuteTransmission => "Heartbeat Unmute Transmission",
        }
    }

    /// Packet types that must carry a PTT control word.
    pub const fn requires_ptt_control_word(self) -> bool {
        matches!(
            self,
            PacketType::PttTransmitRequest
                | PacketType::PttTransmitStart
                | PacketType::PttTransmitProgress
        )
    }

    /// Packet types allowed to carry an ISSI header word and voice.
    pub const fn carries_voice(self) -> bool {
        matches!(
            self,
            PacketType::PttTransmitRequest | PacketType::PttTransmitProgress
        )
    }

    /// Packet types sent with the control octet's signal bit set.
    pub const fn is_signalling(self) -> bool {
        matches!(
            self,
            PacketType::PttTransmitStart
                | PacketType::PttTransmitProgress
                | PacketType::PttTransmitGrant
                | PacketType::PttTransmitMute
                | PacketType::PttTransmitUnmute
        )
    }
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
