//! P25 ISSI error types.
//!
//! Errors are split by who is at fault. [`RangeError`] reports invalid API
//! usage: a setter was handed a value wider than the field it writes.
//! [`P25PayloadError`] reports malformed or inconsistent wire data and is the
//! expected outcome of decoding hostile input. [`RtpError`] covers the
//! transport. [`P25Error`] folds all three together for callers that do not
//! care about the distinction.

use std::fmt;

use thiserror::Error;

use crate::fields::PacketType;

/// Every bit-width constrained field of the P25 blocks and the RTP header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    // Control octet
    SignalBit,
    CompactBit,
    BlockHeaderCount,
    // Block header
    PayloadType,
    BlockType,
    TimestampOffset,
    BlockLength,
    // ISSI packet type
    MuteStatus,
    PacketType,
    ServiceOptions,
    TransmissionSequenceNumber,
    LosingAudio,
    Interval,
    PriorityLevel,
    // PTT control words
    WacnId,
    SystemId,
    UnitId,
    TransmitPriority,
    TransmitPriorityType,
    TransmitPriorityLevel,
    ConsoleId,
    TransmissionDescriptor,
    VoiceSourceId,
    ConsoleTransmissionPriority,
    // ISSI header word
    MessageIndicator,
    AlgorithmId,
    KeyId,
    ManufacturerId,
    GroupId,
    NetworkId,
    SuperFrameCounter,
    VoiceBlockCount,
    HeaderReserved,
    // IMBE voice block
    FrameType,
    MessageVector(u8),
    EncodedErrors,
    RawErrors,
    MuteFrame,
    LostFrame,
    E4,
    E1,
    VoiceSuperFrame,
    VoiceReserved,
    AdditionalFrameData,
    // Manufacturer specific
    ManufacturerDataLength,
    // RTP header
    RtpVersion,
    RtpPadding,
    RtpExtension,
    RtpCsrcCount,
    RtpMarker,
    RtpPayloadType,
    RtpSsrc,
    RtpPayload,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::SignalBit => "S",
            Field::CompactBit => "C",
            Field::BlockHeaderCount => "BHC",
            Field::PayloadType => "E",
            Field::BlockType => "BT",
            Field::TimestampOffset => "TSO",
            Field::BlockLength => "BL",
            Field::MuteStatus => "M",
            Field::PacketType => "PT",
            Field::ServiceOptions => "SO",
            Field::TransmissionSequenceNumber => "TSN",
            Field::LosingAudio => "L",
            Field::Interval => "Interval",
            Field::PriorityLevel => "PriorityLevel",
            Field::WacnId => "WACN",
            Field::SystemId => "SystemID",
            Field::UnitId => "UnitID",
            Field::TransmitPriority => "TP",
            Field::TransmitPriorityType => "TransmitPriorityType",
            Field::TransmitPriorityLevel => "TransmitPriorityLevel",
            Field::ConsoleId => "ConsoleID",
            Field::TransmissionDescriptor => "TD",
            Field::VoiceSourceId => "VoiceSourceID",
            Field::ConsoleTransmissionPriority => "CTXP",
            Field::MessageIndicator => "MI",
            Field::AlgorithmId => "AlgID",
            Field::KeyId => "KeyID",
            Field::ManufacturerId => "MFID",
            Field::GroupId => "GroupID",
            Field::NetworkId => "NID",
            Field::SuperFrameCounter => "SF",
            Field::VoiceBlockCount => "VBB",
            Field::HeaderReserved => "Reserved",
            Field::FrameType => "FT",
            Field::MessageVector(index) => return write!(f, "U{index}"),
            Field::EncodedErrors => "Et",
            Field::RawErrors => "Er",
            Field::MuteFrame => "M",
            Field::LostFrame => "L",
            Field::E4 => "E4",
            Field::E1 => "E1",
            Field::VoiceSuperFrame => "SF",
            Field::VoiceReserved => "Reserved",
            Field::AdditionalFrameData => "AdditionalFrameData",
            Field::ManufacturerDataLength => "Length",
            Field::RtpVersion => "V",
            Field::RtpPadding => "P",
            Field::RtpExtension => "X",
            Field::RtpCsrcCount => "CC",
            Field::RtpMarker => "M",
            Field::RtpPayloadType => "PT",
            Field::RtpSsrc => "SSRC",
            Field::RtpPayload => "Payload",
        };
        f.write_str(name)
    }
}

/// Structure being decoded when input ran short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseContext {
    ControlOctet,
    BlockHeader,
    IssiPacketType,
    PttControlWord,
    ConsolePttControlWord,
    IssiHeaderWord,
    ImbeVoiceBlock,
    ManufacturerSpecific,
    RtpHeader,
}

impl fmt::Display for ParseContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParseContext::ControlOctet => "control octet",
            ParseContext::BlockHeader => "block header",
            ParseContext::IssiPacketType => "ISSI packet type",
            ParseContext::PttControlWord => "PTT control word",
            ParseContext::ConsolePttControlWord => "console PTT control word",
            ParseContext::IssiHeaderWord => "ISSI header word",
            ParseContext::ImbeVoiceBlock => "IMBE voice block",
            ParseContext::ManufacturerSpecific => "manufacturer specific block",
            ParseContext::RtpHeader => "RTP header",
        };
        f.write_str(name)
    }
}

/// A value did not fit the bit width of the field it was written to.
///
/// Returned by every block setter and constructor before any state changes.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Value out of range for field '{field}': {value} exceeds maximum {max}")]
pub struct RangeError {
    pub field: Field,
    pub value: u64,
    pub max: u64,
}

/// Structural errors raised while decoding or encoding a P25 payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum P25PayloadError {
    /// Input ended before a complete structure could be read.
    #[error("Incomplete payload data: needed {needed} bytes, got {got} for {context}")]
    NotEnoughData {
        needed: usize,
        got: usize,
        context: ParseContext,
    },

    /// Block header names a block type this codec does not handle.
    #[error("Unsupported block type: {0}")]
    UnsupportedBlockType(u8),

    /// BHC disagrees with the number of block headers present.
    #[error("Inconsistent block count: control octet declares {declared}, found {actual}")]
    BlockCountMismatch { declared: usize, actual: usize },

    /// A payload must carry at least one block header.
    #[error("Payload carries no block headers")]
    NoBlockHeaders,

    /// Every payload must carry an ISSI packet type block.
    #[error("Missing mandatory ISSI packet type block")]
    MissingPacketType,

    /// PTT Request, Start and Progress carry a PTT control word.
    #[error("Packet type '{0}' requires a PTT control word")]
    MissingPttControlWord(PacketType),

    /// ISSI header words and voice blocks only ride in PTT Request and Progress.
    #[error("{block} block is not allowed in packet type {packet_type}")]
    BlockNotAllowed { block: &'static str, packet_type: u8 },

    /// More voice blocks than one payload may carry.
    #[error("Too many IMBE voice blocks: {0} (at most 3)")]
    TooManyVoiceBlocks(usize),

    /// Manufacturer specific blocks are recognized but not decoded.
    #[error("Manufacturer specific blocks are not supported")]
    ManufacturerSpecificUnsupported,

    /// Declared IMBE block length contradicts the frame type's trailer size.
    #[error(
        "Invalid IMBE voice block length for frame type 0x{frame_type:02X}: expected {expected}, got {got}"
    )]
    InvalidVoiceBlockLength {
        frame_type: u8,
        expected: usize,
        got: usize,
    },

    /// A block that may appear once was found twice.
    #[error("Duplicate {0} block in payload")]
    DuplicateBlock(&'static str),

    /// Block headers and the blocks they announce disagree.
    #[error("Block headers and bodies disagree on {0} block")]
    HeaderBodyMismatch(&'static str),

    /// Bytes were left over after the last announced block.
    #[error("{extra} unexpected bytes after the last block")]
    TrailingBytes { extra: usize },

    /// Packet type value with no defined meaning.
    #[error("Unknown packet type: {0}")]
    UnknownPacketType(u8),

    /// Block type index absent from the registry.
    #[error("Unknown block type index: {0}")]
    UnknownBlockTypeIndex(u8),

    /// Name lookup found nothing.
    #[error("No entry matches description '{0}'")]
    UnknownDescription(String),

    /// Hex dump or voice frame text could not be parsed.
    #[error("Malformed hex text: '{0}'")]
    MalformedHex(String),

    /// A decoded value could not be stored.
    #[error("Range error: {0}")]
    Range(#[from] RangeError),
}

/// Errors raised by the RTP transport.
#[derive(Error, Debug)]
pub enum RtpError {
    /// Socket level failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Datagram shorter than the fixed RTP header.
    #[error("Incomplete RTP packet: needed {needed} bytes, got {got}")]
    NotEnoughData { needed: usize, got: usize },

    /// Payload exceeds the receive buffer.
    #[error("RTP payload too large: {size} bytes exceeds maximum {max}")]
    PayloadTooLarge { size: usize, max: usize },

    /// Send attempted before the remote address was configured.
    #[error("Failed sending RTP packet. Remote IP address is undefined.")]
    RemoteAddressUndefined,

    /// Send attempted before the remote port was configured.
    #[error("Failed sending RTP packet. Remote RTP receive port is undefined.")]
    RemotePortUndefined,

    /// Session has no receive socket (send-only or shut down).
    #[error("No socket -- cannot receive packets")]
    NoReceiveSocket,

    /// Session sockets were already released.
    #[error("Socket is closed")]
    SocketClosed,

    /// RTP receive ports must be even.
    #[error("RTP receive port must be even and non-zero: {0}")]
    OddPort(u16),

    /// Header field out of range.
    #[error("Range error: {0}")]
    Range(#[from] RangeError),
}

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum P25Error {
    #[error("Range error: {0}")]
    Range(#[from] RangeError),

    #[error("Payload error: {0}")]
    Payload(#[from] P25PayloadError),

    #[error("RTP error: {0}")]
    Rtp(#[from] RtpError),

    /// Reading a voice frame source failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
