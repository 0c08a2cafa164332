//! Wire sizes and protocol constants shared across the P25 payload codec and
//! the RTP transport.

// --- P25 payload framing ---

/// Size of the control octet that opens every P25 payload.
pub const CONTROL_OCTET_LENGTH: usize = 1;
/// Size of one block header.
pub const BLOCK_HEADER_LENGTH: usize = 4;
/// Maximum number of block headers addressable by the 6-bit BHC field.
pub const MAX_BLOCK_HEADER_COUNT: usize = 0x3F;

// --- Block body sizes ---

/// ISSI packet type block body size.
pub const ISSI_PACKET_TYPE_LENGTH: usize = 4;
/// PTT control word block body size.
pub const PTT_CONTROL_WORD_LENGTH: usize = 8;
/// Console PTT control word block body size.
pub const CONSOLE_PTT_CONTROL_WORD_LENGTH: usize = 24;
/// ISSI header word block body size.
pub const ISSI_HEADER_WORD_LENGTH: usize = 18;
/// Fixed portion of an IMBE voice block, without trailer.
pub const IMBE_VOICE_BLOCK_FIXED_LENGTH: usize = 14;
/// Message indicator width inside the ISSI header word.
pub const MESSAGE_INDICATOR_LENGTH: usize = 9;
/// Fixed prefix of a manufacturer specific block (MFID + length).
pub const MANUFACTURER_SPECIFIC_PREFIX_LENGTH: usize = 2;

// --- IMBE voice ---

/// Number of frames in one IMBE voice superframe cycle.
pub const IMBE_FRAMES_PER_CYCLE: usize = 18;
/// Duration of one IMBE voice frame in 8 kHz timestamp units (20 ms).
pub const IMBE_TIME_OFFSET: u16 = 160;
/// Maximum number of IMBE voice blocks carried in one payload.
pub const MAX_IMBE_VOICE_BLOCKS: usize = 3;
/// Trailer length for frames carrying low speed data.
pub const LOW_SPEED_DATA_LENGTH: usize = 3;
/// Trailer length for frames carrying encryption sync.
pub const ENCRYPTION_SYNC_LENGTH: usize = 4;

// --- Block type indices ---

/// Block type index of an IMBE voice block.
pub const BT_IMBE_VOICE: u8 = 0;
/// Block type index of an ISSI packet type block.
pub const BT_PACKET_TYPE: u8 = 1;
/// Block type index of an ISSI header word block.
pub const BT_ISSI_HEADER_INFO: u8 = 5;
/// Block type index of a PTT control word block.
pub const BT_PTT_CONTROL_WORD: u8 = 11;
/// Block type index of a console PTT control word block.
pub const BT_CONSOLE_PTT_CONTROL_WORD: u8 = 15;
/// First block type index of the manufacturer specific range.
pub const BT_MANUFACTURER_SPECIFIC_FIRST: u8 = 63;
/// Last valid block type index.
pub const BT_MAX: u8 = 127;

// --- RTP ---

/// RTP protocol version carried by every packet.
pub const RTP_VERSION: u8 = 2;
/// Length of the fixed RTP header (no CSRC list, no extension).
pub const RTP_FIXED_HEADER_LENGTH: usize = 12;
/// Largest payload an `RtpPacket` will carry.
pub const RTP_MAX_PAYLOAD_LENGTH: usize = 512;
/// Receive buffer size used by the packet receiver.
pub const RTP_RECEIVE_BUFFER_LENGTH: usize = RTP_FIXED_HEADER_LENGTH + RTP_MAX_PAYLOAD_LENGTH;
/// First sequence number a session assigns on send.
pub const RTP_INITIAL_SEQUENCE_NUMBER: u16 = 1;

// --- Session defaults ---

/// Default poll interval of the receive loop, in milliseconds.
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 200;
/// Shortest poll interval, in milliseconds. Sockets refuse a zero read timeout.
pub const MIN_READ_TIMEOUT_MS: u64 = 1;
/// Default directory for raw packet trace dumps.
pub const DEFAULT_TRACE_DIRECTORY: &str = "nistrtp_logs";
/// Timestamp format used in trace dump file names.
pub const TRACE_FILE_DATE_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";
