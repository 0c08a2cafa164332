//! `p25issi`: P25 ISSI payload codec, RTP transport and conformance matcher.
//!
//! ISSI (the P25 Inter-RF-Subsystem Interface) carries push-to-talk
//! signalling and IMBE voice between RF subsystems as bit-packed P25
//! payloads riding in RTP. This crate builds and parses those payloads,
//! sends and receives them over UDP, and compares captured traffic against
//! expected traffic the way the conformance tests do.
//!
//! ## Core Concepts
//!
//! - **[`P25Payload`]**: A control octet, block headers and the blocks they announce.
//!   Assemble one with [`P25Payload::builder`], parse one with [`P25Payload::from_bytes`].
//! - **Blocks**: One type per block kind, all implementing [`P25Block`]. See [`blocks`].
//! - **[`RtpSession`]**: A UDP endpoint with a background receive loop that hands
//!   in-order packets to [`RtpListener`]s. Sessions come from an [`RtpManager`].
//! - **[`matcher`]**: Field-by-field comparison limited to the fields conformance
//!   testing treats as mandatory.
//! - **[`ImbeVoiceGenerator`]**: Turns a text file of IMBE frames into voice blocks.
//!
//! ## Quick Start
//!
//! ```rust
//! use p25issi::blocks::{ImbeVoiceBlock, IssiPacketType, PttControlWord};
//! use p25issi::fields::PacketType;
//! use p25issi::{P25Payload, matcher};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // PTT Transmit Progress carrying one voice frame
//!     let payload = P25Payload::builder(IssiPacketType::new(PacketType::PttTransmitProgress))
//!         .ptt_control_word(PttControlWord::new(0xBEE00, 0x2A1, 0x1234, 0)?)
//!         .voice_block(ImbeVoiceBlock::at_position(1))
//!         .build()?;
//!
//!     let bytes = payload.to_bytes()?;
//!     let decoded = P25Payload::from_bytes(&bytes)?;
//!     assert_eq!(decoded, payload);
//!     assert!(matcher::match_payloads(&payload, &decoded).is_match());
//!     Ok(())
//! }
//! ```

pub mod bits;
pub mod blocks;
pub mod config;
pub mod constants;
pub mod error;
pub mod fields;
pub mod matcher;
pub mod payload;
pub mod render;
pub mod rtp;
pub mod traits;
pub mod types;
pub mod voice;

#[cfg(test)]
mod tidy;

pub use config::SessionConfig;
pub use error::{Field, P25Error, P25PayloadError, ParseContext, RangeError, RtpError};
pub use matcher::{MatchResult, Mismatch};
pub use payload::{P25Payload, P25PayloadBuilder};
pub use rtp::{RtpEvent, RtpListener, RtpManager, RtpPacket, RtpSession, RtpStatus};
pub use traits::P25Block;
pub use types::{SequenceNumber, Ssrc, Timestamp};
pub use voice::ImbeVoiceGenerator;
