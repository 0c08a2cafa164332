//! RTP transport for P25 payloads: packets, sessions and their receive loops.

pub mod events;
pub mod manager;
pub mod packet;
pub mod receiver;
pub mod session;

pub use events::{RtpEvent, RtpListener, RtpStatus};
pub use manager::RtpManager;
pub use packet::RtpPacket;
pub use receiver::RtpPacketReceiver;
pub use session::RtpSession;
