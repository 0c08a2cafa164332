//! Events a session's receiver hands to its listeners.

use std::fmt;

use crate::rtp::RtpPacket;

/// Non-terminal receiver state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RtpStatus {
    /// The receive loop is running and accepting datagrams.
    ReceiverStarted,
}

impl fmt::Display for RtpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RtpStatus::ReceiverStarted => f.write_str("RTP packet receiver started"),
        }
    }
}

/// Something observed by an [`RtpPacketReceiver`](crate::rtp::RtpPacketReceiver).
///
/// `Timeout` and `Error` are terminal: the loop has exited and its socket
/// has been released by the time listeners see them.
#[derive(Debug, Clone)]
pub enum RtpEvent {
    /// A packet passed the sequence number filter.
    Packet {
        packet: RtpPacket,
        description: String,
    },
    Status {
        status: RtpStatus,
        description: String,
    },
    /// The socket was closed or the receiver was cancelled.
    Timeout { description: String },
    /// The socket failed.
    Error { description: String },
}

impl RtpEvent {
    pub fn description(&self) -> &str {
        match self {
            RtpEvent::Packet { description, .. }
            | RtpEvent::Status { description, .. }
            | RtpEvent::Timeout { description }
            | RtpEvent::Error { description } => description,
        }
    }

    /// True for events after which the receiver is gone.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RtpEvent::Timeout { .. } | RtpEvent::Error { .. })
    }

    /// Routes the event to the matching listener callback.
    pub fn dispatch(&self, listener: &dyn RtpListener) {
        match self {
            RtpEvent::Packet { packet, description } => {
                listener.handle_rtp_packet_event(packet, description)
            }
            RtpEvent::Status {
                status,
                description,
            } => listener.handle_rtp_status_event(*status, description),
            RtpEvent::Timeout { description } => listener.handle_rtp_timeout_event(description),
            RtpEvent::Error { description } => listener.handle_rtp_error_event(description),
        }
    }
}

/// Receiver callbacks. They run on the session's receive thread, so a slow
/// listener stalls packet intake for that session.
pub trait RtpListener: Send + Sync {
    fn handle_rtp_packet_event(&self, packet: &RtpPacket, description: &str);

    fn handle_rtp_status_event(&self, _status: RtpStatus, _description: &str) {}

    fn handle_rtp_timeout_event(&self, _description: &str) {}

    fn handle_rtp_error_event(&self, _description: &str) {}
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<String>>,
    }

    impl RtpListener for Recorder {
        fn handle_rtp_packet_event(&self, packet: &RtpPacket, description: &str) {
            self.seen
                .lock()
                .unwrap()
                .push(format!("packet {} {description}", packet.sequence_number()));
        }

        fn handle_rtp_timeout_event(&self, description: &str) {
            self.seen.lock().unwrap().push(format!("timeout {description}"));
        }
    }

    #[test]
    fn dispatch_routes_by_variant() {
        let recorder = Recorder::default();
        let events = [
            RtpEvent::Packet {
                packet: RtpPacket::new(),
                description: "Received RTP packet".into(),
            },
            RtpEvent::Status {
                status: RtpStatus::ReceiverStarted,
                description: RtpStatus::ReceiverStarted.to_string(),
            },
            RtpEvent::Timeout {
                description: "closed".into(),
            },
            RtpEvent::Error {
                description: "ignored by default".into(),
            },
        ];
        for event in &events {
            event.dispatch(&recorder);
        }
        assert_eq!(
            *recorder.seen.lock().unwrap(),
            vec!["packet SN0 Received RTP packet", "timeout closed"]
        );
    }

    #[test]
    fn terminal_events() {
        assert!(RtpEvent::Timeout { description: String::new() }.is_terminal());
        assert!(RtpEvent::Error { description: String::new() }.is_terminal());
        let status = RtpEvent::Status {
            status: RtpStatus::ReceiverStarted,
            description: "started".into(),
        };
        assert!(!status.is_terminal());
        assert_eq!(status.description(), "started");
    }
}
