//! Background receive loop of one RTP session.
//!
//! The loop owns its own handle to the session's receive socket and polls it
//! with a read timeout so that a stop request is noticed within one poll
//! interval. Packets whose sequence number is not strictly greater than the
//! last accepted one are dropped. However the loop ends, every handle on the
//! receive socket is released before the terminal event reaches listeners,
//! so the port is free by the time a listener hears about it.

use std::io::ErrorKind;
use std::net::UdpSocket;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::bits::write_bytes;
use crate::constants::RTP_RECEIVE_BUFFER_LENGTH;
use crate::error::RtpError;
use crate::rtp::session::{SharedSockets, lock_sockets};
use crate::rtp::{RtpEvent, RtpListener, RtpPacket, RtpStatus};
use crate::types::SequenceNumber;

pub(crate) type ListenerList = Arc<Mutex<Vec<Arc<dyn RtpListener>>>>;
pub(crate) type PacketLog = Arc<Mutex<Vec<Vec<u8>>>>;

/// State the loop shares with its session.
pub(crate) struct ReceiverContext {
    pub listeners: ListenerList,
    pub packet_log: PacketLog,
    pub sockets: SharedSockets,
    /// Socket generation the loop was started on.
    pub generation: u64,
    pub trace_packets: bool,
    pub read_timeout: Duration,
}

/// Handle to a running receive loop.
#[derive(Debug)]
pub struct RtpPacketReceiver {
    cancel: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl RtpPacketReceiver {
    /// Starts the loop on a dedicated thread.
    pub(crate) fn spawn(socket: UdpSocket, context: ReceiverContext) -> Result<Self, RtpError> {
        socket.set_read_timeout(Some(context.read_timeout))?;
        let cancel = Arc::new(AtomicBool::new(false));
        let port = socket.local_addr().map(|addr| addr.port()).unwrap_or_default();
        let loop_cancel = Arc::clone(&cancel);
        let handle = thread::Builder::new()
            .name(format!("rtp-recv-{port}"))
            .spawn(move || run(socket, &context, &loop_cancel))?;
        Ok(Self {
            cancel,
            handle: Some(handle),
        })
    }

    /// True once the loop has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Asks the loop to exit and waits for it.
    ///
    /// Called from a listener callback it only signals, since the loop
    /// cannot wait for itself.
    pub fn stop(&mut self) {
        self.cancel.store(true, Ordering::Release);
        let Some(handle) = self.handle.take() else {
            return;
        };
        if handle.thread().id() == thread::current().id() {
            return;
        }
        if handle.join().is_err() {
            tracing::warn!("RTP packet receiver panicked");
        }
    }
}

impl Drop for RtpPacketReceiver {
    fn drop(&mut self) {
        self.stop();
    }
}

fn dispatch(listeners: &ListenerList, event: &RtpEvent) {
    let snapshot = listeners
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    for listener in snapshot {
        event.dispatch(listener.as_ref());
    }
}

fn run(socket: UdpSocket, context: &ReceiverContext, cancel: &AtomicBool) {
    dispatch(
        &context.listeners,
        &RtpEvent::Status {
            status: RtpStatus::ReceiverStarted,
            description: RtpStatus::ReceiverStarted.to_string(),
        },
    );

    let mut buffer = [0u8; RTP_RECEIVE_BUFFER_LENGTH];
    let mut last_accepted = SequenceNumber::UNSEEN;

    let terminal = loop {
        if cancel.load(Ordering::Acquire) {
            break RtpEvent::Timeout {
                description: "RTP packet receiver stopped".to_string(),
            };
        }
        let len = match socket.recv(&mut buffer) {
            Ok(len) => len,
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => continue,
            Err(e) => {
                break RtpEvent::Error {
                    description: e.to_string(),
                };
            }
        };
        let datagram = &buffer[..len];

        if context.trace_packets {
            tracing::trace!(bytes = %write_bytes(datagram), "Received datagram");
            context
                .packet_log
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(datagram.to_vec());
        }

        let packet = match RtpPacket::from_bytes(datagram) {
            Ok(packet) => packet,
            Err(e) => {
                tracing::debug!(error = %e, "Discarding malformed RTP datagram");
                continue;
            }
        };

        let sequence_number = packet.sequence_number();
        if sequence_number <= last_accepted {
            tracing::trace!(
                sn = sequence_number.value(),
                last = last_accepted.value(),
                "Dropping out of order RTP packet"
            );
            continue;
        }
        last_accepted = sequence_number;
        dispatch(
            &context.listeners,
            &RtpEvent::Packet {
                packet,
                description: "Received RTP packet".to_string(),
            },
        );
    };

    drop(socket);
    release_session_socket(context);
    match &terminal {
        RtpEvent::Error { description } => {
            tracing::warn!(error = %description, "RTP packet receiver failed")
        }
        _ => tracing::debug!("RtpPacketReceiver shutting down"),
    }
    dispatch(&context.listeners, &terminal);
}

/// Releases the session's receive socket unless it was replaced while the
/// loop ran.
fn release_session_socket(context: &ReceiverContext) {
    let mut sockets = lock_sockets(&context.sockets);
    if sockets.generation() != context.generation {
        return;
    }
    if let Err(e) = sockets.release_receive_socket() {
        tracing::warn!(error = %e, "Could not replace shared send socket");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;
    use crate::rtp::session::SocketState;

    struct Forward(Mutex<mpsc::Sender<String>>);

    impl RtpListener for Forward {
        fn handle_rtp_packet_event(&self, packet: &RtpPacket, _description: &str) {
            let _ = self
                .0
                .lock()
                .unwrap()
                .send(format!("packet {}", packet.sequence_number().value()));
        }

        fn handle_rtp_status_event(&self, _status: RtpStatus, _description: &str) {
            let _ = self.0.lock().unwrap().send("started".to_string());
        }

        fn handle_rtp_timeout_event(&self, _description: &str) {
            let _ = self.0.lock().unwrap().send("timeout".to_string());
        }
    }

    fn datagram(sn: u16) -> Vec<u8> {
        let mut packet = RtpPacket::new();
        packet.set_sequence_number(SequenceNumber::new(sn));
        packet.to_bytes()
    }

    #[test]
    fn filters_sequence_numbers_and_stops() {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        let target = socket.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();
        let listeners: ListenerList = Arc::new(Mutex::new(vec![
            Arc::new(Forward(Mutex::new(tx))) as Arc<dyn RtpListener>
        ]));
        let packet_log: PacketLog = Arc::default();
        let mut receiver = RtpPacketReceiver::spawn(
            socket,
            ReceiverContext {
                listeners,
                packet_log: Arc::clone(&packet_log),
                sockets: Arc::new(Mutex::new(SocketState::new(target.ip()))),
                generation: 0,
                trace_packets: true,
                read_timeout: Duration::from_millis(20),
            },
        )
        .unwrap();
        let wait = Duration::from_secs(2);
        assert_eq!(rx.recv_timeout(wait).unwrap(), "started");

        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
        for sn in [0, 5, 5, 3, 6] {
            sender.send_to(&datagram(sn), target).unwrap();
        }
        assert_eq!(rx.recv_timeout(wait).unwrap(), "packet 5");
        assert_eq!(rx.recv_timeout(wait).unwrap(), "packet 6");

        receiver.stop();
        assert!(receiver.is_finished());
        assert_eq!(rx.recv_timeout(wait).unwrap(), "timeout");
        assert_eq!(packet_log.lock().unwrap().len(), 5);
    }
}
