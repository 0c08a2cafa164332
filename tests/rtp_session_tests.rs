//! RTP sessions exchanging P25 payloads over loopback.

mod common;

use std::net::UdpSocket;
use std::sync::Arc;

use common::*;
use p25issi::{
    P25Payload, RtpError, RtpListener, RtpPacket, RtpSession, SequenceNumber, SessionConfig,
};

fn listening_session(port: u16) -> (RtpSession, std::sync::mpsc::Receiver<Seen>) {
    let mut session = loopback_manager()
        .create_session_with_config(&fast_config(port))
        .unwrap();
    let (listener, rx) = ChannelListener::new();
    session.add_listener(Arc::new(listener));
    session.receive_rtp_packets().unwrap();
    assert_eq!(rx.recv_timeout(EVENT_WAIT).unwrap(), Seen::Started);
    (session, rx)
}

fn raw_datagram(sequence_number: u16) -> Vec<u8> {
    let mut packet = rtp_packet(&heartbeat_payload());
    packet.set_sequence_number(SequenceNumber::new(sequence_number));
    packet.to_bytes()
}

#[test]
fn payloads_cross_between_sessions() {
    init_tracing();
    let receive_port = free_even_port();
    let (_receiver, rx) = listening_session(receive_port);

    let sender = loopback_manager()
        .create_rtp_session(0, LOOPBACK, receive_port)
        .unwrap();
    let payload = full_request_payload();
    let mut packet = rtp_packet(&payload);
    sender.send_rtp_packet(&mut packet).unwrap();

    let received = next_packet(&rx);
    assert_eq!(received.sequence_number(), 1);
    assert_eq!(received.payload_type(), 100);
    assert_eq!(P25Payload::from_bytes(received.payload()).unwrap(), payload);
    assert_eq!(sender.next_sequence_number(), 2);
}

#[test]
fn listening_session_sends_from_its_receive_port() {
    let port_a = free_even_port();
    let (_a_session, a_rx) = listening_session(port_a);
    let port_b = free_even_port();
    let (mut b_session, _b_rx) = listening_session(port_b);

    b_session.set_remote_address(LOOPBACK);
    b_session.set_remote_rtp_recv_port(port_a).unwrap();
    let mut packet = rtp_packet(&heartbeat_payload());
    b_session.send_rtp_packet(&mut packet).unwrap();

    next_packet(&a_rx);
    assert_eq!(b_session.local_addr().unwrap().port(), port_b);
}

#[test]
fn stale_and_duplicate_sequence_numbers_are_dropped() {
    let port = free_even_port();
    let (_session, rx) = listening_session(port);
    let raw = UdpSocket::bind((LOOPBACK, 0)).unwrap();

    for sequence_number in [4u16, 4, 2, 7, 5, 8] {
        raw.send_to(&raw_datagram(sequence_number), (LOOPBACK, port))
            .unwrap();
    }

    let delivered: Vec<u16> = (0..3)
        .map(|_| next_packet(&rx).sequence_number().value())
        .collect();
    assert_eq!(delivered, vec![4, 7, 8]);
}

#[test]
fn malformed_datagrams_do_not_stop_the_receiver() {
    let port = free_even_port();
    let (_session, rx) = listening_session(port);
    let raw = UdpSocket::bind((LOOPBACK, 0)).unwrap();

    raw.send_to(&[0x80, 0x64, 0x00], (LOOPBACK, port)).unwrap();
    raw.send_to(&raw_datagram(3), (LOOPBACK, port)).unwrap();

    assert_eq!(next_packet(&rx).sequence_number(), 3);
}

#[test]
fn removed_listeners_hear_nothing() {
    let port = free_even_port();
    let mut session = loopback_manager()
        .create_session_with_config(&fast_config(port))
        .unwrap();
    let (kept, kept_rx) = ChannelListener::new();
    let (removed, removed_rx) = ChannelListener::new();
    let removed: Arc<dyn RtpListener> = Arc::new(removed);
    session.add_listener(Arc::new(kept));
    session.add_listener(Arc::clone(&removed));
    assert!(session.remove_listener(&removed));
    assert!(!session.remove_listener(&removed));

    session.receive_rtp_packets().unwrap();
    let raw = UdpSocket::bind((LOOPBACK, 0)).unwrap();
    raw.send_to(&raw_datagram(1), (LOOPBACK, port)).unwrap();

    next_packet(&kept_rx);
    assert!(removed_rx.try_recv().is_err());
}

#[test]
fn stopping_the_receiver_reports_a_timeout_and_frees_the_port() {
    let port = free_even_port();
    let (mut session, rx) = listening_session(port);

    session.stop_rtp_packet_receiver().unwrap();
    assert_eq!(rx.recv_timeout(EVENT_WAIT).unwrap(), Seen::Timeout);
    assert_eq!(session.my_rtp_recv_port(), 0);
    assert!(matches!(
        session.receive_rtp_packets(),
        Err(RtpError::NoReceiveSocket)
    ));

    UdpSocket::bind((LOOPBACK, port)).unwrap();
}

#[test]
fn stopped_session_keeps_sending_when_the_peer_is_known() {
    let peer = UdpSocket::bind((LOOPBACK, 0)).unwrap();
    let peer_port = peer.local_addr().unwrap().port();
    let mut config = fast_config(free_even_port());
    config.remote_address = Some(LOOPBACK);
    config.remote_port = Some(peer_port);
    let mut session = RtpSession::new(&config).unwrap();

    session.stop_rtp_packet_receiver().unwrap();
    let mut packet = rtp_packet(&heartbeat_payload());
    session.send_rtp_packet(&mut packet).unwrap();

    let mut buffer = [0u8; 128];
    let len = peer.recv(&mut buffer).unwrap();
    assert_eq!(RtpPacket::from_bytes(&buffer[..len]).unwrap(), packet);
}

#[test]
fn shut_down_session_refuses_to_send() {
    let mut session = RtpSession::new(&SessionConfig {
        remote_address: Some(LOOPBACK),
        remote_port: Some(free_even_port()),
        ..fast_config(0)
    })
    .unwrap();
    session.shut_down();
    let mut packet = RtpPacket::new();
    assert!(matches!(
        session.send_rtp_packet(&mut packet),
        Err(RtpError::SocketClosed)
    ));
}

#[test]
fn receive_port_can_move() {
    let first = free_even_port();
    let (mut session, rx) = listening_session(first);
    let second = free_even_port();

    assert!(matches!(
        session.reset_my_rtp_recv_port(second + 1),
        Err(RtpError::OddPort(_))
    ));
    session.reset_my_rtp_recv_port(second).unwrap();
    assert_eq!(rx.recv_timeout(EVENT_WAIT).unwrap(), Seen::Timeout);
    assert_eq!(session.my_rtp_recv_port(), second);

    session.receive_rtp_packets().unwrap();
    assert_eq!(rx.recv_timeout(EVENT_WAIT).unwrap(), Seen::Started);
    let raw = UdpSocket::bind((LOOPBACK, 0)).unwrap();
    raw.send_to(&raw_datagram(1), (LOOPBACK, second)).unwrap();
    next_packet(&rx);
}

#[test]
fn traced_sessions_dump_received_datagrams() {
    let directory = std::env::temp_dir().join(format!("p25issi-trace-{}", std::process::id()));
    let port = free_even_port();
    let mut session = loopback_manager()
        .create_session_with_config(&SessionConfig {
            trace_packets: true,
            trace_directory: directory.clone(),
            ..fast_config(port)
        })
        .unwrap();
    let (listener, rx) = ChannelListener::new();
    session.add_listener(Arc::new(listener));
    session.receive_rtp_packets().unwrap();

    let raw = UdpSocket::bind((LOOPBACK, 0)).unwrap();
    raw.send_to(&raw_datagram(1), (LOOPBACK, port)).unwrap();
    raw.send_to(&raw_datagram(2), (LOOPBACK, port)).unwrap();
    next_packet(&rx);
    next_packet(&rx);
    assert_eq!(session.logged_rtp_packets().len(), 2);

    let path = session
        .shut_down_with_ids("alpha", "bravo")
        .unwrap()
        .expect("tracing was enabled");
    let file_name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(file_name.ends_with("_alpha_bravo.rtp"), "{file_name}");
    let dump = std::fs::read_to_string(&path).unwrap();
    assert!(dump.starts_with("RTP Packet 0"));
    assert!(dump.contains("RTP Packet 1"));

    let _ = std::fs::remove_dir_all(&directory);
}

#[test]
fn session_renders_its_endpoints() {
    let session = loopback_manager()
        .create_rtp_session_receive_only(0)
        .unwrap();
    let xml = session.to_xml();
    assert!(xml.starts_with("<rtp-session"));
    assert!(xml.contains("remoteRtpRecvPort=\"-1\""));
    assert!(xml.contains("myAddress=\"127.0.0.1\""));
    assert!(xml.contains("myRtpRecvPort=\"0\""));
}
