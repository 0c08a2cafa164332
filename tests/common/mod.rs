//! Shared helpers for the p25issi integration tests.

#![allow(dead_code)]

use std::net::{IpAddr, Ipv4Addr, UdpSocket};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, Once};
use std::time::Duration;

use p25issi::blocks::{
    ConsolePttControlWord, ImbeVoiceBlock, IssiHeaderWord, IssiPacketType, PttControlWord,
};
use p25issi::fields::PacketType;
use p25issi::{P25Payload, RtpListener, RtpManager, RtpPacket, RtpStatus, SessionConfig};

pub const LOOPBACK: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// How long a test waits for an event before failing.
pub const EVENT_WAIT: Duration = Duration::from_secs(2);

static TRACING: Once = Once::new();

/// Installs a `RUST_LOG` driven subscriber once per test binary.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn sample_ptt_control_word() -> PttControlWord {
    PttControlWord::new(0xBEE00, 0x2A1, 0x00_1234, 0x42).unwrap()
}

pub fn sample_console_ptt_control_word() -> ConsolePttControlWord {
    let mut word = ConsolePttControlWord::new(sample_ptt_control_word());
    word.set_console_id(0x00AB_CDEF_0123).unwrap();
    word.set_voice_source_id(0x12_3456).unwrap();
    word
}

pub fn sample_issi_header_word() -> IssiHeaderWord {
    let mut word = IssiHeaderWord::default();
    word.set_message_indicator(&[0x11, 0x22, 0x33]).unwrap();
    word.set_algorithm_id(0x80);
    word.set_key_id(0x0102);
    word.set_group_id(0x7001);
    word
}

/// Heartbeat: a packet type block alone.
pub fn heartbeat_payload() -> P25Payload {
    let mut packet_type = IssiPacketType::new(PacketType::Heartbeat);
    packet_type.set_interval(20);
    P25Payload::builder(packet_type).build().unwrap()
}

/// PTT Transmit Progress with `voice_count` voice blocks starting at `first_position`.
pub fn progress_payload(first_position: usize, voice_count: usize) -> P25Payload {
    P25Payload::builder(IssiPacketType::new(PacketType::PttTransmitProgress))
        .ptt_control_word(sample_ptt_control_word())
        .voice_blocks((0..voice_count).map(|i| ImbeVoiceBlock::at_position(first_position + i)))
        .build()
        .unwrap()
}

/// PTT Transmit Request carrying every optional block it may carry.
pub fn full_request_payload() -> P25Payload {
    P25Payload::builder(IssiPacketType::new(PacketType::PttTransmitRequest))
        .ptt_control_word(sample_ptt_control_word())
        .issi_header_word(sample_issi_header_word())
        .voice_blocks([
            ImbeVoiceBlock::at_position(1),
            ImbeVoiceBlock::at_position(2),
        ])
        .build()
        .unwrap()
}

/// An RTP packet carrying `payload`.
pub fn rtp_packet(payload: &P25Payload) -> RtpPacket {
    let mut packet = RtpPacket::with_payload(payload.to_bytes().unwrap()).unwrap();
    packet.set_payload_type(100).unwrap();
    packet
}

/// A currently free, even UDP port on the loopback interface.
pub fn free_even_port() -> u16 {
    loop {
        let probe = UdpSocket::bind((LOOPBACK, 0)).unwrap();
        let port = probe.local_addr().unwrap().port();
        if port % 2 == 0 {
            return port;
        }
    }
}

pub fn loopback_manager() -> RtpManager {
    RtpManager::with_address(LOOPBACK)
}

/// Loopback session config with a short poll interval.
pub fn fast_config(local_port: u16) -> SessionConfig {
    SessionConfig {
        local_address: Some(LOOPBACK),
        local_port,
        read_timeout: Duration::from_millis(20),
        ..SessionConfig::default()
    }
}

/// What a [`ChannelListener`] observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Seen {
    Packet(RtpPacket),
    Started,
    Timeout,
    Error(String),
}

/// Forwards every event to a channel the test thread reads.
pub struct ChannelListener {
    tx: Mutex<Sender<Seen>>,
}

impl ChannelListener {
    pub fn new() -> (Self, Receiver<Seen>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx: Mutex::new(tx) }, rx)
    }

    fn send(&self, seen: Seen) {
        let _ = self.tx.lock().unwrap().send(seen);
    }
}

impl RtpListener for ChannelListener {
    fn handle_rtp_packet_event(&self, packet: &RtpPacket, _description: &str) {
        self.send(Seen::Packet(packet.clone()));
    }

    fn handle_rtp_status_event(&self, status: RtpStatus, _description: &str) {
        if status == RtpStatus::ReceiverStarted {
            self.send(Seen::Started);
        }
    }

    fn handle_rtp_timeout_event(&self, _description: &str) {
        self.send(Seen::Timeout);
    }

    fn handle_rtp_error_event(&self, description: &str) {
        self.send(Seen::Error(description.to_string()));
    }
}

/// Next packet event, skipping status events.
pub fn next_packet(rx: &Receiver<Seen>) -> RtpPacket {
    loop {
        match rx.recv_timeout(EVENT_WAIT).unwrap() {
            Seen::Packet(packet) => return packet,
            Seen::Started => continue,
            other => panic!("expected a packet, saw {other:?}"),
        }
    }
}
