//! One RTP endpoint: a receive socket, a send path and a receive loop.
//!
//! When the session listens on a port it also sends from that port. A
//! send-only session (receive port 0) sends from an ephemeral port.
//! Sequence numbers are assigned under the send lock, starting at 1, so
//! concurrent senders never reuse or reorder them.

use std::fmt::Write as _;
use std::fs;
use std::io::Write as _;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Local;

use crate::bits::write_bytes;
use crate::config::SessionConfig;
use crate::constants::{RTP_INITIAL_SEQUENCE_NUMBER, TRACE_FILE_DATE_FORMAT};
use crate::error::RtpError;
use crate::rtp::receiver::{ListenerList, PacketLog, ReceiverContext};
use crate::rtp::{RtpListener, RtpPacket, RtpPacketReceiver};
use crate::types::SequenceNumber;

/// Sockets of one session, shared with its receive loop so the loop can
/// release them when it exits.
#[derive(Debug)]
pub(crate) struct SocketState {
    local_address: IpAddr,
    receive_socket: Option<UdpSocket>,
    my_rtp_recv_port: u16,
    /// Bumped whenever the receive socket is replaced or released.
    generation: u64,
    send_socket: Option<UdpSocket>,
    /// Send socket is a handle on the receive socket.
    shares_receive_socket: bool,
    next_sequence_number: SequenceNumber,
}

pub(crate) type SharedSockets = Arc<Mutex<SocketState>>;

impl SocketState {
    /// No receive socket and no send socket yet.
    pub(crate) fn new(local_address: IpAddr) -> Self {
        Self {
            local_address,
            receive_socket: None,
            my_rtp_recv_port: 0,
            generation: 0,
            send_socket: None,
            shares_receive_socket: false,
            next_sequence_number: SequenceNumber::new(RTP_INITIAL_SEQUENCE_NUMBER),
        }
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    fn install_receive_socket(&mut self, socket: UdpSocket) -> Result<(), RtpError> {
        let port = socket.local_addr()?.port();
        self.send_socket = Some(socket.try_clone()?);
        self.shares_receive_socket = true;
        self.receive_socket = Some(socket);
        self.my_rtp_recv_port = port;
        self.generation += 1;
        Ok(())
    }

    /// Drops every handle on the receive socket, freeing its port. A send
    /// socket that shared it is replaced by one on an ephemeral port.
    ///
    /// # Errors
    /// - [`RtpError::Io`] - The replacement send socket could not be bound
    pub(crate) fn release_receive_socket(&mut self) -> Result<(), RtpError> {
        self.receive_socket = None;
        self.my_rtp_recv_port = 0;
        self.generation += 1;
        if self.shares_receive_socket {
            self.shares_receive_socket = false;
            self.send_socket = None;
            self.send_socket = Some(UdpSocket::bind((self.local_address, 0))?);
        }
        Ok(())
    }
}

pub(crate) fn lock_sockets(sockets: &SharedSockets) -> MutexGuard<'_, SocketState> {
    sockets.lock().unwrap_or_else(PoisonError::into_inner)
}

/// An RTP session bound to a local receive port.
pub struct RtpSession {
    local_address: IpAddr,
    remote_address: Option<IpAddr>,
    remote_rtp_recv_port: Option<u16>,
    sockets: SharedSockets,
    receiver: Option<RtpPacketReceiver>,
    listeners: ListenerList,
    packet_log: PacketLog,
    read_timeout: Duration,
    trace_packets: bool,
    trace_directory: PathBuf,
}

fn require_even_port(port: u16) -> Result<(), RtpError> {
    if port % 2 != 0 {
        return Err(RtpError::OddPort(port));
    }
    Ok(())
}

impl RtpSession {
    /// Opens the sockets described by `config`.
    ///
    /// # Errors
    /// - [`RtpError::Io`] - A socket could not be bound
    pub fn new(config: &SessionConfig) -> Result<Self, RtpError> {
        let local_address = config
            .local_address
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        let mut sockets = SocketState::new(local_address);
        if config.local_port != 0 {
            sockets.install_receive_socket(UdpSocket::bind((local_address, config.local_port))?)?;
        } else {
            sockets.send_socket = Some(UdpSocket::bind((local_address, 0))?);
        }
        if config.read_timeout.is_zero() {
            tracing::warn!("Zero read timeout; polling at the minimum interval");
        }
        tracing::debug!(
            address = %local_address,
            port = sockets.my_rtp_recv_port,
            "Created RTP session"
        );
        Ok(Self {
            local_address,
            remote_address: config.remote_address,
            remote_rtp_recv_port: config.remote_port,
            sockets: Arc::new(Mutex::new(sockets)),
            receiver: None,
            listeners: Arc::default(),
            packet_log: Arc::default(),
            read_timeout: config.poll_interval(),
            trace_packets: config.trace_packets,
            trace_directory: config.trace_directory.clone(),
        })
    }

    fn socket_state(&self) -> MutexGuard<'_, SocketState> {
        lock_sockets(&self.sockets)
    }

    pub fn add_listener(&self, listener: Arc<dyn RtpListener>) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    /// Removes `listener` by identity. Returns false if it was not registered.
    pub fn remove_listener(&self, listener: &Arc<dyn RtpListener>) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|registered| !Arc::ptr_eq(registered, listener));
        listeners.len() != before
    }

    /// Starts the receive loop unless one is already running.
    ///
    /// # Errors
    /// - [`RtpError::NoReceiveSocket`] - Send-only, stopped or shut down session,
    ///   or one whose receive loop failed
    /// - [`RtpError::Io`] - The socket could not be shared with the loop
    pub fn receive_rtp_packets(&mut self) -> Result<(), RtpError> {
        if self
            .receiver
            .as_ref()
            .is_some_and(|receiver| !receiver.is_finished())
        {
            return Ok(());
        }
        let (socket, generation) = {
            let sockets = self.socket_state();
            let Some(socket) = &sockets.receive_socket else {
                return Err(RtpError::NoReceiveSocket);
            };
            (socket.try_clone()?, sockets.generation())
        };
        let trace_packets = self.trace_enabled();
        let receiver = RtpPacketReceiver::spawn(
            socket,
            ReceiverContext {
                listeners: Arc::clone(&self.listeners),
                packet_log: Arc::clone(&self.packet_log),
                sockets: Arc::clone(&self.sockets),
                generation,
                trace_packets,
                read_timeout: self.read_timeout,
            },
        )?;
        self.receiver = Some(receiver);
        Ok(())
    }

    fn stop_receiver(&mut self) {
        if let Some(mut receiver) = self.receiver.take() {
            receiver.stop();
        }
    }

    /// Stops the receive loop and releases the receive port.
    ///
    /// Sending continues from a fresh ephemeral port.
    ///
    /// # Errors
    /// - [`RtpError::Io`] - The replacement send socket could not be bound
    pub fn stop_rtp_packet_receiver(&mut self) -> Result<(), RtpError> {
        self.stop_receiver();
        let mut sockets = self.socket_state();
        if sockets.receive_socket.is_none() {
            return Ok(());
        }
        sockets.release_receive_socket()
    }

    /// Stamps the next sequence number onto `packet` and sends it.
    ///
    /// # Errors
    /// - [`RtpError::RemoteAddressUndefined`] - No remote address yet
    /// - [`RtpError::RemotePortUndefined`] - No remote port yet
    /// - [`RtpError::SocketClosed`] - The session no longer has a send socket
    /// - [`RtpError::Io`] - The datagram could not be sent
    pub fn send_rtp_packet(&self, packet: &mut RtpPacket) -> Result<(), RtpError> {
        let remote_address = self
            .remote_address
            .ok_or(RtpError::RemoteAddressUndefined)?;
        let remote_port = self
            .remote_rtp_recv_port
            .ok_or(RtpError::RemotePortUndefined)?;
        let mut sockets = self.socket_state();
        let Some(socket) = &sockets.send_socket else {
            return Err(RtpError::SocketClosed);
        };
        packet.set_sequence_number(sockets.next_sequence_number);
        socket.send_to(&packet.to_bytes(), SocketAddr::new(remote_address, remote_port))?;
        sockets.next_sequence_number = sockets.next_sequence_number.next();
        Ok(())
    }

    pub fn set_remote_address(&mut self, remote_address: IpAddr) {
        self.remote_address = Some(remote_address);
    }

    /// Sets the peer's receive port. Zero releases a dedicated send socket.
    ///
    /// # Errors
    /// - [`RtpError::OddPort`] - `port` is odd
    pub fn set_remote_rtp_recv_port(&mut self, port: u16) -> Result<(), RtpError> {
        require_even_port(port)?;
        tracing::debug!(port, "Setting remote RTP receive port");
        self.remote_rtp_recv_port = Some(port);
        if port == 0 {
            let mut sockets = self.socket_state();
            if !sockets.shares_receive_socket {
                sockets.send_socket = None;
            }
        }
        Ok(())
    }

    /// Moves the session to a new receive port. Any running receive loop is
    /// stopped; call [`receive_rtp_packets`](Self::receive_rtp_packets) again.
    ///
    /// # Errors
    /// - [`RtpError::OddPort`] - `port` is zero or odd
    /// - [`RtpError::Io`] - The port could not be bound
    pub fn reset_my_rtp_recv_port(&mut self, port: u16) -> Result<(), RtpError> {
        if port == 0 {
            return Err(RtpError::OddPort(port));
        }
        require_even_port(port)?;
        self.stop_receiver();
        let socket = UdpSocket::bind((self.local_address, port))?;
        self.socket_state().install_receive_socket(socket)
    }

    /// Stops the receive loop and closes every socket.
    pub fn shut_down(&mut self) {
        tracing::debug!(
            address = %self.local_address,
            port = self.my_rtp_recv_port(),
            "Shutting down RTP session"
        );
        self.stop_receiver();
        let mut sockets = self.socket_state();
        sockets.receive_socket = None;
        sockets.my_rtp_recv_port = 0;
        sockets.generation += 1;
        sockets.send_socket = None;
        sockets.shares_receive_socket = false;
    }

    /// Shuts down and, when tracing, dumps every received datagram to
    /// `{trace_directory}/{date}_{id1}_{id2}.rtp`. Returns the file written.
    ///
    /// # Errors
    /// - [`RtpError::Io`] - The trace file could not be written
    pub fn shut_down_with_ids(
        &mut self,
        session_id1: &str,
        session_id2: &str,
    ) -> Result<Option<PathBuf>, RtpError> {
        self.shut_down();
        if !self.trace_enabled() {
            return Ok(None);
        }
        fs::create_dir_all(&self.trace_directory)?;
        let date = Local::now().format(TRACE_FILE_DATE_FORMAT);
        let path = self
            .trace_directory
            .join(format!("{date}_{session_id1}_{session_id2}.rtp"));

        let mut dump = String::new();
        for (i, datagram) in self.logged_rtp_packets().iter().enumerate() {
            let _ = writeln!(dump, "RTP Packet {i}: {}", write_bytes(datagram));
        }
        fs::File::create(&path)?.write_all(dump.as_bytes())?;
        tracing::debug!(path = %path.display(), "Wrote RTP packet trace");
        Ok(Some(path))
    }

    /// Raw datagrams received while tracing was enabled.
    pub fn logged_rtp_packets(&self) -> Vec<Vec<u8>> {
        self.packet_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// True when received datagrams are being kept.
    pub fn trace_enabled(&self) -> bool {
        self.trace_packets || tracing::enabled!(tracing::Level::TRACE)
    }

    /// Address of the receive socket, or of the send socket for a send-only session.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        let sockets = self.socket_state();
        sockets
            .receive_socket
            .as_ref()
            .or(sockets.send_socket.as_ref())
            .and_then(|socket| socket.local_addr().ok())
    }

    pub fn local_address(&self) -> IpAddr {
        self.local_address
    }

    /// Local receive port, 0 once the receiver is stopped or has failed, and
    /// for send-only sessions.
    pub fn my_rtp_recv_port(&self) -> u16 {
        self.socket_state().my_rtp_recv_port
    }

    pub fn remote_address(&self) -> Option<IpAddr> {
        self.remote_address
    }

    pub fn remote_rtp_recv_port(&self) -> Option<u16> {
        self.remote_rtp_recv_port
    }

    /// Sequence number the next send will use.
    pub fn next_sequence_number(&self) -> SequenceNumber {
        self.socket_state().next_sequence_number
    }

    pub fn to_xml(&self) -> String {
        format!(
            "<rtp-session\n senderIpAddress=\"{}\"\n remoteRtpRecvPort=\"{}\"\n myAddress=\"{}\"\n myRtpRecvPort=\"{}\"\n/>",
            self.remote_address
                .map(|address| address.to_string())
                .unwrap_or_default(),
            self.remote_rtp_recv_port
                .map_or(-1, i32::from),
            self.local_address,
            self.my_rtp_recv_port(),
        )
    }
}

impl Drop for RtpSession {
    fn drop(&mut self) {
        self.stop_receiver();
    }
}
