//! Factory for RTP sessions sharing one local address.

use std::net::{IpAddr, Ipv4Addr, ToSocketAddrs};

use crate::config::SessionConfig;
use crate::error::RtpError;
use crate::rtp::RtpSession;

/// Creates [`RtpSession`]s bound to one local address. Holds no session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtpManager {
    local_address: IpAddr,
}

impl Default for RtpManager {
    fn default() -> Self {
        Self::new()
    }
}

impl RtpManager {
    /// Manager for this host's own address, found by resolving its host
    /// name. Falls back to the wildcard address when the name does not
    /// resolve.
    pub fn new() -> Self {
        let resolved = hostname::get()
            .ok()
            .and_then(|name| name.into_string().ok())
            .and_then(|name| Self::resolve(&name).ok());
        resolved.unwrap_or_else(|| {
            tracing::debug!("Host name did not resolve; using the wildcard address");
            Self::wildcard()
        })
    }

    /// Manager for the wildcard address: sessions listen on every interface.
    pub fn wildcard() -> Self {
        Self::with_address(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
    }

    pub fn with_address(local_address: IpAddr) -> Self {
        Self { local_address }
    }

    /// Manager for the address `host` resolves to, IPv4 first.
    ///
    /// # Errors
    /// - [`RtpError::Io`] - `host` does not resolve
    pub fn resolve(host: &str) -> Result<Self, RtpError> {
        let addresses: Vec<_> = (host, 0).to_socket_addrs()?.collect();
        let address = addresses
            .iter()
            .find(|address| address.is_ipv4())
            .or_else(|| addresses.first())
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("no address for host '{host}'"),
                )
            })?;
        Ok(Self::with_address(address.ip()))
    }

    pub fn local_address(&self) -> IpAddr {
        self.local_address
    }

    /// Opens a session from a full configuration. A config without a local
    /// address inherits the manager's.
    ///
    /// # Errors
    /// - [`RtpError::Io`] - A socket could not be bound
    pub fn create_session_with_config(&self, config: &SessionConfig) -> Result<RtpSession, RtpError> {
        let mut config = config.clone();
        config.local_address = config.local_address.or(Some(self.local_address));
        tracing::debug!(
            address = %self.local_address,
            port = config.local_port,
            "Creating RTP session"
        );
        RtpSession::new(&config)
    }

    /// Session that receives on `my_rtp_recv_port` and sends to the remote endpoint.
    ///
    /// # Errors
    /// - [`RtpError::Io`] - The port could not be bound
    pub fn create_rtp_session(
        &self,
        my_rtp_recv_port: u16,
        remote_address: IpAddr,
        remote_rtp_recv_port: u16,
    ) -> Result<RtpSession, RtpError> {
        self.create_session_with_config(&SessionConfig::with_remote(
            my_rtp_recv_port,
            remote_address,
            remote_rtp_recv_port,
        ))
    }

    /// Session whose remote endpoint is supplied later. Port 0 gives a
    /// send-only session.
    ///
    /// # Errors
    /// - [`RtpError::Io`] - The port could not be bound
    pub fn create_rtp_session_receive_only(
        &self,
        my_rtp_recv_port: u16,
    ) -> Result<RtpSession, RtpError> {
        self.create_session_with_config(&SessionConfig::receive_only(my_rtp_recv_port))
    }
}
