//! Session configuration.
//!
//! Addresses serialize as their display strings and the read timeout as
//! whole milliseconds, so a config reads naturally as JSON:
//!
//! ```json
//! { "local_port": 25000, "remote_address": "10.0.0.2", "remote_port": 25002,
//!   "read_timeout": 200, "trace_packets": false, "trace_directory": "nistrtp_logs" }
//! ```

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, DurationMilliSeconds, serde_as};

use crate::constants::{DEFAULT_READ_TIMEOUT_MS, DEFAULT_TRACE_DIRECTORY, MIN_READ_TIMEOUT_MS};

/// Everything needed to open one [`RtpSession`](crate::rtp::RtpSession).
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Address to bind. Unspecified binds every interface.
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub local_address: Option<IpAddr>,
    /// Local receive port. Zero opens a send-only session on an ephemeral port.
    pub local_port: u16,
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub remote_address: Option<IpAddr>,
    pub remote_port: Option<u16>,
    /// Receive poll interval; bounds how long a stop request waits.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub read_timeout: Duration,
    /// Keep every received datagram for [`RtpSession::shut_down_with_ids`](crate::rtp::RtpSession::shut_down_with_ids).
    pub trace_packets: bool,
    pub trace_directory: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            local_address: None,
            local_port: 0,
            remote_address: None,
            remote_port: None,
            read_timeout: Duration::from_millis(DEFAULT_READ_TIMEOUT_MS),
            trace_packets: false,
            trace_directory: PathBuf::from(DEFAULT_TRACE_DIRECTORY),
        }
    }
}

impl SessionConfig {
    /// Receive-only session on `local_port`.
    pub fn receive_only(local_port: u16) -> Self {
        Self {
            local_port,
            ..Self::default()
        }
    }

    /// Session that both receives on `local_port` and sends to the remote endpoint.
    pub fn with_remote(local_port: u16, remote_address: IpAddr, remote_port: u16) -> Self {
        Self {
            local_port,
            remote_address: Some(remote_address),
            remote_port: Some(remote_port),
            ..Self::default()
        }
    }

    /// The read timeout the receive loop polls with, raised to at least 1 ms.
    pub fn poll_interval(&self) -> Duration {
        self.read_timeout
            .max(Duration::from_millis(MIN_READ_TIMEOUT_MS))
    }
}
