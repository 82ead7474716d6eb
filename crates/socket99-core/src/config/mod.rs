//! Socket configuration.
//!
//! A [`SocketConfig`] describes one open attempt: which family and role, which
//! options to set, and whether the finished descriptor should be non-blocking.
//! It is read-only for the duration of an attempt; defaults that depend on it
//! (the listen backlog) are derived rather than written back.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::socket::SOMAXCONN;

/// Backlog used when a configuration leaves `backlog_size` at zero.
pub const DEFAULT_BACKLOG: i32 = SOMAXCONN;

/// Longest decimal port rendering accepted; the resolver service buffer holds
/// five digits.
pub const PORT_STR_MAX: usize = 5;

/// Contradictory settings detected before any OS resource is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("literal IPv4 and IPv6 addresses are mutually exclusive")]
    ConflictingAddressFamilies,
}

// ---------------------------------------------------------------------------
// Socket options
// ---------------------------------------------------------------------------

/// One SOL_SOCKET option: identifier plus the raw bytes handed to `setsockopt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocketOption {
    pub name: i32,
    pub value: Vec<u8>,
}

impl SocketOption {
    /// Option with an arbitrary raw value.
    #[must_use]
    pub fn new(name: i32, value: impl Into<Vec<u8>>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }

    /// Option whose value is a native-endian C `int`.
    #[must_use]
    pub fn int(name: i32, value: i32) -> Self {
        Self::new(name, value.to_ne_bytes())
    }

    /// Boolean option encoded as an `int` of 0 or 1.
    #[must_use]
    pub fn flag(name: i32, enabled: bool) -> Self {
        Self::int(name, i32::from(enabled))
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Declarative description of the socket to open.
///
/// A set `path` selects a Unix-domain socket and overrides every TCP/UDP
/// field. Otherwise `ipv6`, then `ipv4`, then `host` names the node handed to
/// the resolver; the literal forms also pin the address family.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocketConfig {
    /// Hostname or address, for TCP or UDP sockets.
    pub host: Option<String>,
    /// Port, for TCP or UDP sockets.
    pub port: u32,
    /// Filesystem path, for Unix-domain sockets.
    pub path: Option<PathBuf>,
    /// Literal IPv4 address, used in place of `host`.
    pub ipv4: Option<String>,
    /// Literal IPv6 address, used in place of `host`.
    pub ipv6: Option<String>,
    /// Bind (and listen) rather than connect.
    pub server: bool,
    /// UDP or Unix datagram rather than a stream.
    pub datagram: bool,
    /// Put the finished descriptor into non-blocking mode.
    pub nonblocking: bool,
    /// Listen backlog; zero selects [`DEFAULT_BACKLOG`].
    pub backlog_size: i32,
    /// Options applied in order right after the socket is created.
    pub socket_options: Vec<SocketOption>,
}

impl SocketConfig {
    /// TCP (or, with [`with_datagram`](Self::with_datagram), UDP) endpoint.
    #[must_use]
    pub fn inet(host: impl Into<String>, port: u32) -> Self {
        Self {
            host: Some(host.into()),
            port,
            ..Self::default()
        }
    }

    /// Unix-domain endpoint.
    #[must_use]
    pub fn unix(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_server(mut self) -> Self {
        self.server = true;
        self
    }

    #[must_use]
    pub fn with_datagram(mut self) -> Self {
        self.datagram = true;
        self
    }

    #[must_use]
    pub fn with_nonblocking(mut self) -> Self {
        self.nonblocking = true;
        self
    }

    #[must_use]
    pub fn with_backlog(mut self, backlog: i32) -> Self {
        self.backlog_size = backlog;
        self
    }

    #[must_use]
    pub fn with_ipv4(mut self, addr: impl Into<String>) -> Self {
        self.ipv4 = Some(addr.into());
        self
    }

    #[must_use]
    pub fn with_ipv6(mut self, addr: impl Into<String>) -> Self {
        self.ipv6 = Some(addr.into());
        self
    }

    #[must_use]
    pub fn with_option(mut self, option: SocketOption) -> Self {
        self.socket_options.push(option);
        self
    }

    /// Screens out contradictory settings.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.ipv4.is_some() && self.ipv6.is_some() {
            return Err(ConfigError::ConflictingAddressFamilies);
        }
        Ok(())
    }

    /// Fills in the default backlog in place, then screens the result.
    pub fn set_defaults_and_check(&mut self) -> Result<(), ConfigError> {
        self.backlog_size = self.effective_backlog();
        self.check()
    }

    /// Backlog handed to `listen()`.
    #[must_use]
    pub fn effective_backlog(&self) -> i32 {
        if self.backlog_size == 0 {
            DEFAULT_BACKLOG
        } else {
            self.backlog_size
        }
    }

    /// Whether this configuration opens a Unix-domain socket.
    #[must_use]
    pub fn is_unix(&self) -> bool {
        self.path.is_some()
    }

    /// Node string for the resolver, `None` meaning wildcard/loopback.
    #[must_use]
    pub fn node(&self) -> Option<&str> {
        self.ipv6
            .as_deref()
            .or(self.ipv4.as_deref())
            .or(self.host.as_deref())
    }

    /// Decimal service string for the resolver, or `None` if the port does
    /// not fit in [`PORT_STR_MAX`] digits.
    #[must_use]
    pub fn service(&self) -> Option<String> {
        let service = self.port.to_string();
        (service.len() <= PORT_STR_MAX).then_some(service)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
