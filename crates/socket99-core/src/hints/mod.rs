//! Resolver hints.
//!
//! [`build_hints`] is the single place that decides address family, socket
//! type and resolver flags for a configuration. The opener uses it for its
//! own `getaddrinfo` call; callers that resolve addresses themselves (for
//! example to `sendto` from an unconnected UDP client) can reuse it and get
//! the same candidates.

use crate::config::SocketConfig;
use crate::socket::{
    AF_INET, AF_INET6, AF_UNIX, AF_UNSPEC, AI_NUMERICHOST, AI_PASSIVE, SOCK_DGRAM, SOCK_STREAM,
};

/// Address family requested from the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    /// Let the resolver return any family.
    Unspecified,
    Unix,
    Inet,
    Inet6,
}

impl AddressFamily {
    /// The `AF_*` value.
    #[must_use]
    pub const fn as_raw(self) -> i32 {
        match self {
            Self::Unspecified => AF_UNSPEC,
            Self::Unix => AF_UNIX,
            Self::Inet => AF_INET,
            Self::Inet6 => AF_INET6,
        }
    }
}

/// Connection-oriented or connectionless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocketKind {
    Stream,
    Datagram,
}

impl SocketKind {
    /// The `SOCK_*` value.
    #[must_use]
    pub const fn as_raw(self) -> i32 {
        match self {
            Self::Stream => SOCK_STREAM,
            Self::Datagram => SOCK_DGRAM,
        }
    }
}

/// Everything `getaddrinfo` needs besides node and service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddrHints {
    pub family: AddressFamily,
    pub socket_kind: SocketKind,
    /// `AI_PASSIVE`: addresses are meant for `bind()`.
    pub passive: bool,
    /// `AI_NUMERICHOST`: the node is an address literal.
    pub numeric_host: bool,
}

impl AddrHints {
    /// The `ai_flags` bit set.
    #[must_use]
    pub const fn ai_flags(&self) -> i32 {
        let mut flags = 0;
        if self.passive {
            flags |= AI_PASSIVE;
        }
        if self.numeric_host {
            flags |= AI_NUMERICHOST;
        }
        flags
    }
}

/// Maps a configuration to resolver hints.
///
/// Family precedence is path, then IPv6 literal, then IPv4 literal, then
/// unspecified. Every socket is passive except a datagram client, which never
/// binds.
#[must_use]
pub fn build_hints(cfg: &SocketConfig) -> AddrHints {
    let family = if cfg.path.is_some() {
        AddressFamily::Unix
    } else if cfg.ipv6.is_some() {
        AddressFamily::Inet6
    } else if cfg.ipv4.is_some() {
        AddressFamily::Inet
    } else {
        AddressFamily::Unspecified
    };

    let socket_kind = if cfg.datagram {
        SocketKind::Datagram
    } else {
        SocketKind::Stream
    };

    AddrHints {
        family,
        socket_kind,
        passive: !cfg.datagram || cfg.server,
        numeric_host: cfg.ipv4.is_some() || cfg.ipv6.is_some(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
