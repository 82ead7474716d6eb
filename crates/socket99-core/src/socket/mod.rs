//! Socket constants.
//!
//! The `<sys/socket.h>` and `<netdb.h>` values the opener reasons about,
//! spelled out so hint building stays free of any OS binding. Values are the
//! Linux/glibc ones; the opener crate checks them against `libc` in its
//! tests.

#[cfg(not(all(target_os = "linux", target_env = "gnu")))]
compile_error!("socket99-core carries Linux/glibc socket constants; other targets are unsupported");

// ---------------------------------------------------------------------------
// Address families (AF_*)
// ---------------------------------------------------------------------------

/// Unspecified address family.
pub const AF_UNSPEC: i32 = 0;
/// Unix domain sockets.
pub const AF_UNIX: i32 = 1;
/// IPv4 Internet protocols.
pub const AF_INET: i32 = 2;
/// IPv6 Internet protocols.
pub const AF_INET6: i32 = 10;

// ---------------------------------------------------------------------------
// Socket types (SOCK_*)
// ---------------------------------------------------------------------------

/// Byte-stream socket.
pub const SOCK_STREAM: i32 = 1;
/// Datagram socket.
pub const SOCK_DGRAM: i32 = 2;

// ---------------------------------------------------------------------------
// Resolver flags (AI_*)
// ---------------------------------------------------------------------------

/// Returned addresses are suitable for `bind()`; a null node means wildcard.
pub const AI_PASSIVE: i32 = 0x0001;
/// The node is a numeric address literal; never consult name services.
pub const AI_NUMERICHOST: i32 = 0x0004;

// ---------------------------------------------------------------------------
// Socket levels and options (SO_*)
// ---------------------------------------------------------------------------

/// Socket-level options (for `getsockopt`/`setsockopt`).
pub const SOL_SOCKET: i32 = 1;

/// Allow local address reuse.
pub const SO_REUSEADDR: i32 = 2;
/// Permit sending of broadcast datagrams.
pub const SO_BROADCAST: i32 = 6;
/// Send buffer size.
pub const SO_SNDBUF: i32 = 7;
/// Receive buffer size.
pub const SO_RCVBUF: i32 = 8;
/// Enable keep-alive probes.
pub const SO_KEEPALIVE: i32 = 9;
/// Allow several sockets to bind the same address and port.
pub const SO_REUSEPORT: i32 = 15;

// ---------------------------------------------------------------------------
// Miscellaneous
// ---------------------------------------------------------------------------

/// Maximum length of the pending-connection queue for `listen()`.
pub const SOMAXCONN: i32 = 4096;

/// Returns the symbolic name of a known SOL_SOCKET option.
#[must_use]
pub fn sockopt_name(name: i32) -> Option<&'static str> {
    match name {
        SO_REUSEADDR => Some("SO_REUSEADDR"),
        SO_BROADCAST => Some("SO_BROADCAST"),
        SO_SNDBUF => Some("SO_SNDBUF"),
        SO_RCVBUF => Some("SO_RCVBUF"),
        SO_KEEPALIVE => Some("SO_KEEPALIVE"),
        SO_REUSEPORT => Some("SO_REUSEPORT"),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
