//! TCP/UDP opener.
//!
//! Resolves node and port with the hints from [`build_hints`] and walks the
//! candidate list in resolver order. A candidate whose `socket` or `connect`
//! fails is closed and the next one is tried; a failing `setsockopt`, `bind`
//! or `listen` ends the whole attempt, since those point at a real conflict
//! rather than a family mismatch.

use std::ffi::CString;
use std::mem;
use std::net::SocketAddr;
use std::os::fd::{AsFd, OwnedFd};

use socket99_core::{AddrHints, SocketConfig, build_hints};

use crate::configure::apply_socket_options;
use crate::error::OpenError;
use crate::sys::{self, AddrInfoList};

/// Converts hints into the `addrinfo` form `getaddrinfo` expects.
///
/// Callers driving `getaddrinfo` themselves get exactly the candidates the
/// opener would see.
#[must_use]
pub fn hints_to_addrinfo(hints: &AddrHints) -> libc::addrinfo {
    // SAFETY: addrinfo is plain old data; all-zero means "no constraint".
    let mut ai: libc::addrinfo = unsafe { mem::zeroed() };
    ai.ai_family = hints.family.as_raw();
    ai.ai_socktype = hints.socket_kind.as_raw();
    ai.ai_flags = hints.ai_flags();
    ai
}

/// Resolves `cfg` exactly as the opener does and returns the IP candidates
/// in resolver order.
///
/// An unconnected UDP client uses this to find its `sendto` target without
/// drifting from the hints the socket itself was opened with.
pub fn resolve(cfg: &SocketConfig) -> Result<Vec<SocketAddr>, OpenError> {
    cfg.check()?;
    let candidates = lookup(cfg)?;
    Ok(candidates
        .iter()
        .filter_map(|candidate| candidate.addr.to_socket_addr())
        .collect())
}

fn lookup(cfg: &SocketConfig) -> Result<AddrInfoList, OpenError> {
    let hints = hints_to_addrinfo(&build_hints(cfg));

    let service = cfg
        .service()
        .and_then(|s| CString::new(s).ok())
        .ok_or_else(OpenError::port_too_long)?;

    let node = cfg
        .node()
        .map(CString::new)
        .transpose()
        .map_err(|_| OpenError::AddressResolution {
            code: libc::EAI_NONAME,
            os_error: 0,
        })?;

    AddrInfoList::resolve(node.as_deref(), &service, &hints).map_err(|e| {
        OpenError::AddressResolution {
            code: e.code,
            os_error: e.os_error,
        }
    })
}

pub(crate) fn open_inet(cfg: &SocketConfig) -> Result<OwnedFd, OpenError> {
    let candidates = lookup(cfg)?;

    let mut last_failure = None;
    for candidate in candidates.iter() {
        let fd = match sys::socket(candidate.family, candidate.sock_type, candidate.protocol) {
            Ok(fd) => fd,
            Err(err) => {
                last_failure = Some(OpenError::SocketCreate(err));
                continue;
            }
        };

        apply_socket_options(fd.as_fd(), &cfg.socket_options).map_err(OpenError::SetOption)?;

        if cfg.server {
            sys::bind(fd.as_fd(), candidate.addr).map_err(OpenError::Bind)?;
            if !cfg.datagram {
                sys::listen(fd.as_fd(), cfg.effective_backlog()).map_err(OpenError::Listen)?;
            }
            return Ok(fd);
        }

        // UDP clients stay unconnected; the caller picks a target per send.
        if cfg.datagram {
            return Ok(fd);
        }

        match sys::connect(fd.as_fd(), candidate.addr) {
            Ok(()) => return Ok(fd),
            Err(err) => last_failure = Some(OpenError::Connect(err)),
        }
    }

    Err(last_failure.unwrap_or(OpenError::Unknown))
}

#[cfg(test)]
mod tests {
    use super::*;
    use socket99_core::{Status, socket};

    #[test]
    fn core_constants_match_libc() {
        assert_eq!(socket::AF_UNSPEC, libc::AF_UNSPEC);
        assert_eq!(socket::AF_UNIX, libc::AF_UNIX);
        assert_eq!(socket::AF_INET, libc::AF_INET);
        assert_eq!(socket::AF_INET6, libc::AF_INET6);
        assert_eq!(socket::SOCK_STREAM, libc::SOCK_STREAM);
        assert_eq!(socket::SOCK_DGRAM, libc::SOCK_DGRAM);
        assert_eq!(socket::AI_PASSIVE, libc::AI_PASSIVE);
        assert_eq!(socket::AI_NUMERICHOST, libc::AI_NUMERICHOST);
        assert_eq!(socket::SOL_SOCKET, libc::SOL_SOCKET);
        assert_eq!(socket::SO_REUSEADDR, libc::SO_REUSEADDR);
        assert_eq!(socket::SO_BROADCAST, libc::SO_BROADCAST);
        assert_eq!(socket::SO_SNDBUF, libc::SO_SNDBUF);
        assert_eq!(socket::SO_RCVBUF, libc::SO_RCVBUF);
        assert_eq!(socket::SO_KEEPALIVE, libc::SO_KEEPALIVE);
        assert_eq!(socket::SO_REUSEPORT, libc::SO_REUSEPORT);
        assert_eq!(socket::SOMAXCONN, libc::SOMAXCONN);
        assert_eq!(socket99_core::DEFAULT_BACKLOG, libc::SOMAXCONN);
    }

    #[test]
    fn addrinfo_from_hints() {
        let cfg = SocketConfig::inet("127.0.0.1", 80)
            .with_ipv4("127.0.0.1")
            .with_server();
        let ai = hints_to_addrinfo(&build_hints(&cfg));
        assert_eq!(ai.ai_family, libc::AF_INET);
        assert_eq!(ai.ai_socktype, libc::SOCK_STREAM);
        assert_eq!(ai.ai_flags, libc::AI_PASSIVE | libc::AI_NUMERICHOST);
        assert_eq!(ai.ai_protocol, 0);
        assert!(ai.ai_addr.is_null());
        assert!(ai.ai_next.is_null());
    }

    #[test]
    fn udp_client_hints_are_not_passive() {
        let cfg = SocketConfig::inet("localhost", 53).with_datagram();
        let ai = hints_to_addrinfo(&build_hints(&cfg));
        assert_eq!(ai.ai_family, libc::AF_UNSPEC);
        assert_eq!(ai.ai_socktype, libc::SOCK_DGRAM);
        assert_eq!(ai.ai_flags, 0);
    }

    #[test]
    fn oversized_port_is_format_failure() {
        let err = open_inet(&SocketConfig::inet("127.0.0.1", 123_456)).unwrap_err();
        assert!(matches!(err, OpenError::Format(_)));
    }

    #[test]
    fn resolve_literal_yields_one_candidate() {
        let cfg = SocketConfig::inet("ignored", 8080)
            .with_ipv4("127.0.0.1")
            .with_datagram();
        let addrs = resolve(&cfg).unwrap();
        assert_eq!(addrs, ["127.0.0.1:8080".parse::<SocketAddr>().unwrap()]);
    }

    #[test]
    fn resolve_passive_wildcard_includes_ipv4_any() {
        let cfg = SocketConfig {
            port: 8080,
            server: true,
            ..SocketConfig::default()
        };
        let addrs = resolve(&cfg).unwrap();
        assert!(addrs.contains(&"0.0.0.0:8080".parse::<SocketAddr>().unwrap()));
        assert!(addrs.iter().all(|a| a.port() == 8080 && a.ip().is_unspecified()));
    }

    #[test]
    fn resolve_applies_the_same_checks_as_open() {
        let conflicting = SocketConfig::inet("", 80)
            .with_ipv4("127.0.0.1")
            .with_ipv6("::1");
        assert_eq!(resolve(&conflicting).unwrap_err().status(), Status::Configuration);

        let numeric_only = SocketConfig::inet("", 80).with_ipv4("localhost");
        assert_eq!(
            resolve(&numeric_only).unwrap_err().status(),
            Status::AddressResolution
        );

        let oversized = SocketConfig::inet("127.0.0.1", 123_456);
        assert_eq!(resolve(&oversized).unwrap_err().status(), Status::Format);
    }

    #[test]
    fn interior_nul_host_is_resolution_failure() {
        let err = open_inet(&SocketConfig::inet("local\0host", 80)).unwrap_err();
        assert_eq!(err.resolver_error(), libc::EAI_NONAME);
    }
}
