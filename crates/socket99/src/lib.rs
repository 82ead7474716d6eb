//! # socket99
//!
//! Opens one TCP, UDP or Unix-domain socket, client or server, from a
//! declarative [`SocketConfig`].
//!
//! ```text
//! SocketConfig -> check -> unix_domain | inet -> options -> [O_NONBLOCK] -> OpenResult
//! ```
//!
//! [`open`] reports the outcome as data in an [`OpenResult`], mirroring the C
//! calling convention of a status code plus saved error numbers;
//! [`try_open`] gives the same outcome as a `Result` with a typed
//! [`OpenError`]. Either way a successfully opened descriptor is an
//! [`OwnedFd`](std::os::fd::OwnedFd) handed to the caller. Nothing is retried
//! except walking the resolver's candidate list, and no call carries a
//! timeout of its own.

mod configure;
mod error;
mod inet;
mod result;
mod sys;
mod unix_domain;

use std::os::fd::{AsFd, OwnedFd};

pub use error::OpenError;
pub use inet::{hints_to_addrinfo, resolve};
pub use result::OpenResult;
pub use socket99_core::{
    AddrHints, AddressFamily, ConfigError, DEFAULT_BACKLOG, SocketConfig, SocketKind,
    SocketOption, Status, build_hints, socket,
};

/// Opens a socket as described by `config`.
///
/// Contradictory configurations are rejected before any descriptor exists.
/// A set `path` opens a Unix-domain socket; otherwise the node and port are
/// resolved and tried in order.
#[must_use]
pub fn open(config: &SocketConfig) -> OpenResult {
    try_open(config).into()
}

/// Like [`open`], returning a `Result`.
///
/// If only the final non-blocking switch fails, the error still owns the
/// valid descriptor (see [`OpenError::FlagControl`]).
pub fn try_open(config: &SocketConfig) -> Result<OwnedFd, OpenError> {
    config.check()?;

    let fd = match config.path.as_deref() {
        Some(path) => unix_domain::open_unix(config, path)?,
        None => inet::open_inet(config)?,
    };

    if config.nonblocking {
        if let Err(source) = configure::set_nonblocking(fd.as_fd()) {
            return Err(OpenError::FlagControl { source, fd });
        }
    }

    Ok(fd)
}
