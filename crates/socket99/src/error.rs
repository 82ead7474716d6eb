//! Typed failure of an open attempt.

use std::io;
use std::os::fd::OwnedFd;

use socket99_core::{ConfigError, Status};

use crate::sys::gai_error_string;

/// Why an open attempt failed.
///
/// Each variant corresponds to one failing [`Status`] and carries the error
/// captured by the call that failed.
#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    #[error("configuration: {0}")]
    Configuration(#[from] ConfigError),

    #[error("getaddrinfo: {}", gai_message(.code))]
    AddressResolution {
        /// `EAI_*` code returned by the resolver.
        code: i32,
        /// OS error, only set for `EAI_SYSTEM`.
        os_error: i32,
    },

    #[error("socket: {0}")]
    SocketCreate(#[source] io::Error),

    #[error("setsockopt: {0}")]
    SetOption(#[source] io::Error),

    #[error("bind: {0}")]
    Bind(#[source] io::Error),

    #[error("listen: {0}")]
    Listen(#[source] io::Error),

    #[error("connect: {0}")]
    Connect(#[source] io::Error),

    /// The socket was fully set up; only the non-blocking switch failed. The
    /// descriptor is still valid and belongs to the caller.
    #[error("fcntl: {source}")]
    FlagControl {
        #[source]
        source: io::Error,
        fd: OwnedFd,
    },

    /// Unix path or port string does not fit its fixed-size buffer.
    #[error("format: {0}")]
    Format(#[source] io::Error),

    #[error("unknown: no candidate address produced a socket")]
    Unknown,
}

impl OpenError {
    /// The matching status code.
    #[must_use]
    pub fn status(&self) -> Status {
        match self {
            Self::Configuration(_) => Status::Configuration,
            Self::AddressResolution { .. } => Status::AddressResolution,
            Self::SocketCreate(_) => Status::SocketCreate,
            Self::SetOption(_) => Status::SetOption,
            Self::Bind(_) => Status::Bind,
            Self::Listen(_) => Status::Listen,
            Self::Connect(_) => Status::Connect,
            Self::FlagControl { .. } => Status::FlagControl,
            Self::Format(_) => Status::Format,
            Self::Unknown => Status::Unknown,
        }
    }

    /// Platform error code captured at the failure, or 0 when there is none.
    #[must_use]
    pub fn raw_os_error(&self) -> i32 {
        match self {
            Self::Configuration(_) | Self::Unknown => 0,
            Self::AddressResolution { os_error, .. } => *os_error,
            Self::SocketCreate(err)
            | Self::SetOption(err)
            | Self::Bind(err)
            | Self::Listen(err)
            | Self::Connect(err)
            | Self::Format(err)
            | Self::FlagControl { source: err, .. } => err.raw_os_error().unwrap_or(0),
        }
    }

    /// Resolver code, or 0 unless this is an address-resolution failure.
    #[must_use]
    pub fn resolver_error(&self) -> i32 {
        match self {
            Self::AddressResolution { code, .. } => *code,
            _ => 0,
        }
    }

    pub(crate) fn path_too_long() -> Self {
        Self::Format(io::Error::from_raw_os_error(libc::ENAMETOOLONG))
    }

    pub(crate) fn port_too_long() -> Self {
        Self::Format(io::Error::from_raw_os_error(libc::EOVERFLOW))
    }
}

fn gai_message(code: &i32) -> String {
    gai_error_string(*code)
}
