//! # socket99-core
//!
//! Pure decision logic behind `socket99`.
//!
//! This crate turns a declarative [`SocketConfig`] into the facts the opener
//! needs before it touches the OS: whether the configuration is coherent,
//! which backlog to listen with, which resolver hints to pass, and how each
//! outcome is named. No syscalls happen here and `unsafe` is not permitted.

#![deny(unsafe_code)]

pub mod config;
pub mod hints;
pub mod socket;
pub mod status;

pub use config::{ConfigError, DEFAULT_BACKLOG, PORT_STR_MAX, SocketConfig, SocketOption};
pub use hints::{AddrHints, AddressFamily, SocketKind, build_hints};
pub use status::Status;
