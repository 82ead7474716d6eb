//! Scenario runner for socket99.
//!
//! This crate provides:
//! - The scenario registry: nine client/server cases over TCP, UDP and
//!   Unix-domain sockets
//! - Structured JSONL logging of every open attempt
//! - The `harness` CLI (`list`, `run`, `open`)

#![forbid(unsafe_code)]

pub mod cases;
pub mod error;
pub mod structured_log;

pub use cases::{CASES, Case, CaseParams, CaseReport, lookup};
pub use error::HarnessError;
pub use structured_log::{LogEmitter, LogEntry, LogLevel, Outcome};
