//! Harness error type.

use std::io;

use socket99::OpenError;

/// Why a scenario or one-shot open did not pass.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// The library refused to open the socket.
    #[error(transparent)]
    Open(#[from] OpenError),

    #[error("i/o: {0}")]
    Io(#[from] io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// The peer address for an unconnected send could not be resolved.
    #[error("resolve {host}:{port}: {reason}")]
    Resolve {
        host: String,
        port: u32,
        reason: String,
    },

    /// The socket worked but the exchange did not go as expected.
    #[error("{case}: {detail}")]
    Mismatch { case: &'static str, detail: String },

    #[error("unknown case '{0}'")]
    UnknownCase(String),
}

impl HarnessError {
    pub(crate) fn mismatch(case: &'static str, detail: impl Into<String>) -> Self {
        Self::Mismatch {
            case,
            detail: detail.into(),
        }
    }
}
