use crate::kind::NumberKind;
use thiserror::Error;

/// Top-level error type used across the entire application.
#[derive(Debug, Error)]
pub enum AvgError {
    #[error("config error: {0}")]
    Config(String),

    /// Transport, timeout or body-decoding failure talking to the number source.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// The number source answered with a non-success HTTP status.
    #[error("{kind} endpoint returned HTTP {status}")]
    Status { kind: NumberKind, status: u16 },

    #[error("store error: {0}")]
    Store(String),

    #[error("invalid window size {0}: must be at least 1")]
    InvalidWindowSize(i64),

    /// Malformed input from a caller of the service.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("unknown number kind '{0}' (expected one of p, f, e, r)")]
    UnknownKind(String),

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl AvgError {
    /// `true` for failures of the upstream fetch (as opposed to local faults).
    #[must_use]
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Self::Fetch(_) | Self::Status { .. })
    }
}

pub type Result<T, E = AvgError> = std::result::Result<T, E>;
