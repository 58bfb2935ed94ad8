//! Probe and scheduler error types.

use thiserror::Error;

/// Result type alias for probe execution.
pub type ProbeResult<T> = Result<T, ProbeError>;

/// A probe that could not even be attempted.
///
/// Network failures are never reported here; they become unreachable
/// outcomes instead.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("unsupported scheme in {0:?}, only http:// and https:// targets can be probed")]
    UnsupportedScheme(String),

    #[error("failed to set up TLS client: {0}")]
    Tls(#[from] rustls::Error),
}

/// Errors that can occur during scheduling operations.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("scheduler already started")]
    AlreadyStarted,

    #[error("scheduler has been stopped")]
    Stopped,

    #[error("probe error: {0}")]
    Probe(#[from] ProbeError),

    #[error("state store error: {0}")]
    Store(#[from] linkwatch_state::StoreError),
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;
