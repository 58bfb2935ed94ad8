//! Error types for the history store.

use thiserror::Error;

/// Result type alias for history store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during history store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("history capacity must be at least 1")]
    ZeroCapacity,

    /// A writer panicked while holding a lock; the guarded data may be
    /// inconsistent and is no longer served.
    #[error("lock poisoned: {0}")]
    Poisoned(String),
}
