//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::target::TargetId;

/// Result type alias for configuration loading and validation.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid duration {input:?}: {reason}")]
    InvalidDuration { input: String, reason: String },

    #[error("duplicate target id: {0}")]
    DuplicateTarget(TargetId),

    #[error("target {id}: invalid address {address:?}: {reason}")]
    InvalidAddress {
        id: TargetId,
        address: String,
        reason: String,
    },

    #[error("target {0}: title must not be empty")]
    EmptyTitle(TargetId),

    #[error("history capacity must be at least 1")]
    ZeroCapacity,

    #[error("invalid listen address {0:?}")]
    InvalidListen(String),
}
