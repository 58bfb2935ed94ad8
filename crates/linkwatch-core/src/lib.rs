//! linkwatch-core — configuration and target types for linkwatch.
//!
//! Parses `linkwatch.toml`, Go-style interval strings and the list of
//! monitored links into a validated [`Settings`] value.

pub mod config;
pub mod duration;
pub mod error;
pub mod target;

pub use config::{LinkConfig, LinkwatchConfig, Settings};
pub use duration::parse_duration;
pub use error::{ConfigError, ConfigResult};
pub use target::{Target, TargetId, TargetRegistry};
