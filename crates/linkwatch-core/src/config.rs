//! linkwatch configuration parser.
//!
//! Reads `linkwatch.toml` (or a `.json` file with the same shape) and
//! resolves it into validated [`Settings`] before the engine starts.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::duration::parse_duration;
use crate::error::{ConfigError, ConfigResult};
use crate::target::{Target, TargetId, TargetRegistry};

pub const DEFAULT_HISTORY_CAPACITY: usize = 100;
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_LISTEN: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkwatchConfig {
    /// Default probe interval for every link without an override.
    #[serde(alias = "duration")]
    pub interval: String,
    pub probe_timeout: Option<String>,
    pub history_capacity: Option<usize>,
    pub listen: Option<String>,
    #[serde(default)]
    pub links: Vec<LinkConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkConfig {
    pub id: TargetId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub link: String,
    #[serde(alias = "duration", default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
}

/// Validated engine settings, ready to hand to the scheduler.
#[derive(Debug, Clone)]
pub struct Settings {
    pub default_interval: Duration,
    pub probe_timeout: Duration,
    pub history_capacity: usize,
    pub listen: SocketAddr,
    pub registry: TargetRegistry,
}

impl LinkwatchConfig {
    /// Load a config file. Files ending in `.json` are parsed as JSON,
    /// anything else as TOML.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Resolve durations, defaults and the target registry.
    ///
    /// Any error here is fatal to startup. Per-link interval overrides are
    /// not parsed here: a bad override only degrades that link to the
    /// default interval once its cycle starts.
    pub fn resolve(self) -> ConfigResult<Settings> {
        let default_interval = parse_duration(&self.interval)?;
        let probe_timeout = match self.probe_timeout.as_deref() {
            Some(raw) => parse_duration(raw)?,
            None => DEFAULT_PROBE_TIMEOUT,
        };

        let history_capacity = self.history_capacity.unwrap_or(DEFAULT_HISTORY_CAPACITY);
        if history_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }

        let listen_raw = self.listen.as_deref().unwrap_or(DEFAULT_LISTEN);
        let listen: SocketAddr = listen_raw
            .parse()
            .map_err(|_| ConfigError::InvalidListen(listen_raw.to_string()))?;

        let targets = self.links.into_iter().map(LinkConfig::into_target).collect();
        let registry = TargetRegistry::new(targets)?;

        Ok(Settings {
            default_interval,
            probe_timeout,
            history_capacity,
            listen,
            registry,
        })
    }
}

impl LinkConfig {
    fn into_target(self) -> Target {
        // `"duration": ""` in older configs means "use the default".
        let interval_override = self.interval.filter(|raw| !raw.trim().is_empty());
        Target {
            id: self.id,
            title: self.title,
            description: self.description,
            address: self.link,
            interval_override,
        }
    }
}
