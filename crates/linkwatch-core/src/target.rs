//! Monitored targets and the immutable registry that holds them.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use http::Uri;
use serde::Serialize;

use crate::duration::parse_duration;
use crate::error::{ConfigError, ConfigResult};

/// Unique identifier for a target within the registry.
pub type TargetId = u32;

/// A monitored network endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    pub id: TargetId,
    pub title: String,
    pub description: String,
    /// Absolute `http://` or `https://` URL probed on every tick.
    #[serde(rename = "link")]
    pub address: String,
    /// Raw per-target interval override, exactly as configured.
    #[serde(rename = "interval", skip_serializing_if = "Option::is_none")]
    pub interval_override: Option<String>,
}

impl Target {
    /// Parse this target's interval override, if one is set.
    ///
    /// Returns `None` when the target uses the default interval. A
    /// malformed override is returned as an error so the caller can
    /// decide how to fall back.
    pub fn custom_interval(&self) -> Option<ConfigResult<Duration>> {
        self.interval_override.as_deref().map(parse_duration)
    }

    /// Check that the address is something the prober can request.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.title.trim().is_empty() {
            return Err(ConfigError::EmptyTitle(self.id));
        }

        let invalid = |reason: &str| ConfigError::InvalidAddress {
            id: self.id,
            address: self.address.clone(),
            reason: reason.to_string(),
        };

        let uri: Uri = self
            .address
            .parse()
            .map_err(|e: http::uri::InvalidUri| invalid(&e.to_string()))?;
        match uri.scheme_str() {
            Some("http" | "https") => {}
            Some(other) => return Err(invalid(&format!("unsupported scheme {other:?}"))),
            None => return Err(invalid("missing scheme")),
        }
        if uri.host().is_none() {
            return Err(invalid("missing host"));
        }
        Ok(())
    }
}

/// Immutable, validated list of targets. Cheap to clone.
#[derive(Debug, Clone)]
pub struct TargetRegistry {
    targets: Arc<[Target]>,
}

impl TargetRegistry {
    /// Build a registry, rejecting duplicate ids and unusable addresses.
    pub fn new(targets: Vec<Target>) -> ConfigResult<Self> {
        let mut seen = HashSet::with_capacity(targets.len());
        for target in &targets {
            if !seen.insert(target.id) {
                return Err(ConfigError::DuplicateTarget(target.id));
            }
            target.validate()?;
        }
        Ok(Self {
            targets: targets.into(),
        })
    }

    pub fn get(&self, id: TargetId) -> Option<&Target> {
        self.targets.iter().find(|t| t.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter()
    }

    pub fn as_slice(&self) -> &[Target] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
