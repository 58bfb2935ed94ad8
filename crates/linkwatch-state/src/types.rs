//! Domain types for the history store.
//!
//! Field names on the wire follow the established `/data` format:
//! `is_up`, `status_code`, `last_pinged`, `link`, `ping_times`.

use std::num::NonZeroUsize;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

pub use linkwatch_core::TargetId;

use crate::ring::SampleRing;

/// Unix timestamp in milliseconds.
pub type EpochMillis = u64;

/// Status code recorded when a probe never got an HTTP response.
pub const UNREACHABLE_STATUS: u16 = 500;

/// Current wall-clock time as epoch milliseconds.
pub fn epoch_millis() -> EpochMillis {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as EpochMillis
}

// ── Outcome ───────────────────────────────────────────────────────

/// Classified result of a single probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// True when any HTTP response came back, whatever its status.
    pub reachable: bool,
    pub status_code: u16,
    /// Time from request start to response or failure.
    pub latency: Duration,
    pub checked_at: EpochMillis,
}

impl Outcome {
    pub fn reachable(status_code: u16, latency: Duration, checked_at: EpochMillis) -> Self {
        Self {
            reachable: true,
            status_code,
            latency,
            checked_at,
        }
    }

    pub fn unreachable(latency: Duration, checked_at: EpochMillis) -> Self {
        Self {
            reachable: false,
            status_code: UNREACHABLE_STATUS,
            latency,
            checked_at,
        }
    }
}

// ── Sample ────────────────────────────────────────────────────────

/// One historical (timestamp, latency) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    #[serde(rename = "time_pinged")]
    pub observed_at: EpochMillis,
    #[serde(rename = "response_time", with = "latency_millis")]
    pub latency: Duration,
}

/// Latency travels as whole milliseconds.
mod latency_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(latency: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(latency.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

// ── HealthRecord ──────────────────────────────────────────────────

/// Latest status plus bounded recent history for one target.
///
/// Only the store mutates records; callers receive owned copies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthRecord {
    #[serde(rename = "id")]
    target_id: TargetId,
    #[serde(rename = "is_up")]
    is_reachable: bool,
    #[serde(rename = "status_code")]
    last_status_code: u16,
    #[serde(rename = "last_pinged")]
    last_checked_at: EpochMillis,
    description: String,
    #[serde(rename = "link")]
    address: String,
    #[serde(rename = "ping_times")]
    samples: SampleRing,
}

impl HealthRecord {
    /// Build the record for a target's first completed probe.
    pub(crate) fn first(
        target_id: TargetId,
        outcome: &Outcome,
        description: &str,
        address: &str,
        capacity: NonZeroUsize,
    ) -> Self {
        let mut samples = SampleRing::new(capacity);
        samples.push(Sample {
            observed_at: outcome.checked_at,
            latency: outcome.latency,
        });
        Self {
            target_id,
            is_reachable: outcome.reachable,
            last_status_code: outcome.status_code,
            last_checked_at: outcome.checked_at,
            description: description.to_string(),
            address: address.to_string(),
            samples,
        }
    }

    /// Fold a later probe outcome into the record.
    ///
    /// `last_checked_at` never moves backwards: an outcome stamped before
    /// the current value is recorded at the current value instead.
    pub(crate) fn apply(&mut self, outcome: &Outcome, description: &str, address: &str) {
        let checked_at = outcome.checked_at.max(self.last_checked_at);
        self.samples.push(Sample {
            observed_at: checked_at,
            latency: outcome.latency,
        });
        self.is_reachable = outcome.reachable;
        self.last_status_code = outcome.status_code;
        self.last_checked_at = checked_at;
        if self.description != description {
            self.description = description.to_string();
        }
        if self.address != address {
            self.address = address.to_string();
        }
    }

    pub fn target_id(&self) -> TargetId {
        self.target_id
    }

    pub fn is_reachable(&self) -> bool {
        self.is_reachable
    }

    pub fn last_status_code(&self) -> u16 {
        self.last_status_code
    }

    pub fn last_checked_at(&self) -> EpochMillis {
        self.last_checked_at
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn samples(&self) -> &SampleRing {
        &self.samples
    }
}
