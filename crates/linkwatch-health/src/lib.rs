//! linkwatch-health — the probe engine.
//!
//! Runs one independent probe cycle per configured target and records
//! every outcome in the shared [`HistoryStore`](linkwatch_state::HistoryStore).
//!
//! # Architecture
//!
//! ```text
//! Scheduler
//!   ├── Per-target background task (started once, never restarted)
//!   │   ├── tick: Prober::probe() → Outcome      (own task, panics contained)
//!   │   ├── tick: HistoryStore::upsert()
//!   │   └── sleep(interval override or default)
//!   └── watch channel for shutdown
//! ```
//!
//! Transport failures are not errors: they come back as an unreachable
//! [`Outcome`](linkwatch_state::Outcome) with status 500. Only a target
//! that cannot be turned into a request at all yields a [`ProbeError`],
//! which skips that tick.

pub mod error;
pub mod prober;
pub mod scheduler;

pub use error::{ProbeError, ProbeResult, SchedulerError, SchedulerResult};
pub use prober::{HttpProber, Prober};
pub use scheduler::Scheduler;
