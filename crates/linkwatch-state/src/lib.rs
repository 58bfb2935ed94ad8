//! linkwatch-state — in-memory history store for linkwatch.
//!
//! Holds one [`HealthRecord`] per probed target. Each record keeps the
//! latest probe result plus a bounded ring of recent samples.
//!
//! # Architecture
//!
//! ```text
//! HistoryStore (Clone, Send + Sync)
//!   └── RwLock<HashMap<TargetId, Arc<Mutex<HealthRecord>>>>
//!         ├── index lock: write-locked only to insert a new target
//!         └── per-record lock: serializes upserts for one target
//! ```
//!
//! Upserts for different targets never wait on each other beyond a
//! shared read of the index. Readers copy records out under the
//! per-record lock, so they only ever see complete updates.

pub mod error;
pub mod ring;
pub mod store;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use ring::SampleRing;
pub use store::HistoryStore;
pub use types::*;
