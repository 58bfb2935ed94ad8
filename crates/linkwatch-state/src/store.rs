//! Concurrency-safe keyed store of health records.
//!
//! The store is the only place records are mutated. All reads hand out
//! owned copies taken under the record's own lock.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, RwLock};

use tracing::{debug, error};

use crate::error::{StoreError, StoreResult};
use crate::types::*;

/// Convert a lock poisoning error into a `StoreError` naming the lock.
macro_rules! poisoned {
    ($what:expr) => {
        |_| StoreError::Poisoned($what.to_string())
    };
}

type Slot = Arc<Mutex<HealthRecord>>;

/// Thread-safe history store. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct HistoryStore {
    index: Arc<RwLock<HashMap<TargetId, Slot>>>,
    capacity: NonZeroUsize,
}

impl HistoryStore {
    /// Create an empty store keeping at most `capacity` samples per target.
    pub fn new(capacity: usize) -> StoreResult<Self> {
        let capacity = NonZeroUsize::new(capacity).ok_or(StoreError::ZeroCapacity)?;
        Ok(Self {
            index: Arc::new(RwLock::new(HashMap::new())),
            capacity,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Record a probe outcome for `target_id`, creating the record on
    /// the target's first probe.
    ///
    /// Upserts for the same target are serialized on that target's lock.
    /// Upserts for different targets only share a read lock on the index,
    /// except for the one-time insert of a new target.
    pub fn upsert(
        &self,
        target_id: TargetId,
        outcome: &Outcome,
        description: &str,
        address: &str,
    ) -> StoreResult<()> {
        if let Some(slot) = self.slot(target_id)? {
            return self.apply(target_id, &slot, outcome, description, address);
        }

        let slot = {
            let mut index = self.index.write().map_err(poisoned!("history index"))?;
            match index.entry(target_id) {
                // Another writer created it between our read and write lock.
                Entry::Occupied(entry) => Arc::clone(entry.get()),
                Entry::Vacant(entry) => {
                    let record =
                        HealthRecord::first(target_id, outcome, description, address, self.capacity);
                    entry.insert(Arc::new(Mutex::new(record)));
                    debug!(%target_id, reachable = outcome.reachable, "health record created");
                    return Ok(());
                }
            }
        };
        self.apply(target_id, &slot, outcome, description, address)
    }

    /// Copy of one target's record, or `None` if it was never probed.
    pub fn get(&self, target_id: TargetId) -> StoreResult<Option<HealthRecord>> {
        match self.slot(target_id)? {
            Some(slot) => {
                let record = slot.lock().map_err(poisoned!("health record"))?;
                Ok(Some(record.clone()))
            }
            None => Ok(None),
        }
    }

    /// Snapshot of every record, keyed by target id.
    ///
    /// The index lock is held only long enough to collect the record
    /// handles; each record is then copied under its own lock, so a long
    /// listing never stalls writers for other targets.
    ///
    /// A poisoned record is logged and left out of the snapshot; `get`
    /// still reports it as [`StoreError::Poisoned`]. Only a poisoned index
    /// fails the whole listing.
    pub fn list(&self) -> StoreResult<BTreeMap<TargetId, HealthRecord>> {
        let slots: Vec<(TargetId, Slot)> = {
            let index = self.index.read().map_err(poisoned!("history index"))?;
            index.iter().map(|(id, slot)| (*id, Arc::clone(slot))).collect()
        };

        let mut records = BTreeMap::new();
        for (id, slot) in slots {
            match slot.lock() {
                Ok(record) => {
                    records.insert(id, record.clone());
                }
                Err(_) => error!(target_id = id, "health record lock poisoned, omitted from listing"),
            }
        }
        Ok(records)
    }

    pub fn contains(&self, target_id: TargetId) -> StoreResult<bool> {
        Ok(self.slot(target_id)?.is_some())
    }

    /// Number of targets with a record.
    pub fn len(&self) -> StoreResult<usize> {
        let index = self.index.read().map_err(poisoned!("history index"))?;
        Ok(index.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    fn slot(&self, target_id: TargetId) -> StoreResult<Option<Slot>> {
        let index = self.index.read().map_err(poisoned!("history index"))?;
        Ok(index.get(&target_id).map(Arc::clone))
    }

    fn apply(
        &self,
        target_id: TargetId,
        slot: &Slot,
        outcome: &Outcome,
        description: &str,
        address: &str,
    ) -> StoreResult<()> {
        let mut record = slot.lock().map_err(poisoned!("health record"))?;
        record.apply(outcome, description, address);
        debug!(
            %target_id,
            reachable = outcome.reachable,
            status = outcome.status_code,
            samples = record.samples().len(),
            "health record updated"
        );
        Ok(())
    }
}
