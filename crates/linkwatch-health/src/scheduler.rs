//! One independent probe cycle per target.
//!
//! Each cycle runs probe → record → wait, forever, in its own tokio task.
//! A slow or hung probe only delays its own target. Every tick is spawned
//! as a separate task so a panic inside a probe is caught at the tick
//! boundary and the cycle carries on with the next tick.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use linkwatch_core::{Target, TargetId, TargetRegistry};
use linkwatch_state::{HistoryStore, Outcome};

use crate::error::{SchedulerError, SchedulerResult};
use crate::prober::Prober;

/// Per-target cycle state.
struct CycleSlot {
    handle: JoinHandle<()>,
    interval: Duration,
}

/// Owns the probe cycles for every registered target.
pub struct Scheduler<P> {
    prober: Arc<P>,
    store: HistoryStore,
    default_interval: Duration,
    /// Active cycles: target id → slot.
    cycles: Arc<RwLock<HashMap<TargetId, CycleSlot>>>,
    /// Set by the first `start`, whatever the registry held.
    started: AtomicBool,
    shutdown_tx: watch::Sender<bool>,
}

impl<P: Prober> Scheduler<P> {
    pub fn new(prober: P, store: HistoryStore, default_interval: Duration) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            prober: Arc::new(prober),
            store,
            default_interval,
            cycles: Arc::new(RwLock::new(HashMap::new())),
            started: AtomicBool::new(false),
            shutdown_tx,
        }
    }

    /// Spawn one cycle per target. The first probe of every target runs
    /// immediately.
    pub async fn start(&self, registry: &TargetRegistry) -> SchedulerResult<()> {
        if *self.shutdown_tx.borrow() {
            return Err(SchedulerError::Stopped);
        }

        let mut cycles = self.cycles.write().await;
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(SchedulerError::AlreadyStarted);
        }

        for target in registry.iter() {
            let interval = resolve_interval(target, self.default_interval);
            let handle = tokio::spawn(run_cycle(
                Arc::clone(&self.prober),
                Arc::new(target.clone()),
                self.store.clone(),
                interval,
                self.shutdown_tx.subscribe(),
            ));
            cycles.insert(target.id, CycleSlot { handle, interval });
            debug!(target_id = target.id, title = %target.title, ?interval, "probe cycle started");
        }

        info!(targets = cycles.len(), default_interval = ?self.default_interval, "scheduler started");
        Ok(())
    }

    /// Signal every cycle to stop and wait for them to exit.
    ///
    /// A probe in flight is abandoned; the store is only ever touched
    /// between suspension points, so no record is left half-written.
    pub async fn stop_all(&self) {
        // Stored even with no subscribers, so a later `start` is refused.
        self.shutdown_tx.send_replace(true);
        let mut cycles = self.cycles.write().await;
        for (id, slot) in cycles.drain() {
            if let Err(e) = slot.handle.await {
                if e.is_panic() {
                    error!(target_id = id, "probe cycle panicked during shutdown");
                }
            }
            debug!(target_id = id, "probe cycle stopped");
        }
        info!("all probe cycles stopped");
    }

    /// Target ids with a running cycle, ascending.
    pub async fn active_targets(&self) -> Vec<TargetId> {
        let cycles = self.cycles.read().await;
        let mut ids: Vec<TargetId> = cycles.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub async fn is_monitoring(&self, target_id: TargetId) -> bool {
        let cycles = self.cycles.read().await;
        cycles.contains_key(&target_id)
    }

    /// The interval a target's cycle actually waits between probes.
    pub async fn interval_for(&self, target_id: TargetId) -> Option<Duration> {
        let cycles = self.cycles.read().await;
        cycles.get(&target_id).map(|slot| slot.interval)
    }

    pub fn store(&self) -> &HistoryStore {
        &self.store
    }
}

/// A malformed override degrades that target to the default interval.
fn resolve_interval(target: &Target, default: Duration) -> Duration {
    match target.custom_interval() {
        None => default,
        Some(Ok(interval)) => interval,
        Some(Err(e)) => {
            warn!(
                target_id = target.id,
                title = %target.title,
                error = %e,
                fallback = ?default,
                "invalid interval override, using default"
            );
            default
        }
    }
}

/// The probe cycle for a single target.
async fn run_cycle<P: Prober>(
    prober: Arc<P>,
    target: Arc<Target>,
    store: HistoryStore,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        let mut tick = tokio::spawn(run_tick(
            Arc::clone(&prober),
            Arc::clone(&target),
            store.clone(),
        ));

        tokio::select! {
            joined = &mut tick => log_tick(&target, joined),
            _ = shutdown.changed() => {
                tick.abort();
                break;
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shutdown.changed() => break,
        }
    }
    debug!(target_id = target.id, "probe cycle shutting down");
}

/// One tick: probe, then record. Nothing else in a cycle suspends.
async fn run_tick<P: Prober>(
    prober: Arc<P>,
    target: Arc<Target>,
    store: HistoryStore,
) -> SchedulerResult<Outcome> {
    let outcome = prober.probe(&target).await?;
    store.upsert(target.id, &outcome, &target.description, &target.address)?;
    Ok(outcome)
}

fn log_tick(target: &Target, joined: Result<SchedulerResult<Outcome>, tokio::task::JoinError>) {
    match joined {
        Ok(Ok(outcome)) => debug!(
            target_id = target.id,
            reachable = outcome.reachable,
            status = outcome.status_code,
            latency_ms = outcome.latency.as_millis() as u64,
            "probe recorded"
        ),
        Ok(Err(SchedulerError::Probe(e))) => warn!(
            target_id = target.id,
            title = %target.title,
            error = %e,
            "probe could not be executed, skipping tick"
        ),
        Ok(Err(e)) => error!(
            target_id = target.id,
            error = %e,
            "failed to record probe outcome"
        ),
        Err(e) if e.is_panic() => error!(
            target_id = target.id,
            "probe tick panicked, continuing with next tick"
        ),
        Err(_) => debug!(target_id = target.id, "probe tick cancelled"),
    }
}
