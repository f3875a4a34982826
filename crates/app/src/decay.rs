//! Decay scheduler — debounced auto-reset for transient sensor fields.
//!
//! A transient field set to `true` reverts to `false` after a fixed window
//! unless re-armed. Re-arming replaces the pending timer for that field —
//! the deadline resets, timers never stack. Each firing produces exactly one
//! merge and one broadcast.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

use homelink_domain::state::StateDelta;

use crate::broadcast::{StateBroadcaster, StateEvent};
use crate::state_store::StateStore;

struct PendingDecay {
    generation: u64,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct Registry {
    next_generation: u64,
    pending: HashMap<String, PendingDecay>,
}

/// Schedules delayed revert-to-false merges for transient fields.
pub struct DecayScheduler {
    window: Duration,
    store: Arc<StateStore>,
    fanout: Arc<StateBroadcaster>,
    registry: Arc<Mutex<Registry>>,
}

impl DecayScheduler {
    /// Scheduler reverting fields `window` after the most recent arm.
    #[must_use]
    pub fn new(window: Duration, store: Arc<StateStore>, fanout: Arc<StateBroadcaster>) -> Self {
        Self {
            window,
            store,
            fanout,
            registry: Arc::new(Mutex::new(Registry::default())),
        }
    }

    /// Schedule (or reschedule) the revert of `field` to `false`.
    ///
    /// An existing timer for the same field is aborted and replaced, so the
    /// window always measures from the latest trigger. Callers arm *before*
    /// merging the `true` value; together with the registry lock held across
    /// claim-and-merge in the timer task, this keeps a firing that lost the
    /// race against a re-trigger from reverting the fresh value.
    pub fn arm(&self, field: &str) {
        let mut registry = lock(&self.registry);
        registry.next_generation += 1;
        let generation = registry.next_generation;

        let field_owned = field.to_string();
        let window = self.window;
        let store = Arc::clone(&self.store);
        let fanout = Arc::clone(&self.fanout);
        let shared = Arc::clone(&self.registry);

        let handle = tokio::spawn(async move {
            tokio::time::sleep(window).await;

            let snapshot = {
                let mut registry = lock(&shared);
                match registry.pending.get(&field_owned) {
                    // Still the current timer for this field: claim the slot
                    // and merge while holding the registry lock.
                    Some(current) if current.generation == generation => {
                        registry.pending.remove(&field_owned);
                        store.merge_update(StateDelta::transient(field_owned.as_str(), false))
                    }
                    // Superseded by a re-arm (or cancelled) while waking up.
                    _ => return,
                }
            };
            tracing::debug!(field = %field_owned, "transient field decayed");
            fanout.broadcast(StateEvent::DeviceUpdate(snapshot));
        });

        if let Some(previous) = registry.pending.insert(
            field.to_string(),
            PendingDecay { generation, handle },
        ) {
            previous.handle.abort();
        }
    }

    /// Remove a pending decay without firing it.
    pub fn cancel(&self, field: &str) {
        let mut registry = lock(&self.registry);
        if let Some(pending) = registry.pending.remove(field) {
            pending.handle.abort();
        }
    }

    /// Cancel every pending decay. Called on process shutdown so no timer
    /// fires into a torn-down store.
    pub fn shutdown(&self) {
        let mut registry = lock(&self.registry);
        for (_, pending) in registry.pending.drain() {
            pending.handle.abort();
        }
    }

    /// Whether a decay is currently pending for `field`.
    #[must_use]
    pub fn is_armed(&self, field: &str) -> bool {
        lock(&self.registry).pending.contains_key(field)
    }
}

fn lock(registry: &Mutex<Registry>) -> std::sync::MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}
