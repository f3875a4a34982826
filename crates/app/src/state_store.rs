//! State store — the serialized-access boundary around [`DeviceState`].
//!
//! Every mutation in the system goes through [`StateStore::merge_update`];
//! no component reads-modifies-writes fields directly. The lock is a plain
//! `std::sync::Mutex` and is never held across an `.await` — snapshots are
//! cloned out and all network IO happens afterwards.

use std::sync::{Mutex, PoisonError};

use homelink_domain::state::{DeviceState, StateDelta};
use homelink_domain::time::now;
use homelink_domain::topics::TopicMap;

/// Owner of the single mutable [`DeviceState`] instance.
pub struct StateStore {
    inner: Mutex<DeviceState>,
}

impl StateStore {
    /// Store seeded with all-false/zero defaults for the given topic map.
    #[must_use]
    pub fn new(topics: &TopicMap) -> Self {
        Self::with_state(DeviceState::initial(topics))
    }

    /// Store starting from an explicit state.
    #[must_use]
    pub fn with_state(state: DeviceState) -> Self {
        Self {
            inner: Mutex::new(state),
        }
    }

    /// Immutable copy of the current state.
    ///
    /// Always fully consistent — a snapshot never mixes fields from two
    /// different merges.
    #[must_use]
    pub fn snapshot(&self) -> DeviceState {
        self.lock().clone()
    }

    /// Apply a partial field set atomically and return the new snapshot.
    ///
    /// Concurrent callers observe a total order of merges; once this
    /// returns, every subsequent [`snapshot`](Self::snapshot) reflects the
    /// write.
    pub fn merge_update(&self, delta: StateDelta) -> DeviceState {
        let mut state = self.lock();
        state.apply(&delta, now());
        state.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DeviceState> {
        // apply() cannot leave a torn state, so a poisoned guard is safe to
        // recover.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
