//! Broadcast fanout backed by a tokio broadcast channel.
//!
//! Fanout is stateless replication of one shared truth: no per-client state
//! is retained beyond the receiver handle itself. A lagged subscriber loses
//! its own events and nothing else — fanout never back-pressures ingestion.

use tokio::sync::broadcast;

use homelink_domain::state::DeviceState;

/// An event pushed to every connected real-time client.
#[derive(Debug, Clone, PartialEq)]
pub enum StateEvent {
    /// Full snapshot after a state change.
    DeviceUpdate(DeviceState),
    /// Transport connectivity transition.
    LinkStatus { connected: bool },
}

/// Fan-out channel for [`StateEvent`]s.
///
/// Broadcasting succeeds even when there are no active subscribers
/// (the event is simply dropped).
pub struct StateBroadcaster {
    sender: broadcast::Sender<StateEvent>,
}

impl StateBroadcaster {
    /// Create a new broadcaster with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events. The receiver sees all events broadcast *after*
    /// the subscription is created.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.sender.subscribe()
    }

    /// Push an event to all current subscribers.
    pub fn broadcast(&self, event: StateEvent) {
        // send fails only when there are zero receivers, which is fine.
        let _ = self.sender.send(event);
    }
}
