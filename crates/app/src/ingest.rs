//! Event ingestion pipeline — transport messages in, merged state out.
//!
//! A single consumer drains the transport event channel, decodes each
//! message against the topic map, applies one merge per accepted message,
//! and broadcasts the resulting snapshot. Link transitions fold into the
//! store the same way, so `link_connected` always tracks live status.

use std::sync::Arc;

use tokio::sync::mpsc;

use homelink_domain::state::StateDelta;
use homelink_domain::topics::{TopicKind, TopicMap};

use crate::broadcast::{StateBroadcaster, StateEvent};
use crate::decay::DecayScheduler;
use crate::ports::LinkEvent;
use crate::state_store::StateStore;

/// Decodes inbound transport events and folds them into the state store.
pub struct IngestPipeline {
    topics: Arc<TopicMap>,
    store: Arc<StateStore>,
    decay: Arc<DecayScheduler>,
    fanout: Arc<StateBroadcaster>,
}

impl IngestPipeline {
    /// Pipeline over the shared store, scheduler, and fanout.
    #[must_use]
    pub fn new(
        topics: Arc<TopicMap>,
        store: Arc<StateStore>,
        decay: Arc<DecayScheduler>,
        fanout: Arc<StateBroadcaster>,
    ) -> Self {
        Self {
            topics,
            store,
            decay,
            fanout,
        }
    }

    /// Consume link events until the channel closes.
    pub async fn run(self, mut events: mpsc::Receiver<LinkEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_event(event);
        }
        tracing::debug!("transport event channel closed, ingestion stopped");
    }

    /// Process one transport event.
    pub fn handle_event(&self, event: LinkEvent) {
        match event {
            LinkEvent::Connected => self.link_transition(true),
            LinkEvent::Disconnected => self.link_transition(false),
            LinkEvent::Message { topic, payload } => self.handle_message(&topic, &payload),
        }
    }

    /// Decode one inbound message and merge it.
    ///
    /// Decoding never rejects a resolvable message: malformed numeric
    /// payloads degrade to `0.0`. Unknown topics are dropped with a
    /// diagnostic. Every accepted message produces exactly one merge and one
    /// broadcast.
    pub fn handle_message(&self, topic: &str, payload: &str) {
        let Some(kind) = self.topics.resolve(topic) else {
            tracing::debug!(topic, "dropping message for unknown topic");
            return;
        };

        let delta = match kind {
            TopicKind::Status(device) => StateDelta::actuator(device, payload == "1"),
            TopicKind::Continuous(sensor) => {
                StateDelta::continuous(sensor, decode_reading(sensor, payload))
            }
            TopicKind::Transient(sensor) => {
                // Transient fields only go true via transport; false comes
                // from decay. Anything but "1" is ignored.
                if payload != "1" {
                    tracing::debug!(topic, payload, "ignoring non-trigger transient payload");
                    return;
                }
                self.decay.arm(sensor);
                StateDelta::transient(sensor, true)
            }
        };

        let snapshot = self.store.merge_update(delta);
        tracing::debug!(topic, payload, "merged transport message");
        self.fanout.broadcast(StateEvent::DeviceUpdate(snapshot));
    }

    fn link_transition(&self, connected: bool) {
        self.store.merge_update(StateDelta::link(connected));
        tracing::info!(connected, "transport link transition");
        self.fanout.broadcast(StateEvent::LinkStatus { connected });
    }
}

/// Parse a continuous reading, degrading to `0.0` on anything unusable.
fn decode_reading(sensor: &str, payload: &str) -> f64 {
    match payload.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            tracing::warn!(sensor, payload, "malformed reading, substituting 0.0");
            0.0
        }
    }
}
