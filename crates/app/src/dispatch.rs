//! Command dispatcher — validated, fire-and-forget actuator commands.
//!
//! Acceptance by the transport is acknowledged immediately; actual actuation
//! is confirmed later, asynchronously, when the device reports on its status
//! topic and the ingestion pipeline folds it back in.

use std::sync::Arc;

use homelink_domain::command::CommandAck;
use homelink_domain::error::UnknownDeviceError;
use homelink_domain::topics::TopicMap;

use crate::ports::CommandPublisher;

/// Validates client commands against the topic map and publishes them.
pub struct CommandDispatcher<P> {
    topics: Arc<TopicMap>,
    publisher: P,
}

impl<P: CommandPublisher> CommandDispatcher<P> {
    /// Dispatcher publishing through the given transport handle.
    pub fn new(topics: Arc<TopicMap>, publisher: P) -> Self {
        Self { topics, publisher }
    }

    /// Whether `device` is part of the controllable universe.
    #[must_use]
    pub fn knows_device(&self, device: &str) -> bool {
        self.topics.contains_device(device)
    }

    /// Validate and publish one on/off command.
    ///
    /// Unknown device ids are rejected locally with zero publish attempts.
    /// A publish failure (link down) is folded into a failed ack rather than
    /// propagated — command delivery is best-effort by design.
    pub async fn dispatch(&self, device: &str, command: bool) -> CommandAck {
        let Some(topic) = self.topics.control_topic(device) else {
            tracing::warn!(device, "rejecting command for unknown device");
            let err = UnknownDeviceError {
                device: device.to_string(),
            };
            return CommandAck::rejected(device, command, err.to_string());
        };

        let payload = if command { "1" } else { "0" };
        match self.publisher.publish(topic, payload).await {
            Ok(()) => {
                tracing::info!(device, topic, payload, "command published");
                CommandAck::accepted(device, command)
            }
            Err(err) => {
                tracing::warn!(%err, device, topic, "command publish failed");
                CommandAck::rejected(device, command, err.to_string())
            }
        }
    }
}
