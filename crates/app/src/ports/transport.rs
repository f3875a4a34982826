//! Transport port — outbound command publishes and inbound link events.

use std::future::Future;

use homelink_domain::error::HomeLinkError;

/// A discrete event surfaced by the transport adapter.
///
/// Connectivity transitions arrive as events, not exceptions, so the state
/// store's `link_connected` flag can track live status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// The link came up (initially or after a drop).
    Connected,
    /// The link went down.
    Disconnected,
    /// One inbound message, in the order delivered by the underlying link.
    /// No cross-topic ordering is guaranteed.
    Message {
        topic: String,
        payload: String,
    },
}

/// Publishes command payloads to the transport.
pub trait CommandPublisher {
    /// Publish a UTF-8 text payload to `topic`.
    ///
    /// # Errors
    ///
    /// Returns [`HomeLinkError::LinkUnavailable`] when the link is down —
    /// reported to the caller, never thrown silently.
    fn publish(
        &self,
        topic: &str,
        payload: &str,
    ) -> impl Future<Output = Result<(), HomeLinkError>> + Send;
}

impl<T: CommandPublisher + Send + Sync> CommandPublisher for std::sync::Arc<T> {
    fn publish(
        &self,
        topic: &str,
        payload: &str,
    ) -> impl Future<Output = Result<(), HomeLinkError>> + Send {
        (**self).publish(topic, payload)
    }
}
