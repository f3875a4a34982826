//! Transport-specific error type wrapping rumqttc errors.

use homelink_domain::error::HomeLinkError;

/// Errors originating from the MQTT transport layer.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// The link is down; no publish was attempted.
    #[error("mqtt link unavailable")]
    Unavailable,

    /// The client request channel rejected the publish.
    #[error("mqtt client error")]
    Client(#[from] rumqttc::ClientError),
}

impl From<LinkError> for HomeLinkError {
    fn from(_: LinkError) -> Self {
        // Both variants mean the same thing to callers: the command did not
        // reach the broker.
        Self::LinkUnavailable
    }
}
