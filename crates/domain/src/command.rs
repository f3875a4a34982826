//! Command acknowledgements.
//!
//! An ack reports *publish acceptance*, not confirmed actuation — the device
//! confirms asynchronously via its status topic.

use serde::Serialize;

/// Result of dispatching one actuator command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandAck {
    /// The targeted device id.
    pub device: String,
    /// The requested on/off state.
    pub command: bool,
    /// Whether the command was accepted for publication.
    pub success: bool,
    /// Failure description when `success` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommandAck {
    /// Ack for a command accepted onto the transport.
    #[must_use]
    pub fn accepted(device: impl Into<String>, command: bool) -> Self {
        Self {
            device: device.into(),
            command,
            success: true,
            error: None,
        }
    }

    /// Ack for a command rejected locally or by the transport.
    #[must_use]
    pub fn rejected(device: impl Into<String>, command: bool, error: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            command,
            success: false,
            error: Some(error.into()),
        }
    }
}
