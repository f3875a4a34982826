//! MQTT connection configuration.

use std::time::Duration;

use serde::Deserialize;

/// Broker connection settings, deserializable from the `[mqtt]` section of
/// the daemon configuration. Every field has a default so the section is
/// optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// Broker hostname or IP.
    pub host: String,
    /// Broker port.
    pub port: u16,
    /// Client identifier presented to the broker.
    pub client_id: String,
    /// Optional username for broker authentication.
    pub username: Option<String>,
    /// Optional password for broker authentication.
    pub password: Option<String>,
    /// Keep-alive interval in seconds.
    pub keep_alive_secs: u64,
    /// First reconnect delay after a drop, in seconds.
    pub reconnect_min_secs: u64,
    /// Reconnect delay cap, in seconds.
    pub reconnect_max_secs: u64,
    /// Capacity of the rumqttc request channel and the link event channel.
    pub channel_capacity: usize,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            client_id: "homelinkd".to_string(),
            username: None,
            password: None,
            keep_alive_secs: 60,
            reconnect_min_secs: 1,
            reconnect_max_secs: 60,
            channel_capacity: 64,
        }
    }
}

impl MqttConfig {
    /// Keep-alive as a [`Duration`].
    #[must_use]
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }

    /// First reconnect delay.
    #[must_use]
    pub fn reconnect_min(&self) -> Duration {
        Duration::from_secs(self.reconnect_min_secs)
    }

    /// Reconnect delay cap.
    #[must_use]
    pub fn reconnect_max(&self) -> Duration {
        Duration::from_secs(self.reconnect_max_secs)
    }
}
