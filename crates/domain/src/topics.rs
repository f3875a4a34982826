//! Topic map — the immutable universe of controllable and observable devices.
//!
//! Built once from configuration at startup; after that, every inbound topic
//! is resolved through a precomputed reverse index and every outbound command
//! is validated against the device table. Unknown ids are data errors
//! surfaced to the caller, never panics.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use crate::error::ValidationError;

/// Control/status topic pair for one actuator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeviceTopics {
    /// Topic commands are published to.
    pub control: String,
    /// Topic the device reports its state on.
    pub status: String,
}

/// What an inbound topic means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicKind<'a> {
    /// Actuator status report for the named device.
    Status(&'a str),
    /// Continuous sensor reading (temperature, humidity).
    Continuous(&'a str),
    /// Transient sensor trigger that auto-expires (motion).
    Transient(&'a str),
}

enum Target {
    Status(String),
    Continuous(String),
    Transient(String),
}

/// Immutable mapping between device/sensor ids and transport topics.
pub struct TopicMap {
    devices: BTreeMap<String, DeviceTopics>,
    continuous: BTreeMap<String, String>,
    transient: BTreeMap<String, String>,
    reverse: HashMap<String, Target>,
}

impl TopicMap {
    /// Build the map and its reverse index.
    ///
    /// Only status and sensor topics are indexed for inbound resolution;
    /// control topics are outbound-only.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyTopicMap`] when no devices and no
    /// sensors are configured.
    pub fn new(
        devices: BTreeMap<String, DeviceTopics>,
        continuous: BTreeMap<String, String>,
        transient: BTreeMap<String, String>,
    ) -> Result<Self, ValidationError> {
        if devices.is_empty() && continuous.is_empty() && transient.is_empty() {
            return Err(ValidationError::EmptyTopicMap);
        }

        let mut reverse = HashMap::new();
        for (id, topics) in &devices {
            reverse.insert(topics.status.clone(), Target::Status(id.clone()));
        }
        for (id, topic) in &continuous {
            reverse.insert(topic.clone(), Target::Continuous(id.clone()));
        }
        for (id, topic) in &transient {
            reverse.insert(topic.clone(), Target::Transient(id.clone()));
        }

        Ok(Self {
            devices,
            continuous,
            transient,
            reverse,
        })
    }

    /// Resolve an inbound topic to the field it feeds.
    #[must_use]
    pub fn resolve(&self, topic: &str) -> Option<TopicKind<'_>> {
        self.reverse.get(topic).map(|target| match target {
            Target::Status(id) => TopicKind::Status(id),
            Target::Continuous(id) => TopicKind::Continuous(id),
            Target::Transient(id) => TopicKind::Transient(id),
        })
    }

    /// Control topic for a device, if the device is known.
    #[must_use]
    pub fn control_topic(&self, device: &str) -> Option<&str> {
        self.devices.get(device).map(|t| t.control.as_str())
    }

    /// Whether the given actuator id is part of the map.
    #[must_use]
    pub fn contains_device(&self, device: &str) -> bool {
        self.devices.contains_key(device)
    }

    /// Ids of all actuators.
    pub fn device_ids(&self) -> impl Iterator<Item = &str> {
        self.devices.keys().map(String::as_str)
    }

    /// Ids of all continuous sensors.
    pub fn continuous_ids(&self) -> impl Iterator<Item = &str> {
        self.continuous.keys().map(String::as_str)
    }

    /// Ids of all transient sensors.
    pub fn transient_ids(&self) -> impl Iterator<Item = &str> {
        self.transient.keys().map(String::as_str)
    }

    /// Every topic the transport must subscribe to: all status topics plus
    /// all sensor topics. Control topics are excluded — they are publish-only.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<String> {
        self.devices
            .values()
            .map(|t| t.status.clone())
            .chain(self.continuous.values().cloned())
            .chain(self.transient.values().cloned())
            .collect()
    }
}
