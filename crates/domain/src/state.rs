//! Device state — the single shared snapshot fanned out to clients.
//!
//! Exactly one logical [`DeviceState`] exists per process. All mutation goes
//! through [`DeviceState::apply`], driven by the state store's serialized
//! merge operation; a clone of the struct is an immutable snapshot safe to
//! hand to any consumer without further synchronization.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::time::{Timestamp, now};
use crate::topics::TopicMap;

/// Sensor readings, split by decay semantics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SensorReadings {
    /// Continuously-valued sensors (temperature, humidity).
    pub continuous: BTreeMap<String, f64>,
    /// Transient booleans that auto-expire (motion).
    pub transient: BTreeMap<String, bool>,
}

/// Point-in-time state of the whole device fleet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceState {
    /// On/off state per actuator.
    pub actuators: BTreeMap<String, bool>,
    /// Latest sensor readings.
    pub sensors: SensorReadings,
    /// Whether the transport link is currently up.
    pub link_connected: bool,
    /// Time of the most recent accepted mutation.
    pub last_update: Timestamp,
}

impl DeviceState {
    /// All-false/zero state covering every field the topic map knows about.
    #[must_use]
    pub fn initial(topics: &TopicMap) -> Self {
        Self {
            actuators: topics
                .device_ids()
                .map(|id| (id.to_string(), false))
                .collect(),
            sensors: SensorReadings {
                continuous: topics
                    .continuous_ids()
                    .map(|id| (id.to_string(), 0.0))
                    .collect(),
                transient: topics
                    .transient_ids()
                    .map(|id| (id.to_string(), false))
                    .collect(),
            },
            link_connected: false,
            last_update: now(),
        }
    }

    /// Merge a partial update, field by field.
    ///
    /// Fields absent from `delta` are untouched; fields present override the
    /// current value. `last_update` is set to `at` unconditionally — every
    /// accepted merge counts as a mutation, whether transport- or
    /// decay-sourced.
    pub fn apply(&mut self, delta: &StateDelta, at: Timestamp) {
        for (id, on) in &delta.actuators {
            self.actuators.insert(id.clone(), *on);
        }
        for (id, value) in &delta.continuous {
            self.sensors.continuous.insert(id.clone(), *value);
        }
        for (id, active) in &delta.transient {
            self.sensors.transient.insert(id.clone(), *active);
        }
        if let Some(connected) = delta.link_connected {
            self.link_connected = connected;
        }
        self.last_update = at;
    }
}

/// A partial field set merged atomically into [`DeviceState`].
///
/// In practice every transport message and decay firing produces a
/// single-field delta, but the merge is defined field-by-field so composed
/// deltas behave the same way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateDelta {
    /// Actuator on/off writes.
    pub actuators: BTreeMap<String, bool>,
    /// Continuous sensor writes.
    pub continuous: BTreeMap<String, f64>,
    /// Transient sensor writes.
    pub transient: BTreeMap<String, bool>,
    /// Link connectivity write.
    pub link_connected: Option<bool>,
}

impl StateDelta {
    /// Delta setting one actuator.
    #[must_use]
    pub fn actuator(id: impl Into<String>, on: bool) -> Self {
        Self {
            actuators: BTreeMap::from([(id.into(), on)]),
            ..Self::default()
        }
    }

    /// Delta setting one continuous sensor reading.
    #[must_use]
    pub fn continuous(id: impl Into<String>, value: f64) -> Self {
        Self {
            continuous: BTreeMap::from([(id.into(), value)]),
            ..Self::default()
        }
    }

    /// Delta setting one transient sensor flag.
    #[must_use]
    pub fn transient(id: impl Into<String>, active: bool) -> Self {
        Self {
            transient: BTreeMap::from([(id.into(), active)]),
            ..Self::default()
        }
    }

    /// Delta setting link connectivity.
    #[must_use]
    pub fn link(connected: bool) -> Self {
        Self {
            link_connected: Some(connected),
            ..Self::default()
        }
    }

    /// Whether the delta writes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actuators.is_empty()
            && self.continuous.is_empty()
            && self.transient.is_empty()
            && self.link_connected.is_none()
    }
}
