//! # homelink-adapter-mqtt
//!
//! MQTT transport adapter built on [rumqttc](https://docs.rs/rumqttc).
//!
//! ## Responsibilities
//! - Connect to the broker and keep the connection alive with exponential
//!   backoff
//! - Subscribe to every status and sensor topic, re-subscribing on each
//!   reconnect
//! - Surface connectivity transitions and inbound messages as discrete
//!   [`LinkEvent`](homelink_app::ports::LinkEvent)s on an mpsc channel
//! - Implement the [`CommandPublisher`](homelink_app::ports::CommandPublisher)
//!   port for outbound commands, reporting `LinkUnavailable` while down
//!
//! ## Dependency rule
//! Depends on `homelink-app` (port traits) and `homelink-domain`. The `app`
//! and `domain` crates must never reference this adapter.

pub mod config;
pub mod error;
pub mod link;

pub use config::MqttConfig;
pub use link::MqttLink;
