//! # homelink-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the **REST control surface**: login/verify, current snapshot,
//!   actuator commands, and admin user management
//! - Serve the **real-time channel** as Server-Sent Events with the
//!   `device-update` / `mqtt-status` event names, including late-join
//!   catch-up frames
//! - Gate every non-public route behind the bearer-token extractor
//! - Map application results and errors into HTTP responses
//!
//! ## Dependency rule
//! Depends on `homelink-app` (services and port traits) and
//! `homelink-domain` (types used in request/response mapping). Never leaks
//! axum types into the domain.

pub mod api;
pub mod auth_extract;
pub mod error;
pub mod router;
pub mod state;
