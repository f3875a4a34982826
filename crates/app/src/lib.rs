//! # homelink-app
//!
//! Application layer — the device-state synchronization core plus **port
//! definitions** (traits).
//!
//! ## Responsibilities
//! - [`state_store`] — the serialized-access boundary around the single
//!   device-state snapshot
//! - [`ingest`] — decode inbound transport messages and fold them into the
//!   store
//! - [`decay`] — debounced auto-reset of transient sensor fields
//! - [`dispatch`] — validated, fire-and-forget actuator commands
//! - [`broadcast`] — fanout of snapshots to all real-time subscribers
//! - [`ports`] — traits adapters implement (transport publish, user storage)
//! - [`services`] — user management and the token-authentication collaborator
//!
//! ## Dependency rule
//! Depends on `homelink-domain`, `tokio::sync`/`tokio::time` for channels and
//! timers, and the credential crates (`bcrypt`, `jsonwebtoken`) for the
//! authentication collaborator. Never imports adapter crates; adapters depend
//! on *this* crate, not the reverse.

pub mod broadcast;
pub mod decay;
pub mod dispatch;
pub mod ingest;
pub mod ports;
pub mod services;
pub mod state_store;
