//! Application services for the supporting (non-core) surfaces.

pub mod auth_service;
pub mod user_service;
