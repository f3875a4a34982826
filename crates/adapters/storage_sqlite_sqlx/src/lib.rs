//! # homelink-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the [`UserRepository`](homelink_app::ports::UserRepository)
//!   port
//! - Manage the `SQLite` connection pool lifecycle
//! - Run embedded migrations on startup
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `homelink-app` (port traits) and `homelink-domain` (domain
//! types). The `app` and `domain` crates must never reference this adapter.

pub mod error;
pub mod pool;
pub mod user_repo;

pub use error::StorageError;
pub use pool::{Config, Database};
pub use user_repo::SqliteUserRepository;
