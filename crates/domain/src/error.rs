//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`HomeLinkError`] via `#[from]` or an explicit `From` impl. Every variant
//! is recoverable and local; nothing here is fatal to the process.

/// Top-level error for homelink operations.
#[derive(Debug, thiserror::Error)]
pub enum HomeLinkError {
    /// A transport publish was attempted while the link is down.
    #[error("transport link unavailable")]
    LinkUnavailable,

    /// A command or topic referenced a device outside the topic map.
    #[error(transparent)]
    UnknownDevice(#[from] UnknownDeviceError),

    /// Invalid or missing credential at connection or request time.
    #[error(transparent)]
    AuthRejected(#[from] AuthRejectedError),

    /// A domain invariant was violated.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A referenced record does not exist.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// Failure hashing or signing credential material.
    #[error("credential processing error")]
    Credential(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Failure in the persistence layer.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A device id that the topic map does not know about.
///
/// The display string is the exact text reported to clients in failed
/// command acknowledgements.
#[derive(Debug, thiserror::Error)]
#[error("Unknown device")]
pub struct UnknownDeviceError {
    /// The rejected device id.
    pub device: String,
}

/// Why a credential was rejected.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum AuthRejectedError {
    /// No token was presented.
    #[error("no token provided")]
    MissingToken,
    /// The token failed signature or expiry checks.
    #[error("invalid or expired token")]
    InvalidToken,
    /// Username/password pair did not match a stored user.
    #[error("invalid username or password")]
    BadCredentials,
}

/// Domain invariant violations.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A username must be non-empty.
    #[error("username must not be empty")]
    EmptyUsername,
    /// A password must be non-empty.
    #[error("password must not be empty")]
    EmptyPassword,
    /// Usernames are unique.
    #[error("username already exists")]
    DuplicateUsername,
    /// The topic map must describe at least one device or sensor.
    #[error("topic map must not be empty")]
    EmptyTopicMap,
}

/// A lookup that found nothing.
#[derive(Debug, thiserror::Error)]
#[error("{entity} not found: {id}")]
pub struct NotFoundError {
    /// Kind of record (e.g. `"User"`).
    pub entity: &'static str,
    /// The id that missed.
    pub id: String,
}
