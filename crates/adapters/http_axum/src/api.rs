//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod auth;
#[allow(clippy::missing_errors_doc)]
pub mod control;
pub mod sse;
#[allow(clippy::missing_errors_doc)]
pub mod status;
#[allow(clippy::missing_errors_doc)]
pub mod users;

use axum::Router;
use axum::routing::{delete, get, post, put};

use homelink_app::ports::{CommandPublisher, UserRepository};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<UR, CP>() -> Router<AppState<UR, CP>>
where
    UR: UserRepository + Send + Sync + 'static,
    CP: CommandPublisher + Send + Sync + 'static,
{
    Router::new()
        // Authentication
        .route("/auth/login", post(auth::login::<UR, CP>))
        .route("/auth/verify", post(auth::verify::<UR, CP>))
        .route("/auth/logout", post(auth::logout))
        // Device state
        .route("/status", get(status::get::<UR, CP>))
        .route("/control/{device}", post(control::send::<UR, CP>))
        // Real-time channel
        .route("/events/stream", get(sse::stream::<UR, CP>))
        // User management
        .route(
            "/users",
            get(users::list::<UR, CP>).post(users::create::<UR, CP>),
        )
        .route(
            "/users/{username}/password",
            put(users::change_password::<UR, CP>),
        )
        .route("/users/{username}", delete(users::remove::<UR, CP>))
}
