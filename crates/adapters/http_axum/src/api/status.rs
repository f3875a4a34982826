//! Polling read of the current device-state snapshot.

use axum::Json;
use axum::extract::State;

use homelink_app::ports::{CommandPublisher, UserRepository};
use homelink_domain::state::DeviceState;

use crate::auth_extract::AuthUser;
use crate::state::AppState;

/// `GET /api/status` — the current snapshot as JSON.
///
/// The snapshot is taken atomically by the state store; it never mixes
/// fields from two different merges.
pub async fn get<UR, CP>(
    State(state): State<AppState<UR, CP>>,
    _user: AuthUser,
) -> Json<DeviceState>
where
    UR: UserRepository + Send + Sync + 'static,
    CP: CommandPublisher + Send + Sync + 'static,
{
    Json(state.store.snapshot())
}
