//! Actuator command endpoint.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use homelink_app::ports::{CommandPublisher, UserRepository};
use homelink_domain::command::CommandAck;

use crate::auth_extract::AuthUser;
use crate::state::AppState;

/// Request body for `POST /api/control/{device}`.
#[derive(Deserialize)]
pub struct ControlRequest {
    /// Desired on/off state.
    pub command: bool,
}

/// Possible responses from the control endpoint. The ack body is returned
/// in every case so clients always learn the outcome shape they expect.
pub enum ControlResponse {
    /// Command accepted onto the transport.
    Sent(Json<CommandAck>),
    /// Device id outside the topic map; nothing was published.
    UnknownDevice(Json<CommandAck>),
    /// The transport link is down.
    LinkDown(Json<CommandAck>),
}

impl IntoResponse for ControlResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Sent(json) => json.into_response(),
            Self::UnknownDevice(json) => (StatusCode::BAD_REQUEST, json).into_response(),
            Self::LinkDown(json) => (StatusCode::BAD_GATEWAY, json).into_response(),
        }
    }
}

/// `POST /api/control/{device}`
///
/// Success acknowledges *publish acceptance*, not confirmed actuation —
/// confirmation arrives asynchronously through the status topic and shows
/// up in later snapshots.
pub async fn send<UR, CP>(
    State(state): State<AppState<UR, CP>>,
    _user: AuthUser,
    Path(device): Path<String>,
    Json(req): Json<ControlRequest>,
) -> ControlResponse
where
    UR: UserRepository + Send + Sync + 'static,
    CP: CommandPublisher + Send + Sync + 'static,
{
    let known = state.dispatcher.knows_device(&device);
    let ack = state.dispatcher.dispatch(&device, req.command).await;

    if ack.success {
        ControlResponse::Sent(Json(ack))
    } else if known {
        ControlResponse::LinkDown(Json(ack))
    } else {
        ControlResponse::UnknownDevice(Json(ack))
    }
}
