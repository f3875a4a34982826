//! Authentication endpoints.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use homelink_app::ports::{CommandPublisher, UserRepository};
use homelink_domain::user::Identity;

use crate::auth_extract::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for `POST /api/auth/login`.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response body carrying a freshly issued token.
#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: Identity,
}

/// `POST /api/auth/login`
pub async fn login<UR, CP>(
    State(state): State<AppState<UR, CP>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError>
where
    UR: UserRepository + Send + Sync + 'static,
    CP: CommandPublisher + Send + Sync + 'static,
{
    let (token, user) = state.auth_service.login(&req.username, &req.password).await?;
    Ok(Json(LoginResponse { token, user }))
}

/// `POST /api/auth/verify` — echo back the identity in a valid token.
pub async fn verify<UR, CP>(
    _state: State<AppState<UR, CP>>,
    AuthUser(identity): AuthUser,
) -> Json<Identity>
where
    UR: UserRepository + Send + Sync + 'static,
    CP: CommandPublisher + Send + Sync + 'static,
{
    Json(identity)
}

/// Response body for `POST /api/auth/logout`.
#[derive(Serialize)]
pub struct LogoutResponse {
    pub message: &'static str,
}

/// `POST /api/auth/logout`
///
/// Tokens are stateless, so logout is a client-side discard; the endpoint
/// exists for API symmetry.
pub async fn logout() -> Json<LogoutResponse> {
    Json(LogoutResponse {
        message: "logged out",
    })
}
