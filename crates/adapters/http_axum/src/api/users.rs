//! Admin user-management endpoints.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use homelink_app::ports::{CommandPublisher, UserRepository};
use homelink_domain::user::{Role, User};

use crate::auth_extract::{AdminUser, AuthUser};
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for creating a user.
#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

/// Request body for replacing a password.
#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub new_password: String,
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<User>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// `GET /api/users` — admin only.
pub async fn list<UR, CP>(
    State(state): State<AppState<UR, CP>>,
    _admin: AdminUser,
) -> Result<Json<Vec<User>>, ApiError>
where
    UR: UserRepository + Send + Sync + 'static,
    CP: CommandPublisher + Send + Sync + 'static,
{
    let users = state.user_service.list_users().await?;
    Ok(Json(users))
}

/// `POST /api/users` — admin only.
pub async fn create<UR, CP>(
    State(state): State<AppState<UR, CP>>,
    _admin: AdminUser,
    Json(req): Json<CreateUserRequest>,
) -> Result<CreateResponse, ApiError>
where
    UR: UserRepository + Send + Sync + 'static,
    CP: CommandPublisher + Send + Sync + 'static,
{
    let user = state
        .user_service
        .create_user(&req.username, &req.password, req.role)
        .await?;
    Ok(CreateResponse::Created(Json(user)))
}

/// `PUT /api/users/{username}/password`
///
/// Users change their own password; admins change anyone's.
pub async fn change_password<UR, CP>(
    State(state): State<AppState<UR, CP>>,
    AuthUser(identity): AuthUser,
    Path(username): Path<String>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<StatusCode, ApiError>
where
    UR: UserRepository + Send + Sync + 'static,
    CP: CommandPublisher + Send + Sync + 'static,
{
    if !identity.role.is_admin() && identity.username != username {
        return Err(ApiError::Forbidden("access denied"));
    }
    state
        .user_service
        .change_password(&username, &req.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/users/{username}` — admin only, never oneself.
pub async fn remove<UR, CP>(
    State(state): State<AppState<UR, CP>>,
    AdminUser(identity): AdminUser,
    Path(username): Path<String>,
) -> Result<StatusCode, ApiError>
where
    UR: UserRepository + Send + Sync + 'static,
    CP: CommandPublisher + Send + Sync + 'static,
{
    if identity.username == username {
        return Err(ApiError::BadRequest("cannot delete your own account"));
    }
    state.user_service.delete_user(&username).await?;
    Ok(StatusCode::NO_CONTENT)
}
