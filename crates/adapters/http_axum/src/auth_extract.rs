//! Bearer-token extractors gating the protected routes.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use homelink_app::ports::{CommandPublisher, UserRepository};
use homelink_domain::error::AuthRejectedError;
use homelink_domain::user::Identity;

use crate::error::ApiError;
use crate::state::AppState;

/// An authenticated caller. Rejects the request with 401/403 when the token
/// is missing or invalid; no state is mutated on rejection.
pub struct AuthUser(pub Identity);

/// An authenticated caller holding the admin capability.
pub struct AdminUser(pub Identity);

/// Pull the token from the `Authorization: Bearer …` header, falling back
/// to a `token` query parameter — `EventSource` cannot set headers, so the
/// SSE route authenticates via the query string.
fn token_from(parts: &Parts) -> Option<String> {
    let header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string);
    if header.is_some() {
        return header;
    }

    parts.uri.query().and_then(|query| {
        query.split('&').find_map(|pair| {
            pair.strip_prefix("token=")
                .map(str::to_string)
                .filter(|token| !token.is_empty())
        })
    })
}

impl<UR, CP> FromRequestParts<AppState<UR, CP>> for AuthUser
where
    UR: UserRepository + Send + Sync + 'static,
    CP: CommandPublisher + Send + Sync + 'static,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<UR, CP>,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from(parts).ok_or(AuthRejectedError::MissingToken)?;
        let identity = state.auth_service.verify(&token)?;
        Ok(Self(identity))
    }
}

impl<UR, CP> FromRequestParts<AppState<UR, CP>> for AdminUser
where
    UR: UserRepository + Send + Sync + 'static,
    CP: CommandPublisher + Send + Sync + 'static,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<UR, CP>,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(identity) = AuthUser::from_request_parts(parts, state).await?;
        if !identity.role.is_admin() {
            return Err(ApiError::Forbidden("admin access required"));
        }
        Ok(Self(identity))
    }
}
