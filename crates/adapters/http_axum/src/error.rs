//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use homelink_domain::error::{AuthRejectedError, HomeLinkError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps application errors to HTTP responses with appropriate status codes.
pub enum ApiError {
    /// An error from the application or domain layer.
    Domain(HomeLinkError),
    /// The caller is authenticated but lacks the required capability.
    Forbidden(&'static str),
    /// The request is well-formed JSON but semantically unacceptable.
    BadRequest(&'static str),
}

impl<E: Into<HomeLinkError>> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self::Domain(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Domain(err) => match err {
                HomeLinkError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
                HomeLinkError::UnknownDevice(err) => (StatusCode::BAD_REQUEST, err.to_string()),
                HomeLinkError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
                HomeLinkError::LinkUnavailable => (StatusCode::BAD_GATEWAY, err.to_string()),
                HomeLinkError::AuthRejected(rejection) => {
                    let status = match rejection {
                        AuthRejectedError::InvalidToken => StatusCode::FORBIDDEN,
                        AuthRejectedError::MissingToken | AuthRejectedError::BadCredentials => {
                            StatusCode::UNAUTHORIZED
                        }
                    };
                    (status, rejection.to_string())
                }
                HomeLinkError::Credential(err) | HomeLinkError::Storage(err) => {
                    tracing::error!(error = %err, "internal error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal server error".to_string(),
                    )
                }
            },
            Self::Forbidden(message) => (StatusCode::FORBIDDEN, (*message).to_string()),
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, (*message).to_string()),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
