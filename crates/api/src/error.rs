use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use drivetree_services::oauth::OAuthError;
use drivetree_services::session::SessionError;
use serde::Serialize;
use tracing::{error, warn};

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        error!(error = %err, "Session store failure");
        ApiError::Internal("Session store unavailable".to_string())
    }
}

impl From<OAuthError> for ApiError {
    fn from(err: OAuthError) -> Self {
        warn!(error = %err, "Authorization failed");
        match err {
            OAuthError::StateMismatch => {
                ApiError::Unauthorized("Invalid OAuth state".to_string())
            }
            OAuthError::Denied(reason) => {
                ApiError::Unauthorized(format!("Authorization denied: {reason}"))
            }
            _ => ApiError::Unauthorized("Failed to authenticate with provider".to_string()),
        }
    }
}
