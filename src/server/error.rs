use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::AuthError;

/// JSON error body: `{"error": "<code>", "message": "<human text>"}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

/// Error returned by handlers.
#[derive(Debug)]
pub enum ApiError {
    Unauthorized(&'static str, String),
    Forbidden(String),
    BadRequest(String),
    NotFound(&'static str),
    Conflict(String),
    Unavailable(String),
}

impl ApiError {
    pub fn missing_auth() -> Self {
        ApiError::Unauthorized("missing_auth", "Authorization header required".to_string())
    }

    pub fn invalid_auth() -> Self {
        ApiError::Unauthorized(
            "invalid_auth",
            "Authorization header must use Bearer scheme".to_string(),
        )
    }

    pub fn invalid_token() -> Self {
        ApiError::Unauthorized("invalid_token", "Session expired or invalid".to_string())
    }

    pub fn admin_only() -> Self {
        ApiError::Forbidden("Admin access required".to_string())
    }

    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::Unauthorized(code, message) => {
                (StatusCode::UNAUTHORIZED, *code, message.clone())
            }
            ApiError::Forbidden(message) => (StatusCode::FORBIDDEN, "forbidden", message.clone()),
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, "validation_error", message.clone())
            }
            ApiError::NotFound(what) => {
                (StatusCode::NOT_FOUND, "not_found", format!("{} not found", what))
            }
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message.clone()),
            ApiError::Unavailable(message) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "unavailable",
                message.clone(),
            ),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (status, _, message) = self.parts();
        write!(f, "{}: {}", status, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        if status.is_server_error() {
            tracing::error!("{}", message);
        }
        (
            status,
            Json(ErrorBody {
                error: code.to_string(),
                message,
            }),
        )
            .into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => {
                ApiError::Unauthorized("invalid_credentials", e.to_string())
            }
            AuthError::DuplicateUsername(_) => ApiError::Conflict(e.to_string()),
            AuthError::Validation(message) => ApiError::BadRequest(message),
            AuthError::NotFound => ApiError::NotFound("Record"),
            AuthError::Denied(message) => ApiError::Forbidden(message),
            AuthError::Transport(message) | AuthError::Storage(message) => {
                ApiError::Unavailable(message)
            }
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        AuthError::from(e).into()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
