//! Error types for callqa-audit

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Conflict (409) - e.g., stage already in flight or record terminal
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),

    /// callqa-common error
    #[error("{0}")]
    Common(#[from] callqa_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            ApiError::Io(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "IO_ERROR",
                err.to_string(),
            ),
            ApiError::Other(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                err.to_string(),
            ),
            ApiError::Common(err) => return common_error_response(err),
        };

        error_body(status, error_code, message)
    }
}

/// Map shared errors onto API status codes
///
/// Structural errors (not-found, validation, state) indicate caller misuse
/// and surface directly; everything else is a 500.
fn common_error_response(err: callqa_common::Error) -> Response {
    use callqa_common::Error;

    let (status, error_code, message) = match err {
        Error::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
        Error::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
        Error::UnknownCategory(name) => (
            StatusCode::BAD_REQUEST,
            "UNKNOWN_CATEGORY",
            format!("Unknown rubric category: {name}"),
        ),
        Error::InvalidStateTransition { from, to } => (
            StatusCode::CONFLICT,
            "INVALID_STATE_TRANSITION",
            format!("Invalid state transition: {from} -> {to}"),
        ),
        Error::State(msg) => (StatusCode::CONFLICT, "STATE_ERROR", msg),
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            other.to_string(),
        ),
    };

    error_body(status, error_code, message)
}

fn error_body(status: StatusCode, error_code: &str, message: String) -> Response {
    let body = Json(json!({
        "error": {
            "code": error_code,
            "message": message,
        }
    }));

    (status, body).into_response()
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
