//! API error types and helpers.
//!
//! # Purpose
//! Centralizes HTTP error construction so every endpoint answers failures
//! with the same `{success: false, message}` body the console expects.
//!
//! # Notes
//! This is an internal facility tool: upstream dependency failures surface
//! their raw error text to the caller (an operational aid, not a security
//! concern), while still being logged server-side.
use crate::store::StoreError;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
}

/// Structured API error returned by handlers: an HTTP status paired with the
/// register's uniform JSON error body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                success: false,
                message: message.into(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// 400 Bad Request: the input failed validation before any persistence.
pub fn api_validation_error(message: &str) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, message)
}

/// 404 Not Found: unknown id/code, or a visit already checked out.
pub fn api_not_found(message: &str) -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, message)
}

/// 401 Unauthorized: the cron sweep's bearer secret is missing or wrong.
pub fn api_unauthorized(message: &str) -> ApiError {
    ApiError::new(StatusCode::UNAUTHORIZED, message)
}

/// 405 Method Not Allowed, keeping the JSON error shape.
pub fn api_method_not_allowed() -> ApiError {
    ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

/// 409 Conflict: a distinct failure for code-allocation exhaustion.
pub fn api_conflict(message: &str) -> ApiError {
    ApiError::new(StatusCode::CONFLICT, message)
}

/// 500 from a store failure. Logs the error and echoes its text to the
/// caller.
pub fn api_internal(context: &str, err: &StoreError) -> ApiError {
    tracing::error!(error = ?err, context, "ledger storage error");
    ApiError::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("{context}: {err}"),
    )
}

/// 500 without a store error attached.
pub fn api_internal_message(message: &str) -> ApiError {
    ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, message)
}
