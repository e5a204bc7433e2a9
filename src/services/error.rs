//! Error handling utilities for route handlers

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Generic 500 response. Internal details are logged, never returned.
#[derive(Debug)]
pub struct InternalError;

impl IntoResponse for InternalError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Internal Server Error" })),
        )
            .into_response()
    }
}

/// Extension trait for logging errors and converting to an error response
pub trait LogErr<T> {
    /// Log error with context and return [`InternalError`]
    fn log_500(self, context: &str) -> Result<T, InternalError>;
}

impl<T, E: std::fmt::Display> LogErr<T> for Result<T, E> {
    fn log_500(self, context: &str) -> Result<T, InternalError> {
        self.map_err(|e| {
            tracing::error!(error = %e, "{}", context);
            InternalError
        })
    }
}
