// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Resource conflict: {0}")]
    Conflict(String),

    #[error("Strava API error: {0}")]
    StravaApi(String),

    #[error("OAuth2 token error: {0}")]
    Token(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable numeric code carried in the response body.
    pub fn code(&self) -> u32 {
        match self {
            AppError::BadRequest(_) => 400001,
            AppError::Unauthorized => 401001,
            AppError::NotFound(_) => 404001,
            AppError::Conflict(_) => 409001,
            AppError::Database(_) => 500001,
            AppError::Internal(_) => 500002,
            AppError::StravaApi(_) => 503001,
            AppError::Token(_) => 503002,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::StravaApi(_) | AppError::Token(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Whether the webhook sender is expected to redeliver after this error.
    pub fn is_retryable(&self) -> bool {
        self.status().is_server_error()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorResponse {
    code: u32,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            // Internal details stay in the logs, not in the response.
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                "database error".to_string()
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                "internal error".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorResponse {
            code: self.code(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_are_not_retryable() {
        assert!(!AppError::BadRequest("x".into()).is_retryable());
        assert!(!AppError::Conflict("x".into()).is_retryable());
        assert!(!AppError::NotFound("x".into()).is_retryable());
    }

    #[test]
    fn test_upstream_and_storage_errors_are_retryable() {
        assert!(AppError::StravaApi("down".into()).is_retryable());
        assert!(AppError::Token("miss".into()).is_retryable());
        assert!(AppError::Database("tx".into()).is_retryable());
    }

    #[test]
    fn test_stable_codes() {
        assert_eq!(AppError::BadRequest("x".into()).code(), 400001);
        assert_eq!(AppError::Conflict("x".into()).code(), 409001);
        assert_eq!(AppError::StravaApi("x".into()).code(), 503001);
        assert_eq!(AppError::Token("x".into()).code(), 503002);
    }
}
