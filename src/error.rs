//! Error types for Vestibule
//!
//! All errors in the application are converted to `AppError`,
//! which implements `IntoResponse` for proper HTTP error responses.
//!
//! Authentication failures are deliberately *not* part of this taxonomy:
//! they travel as data (`auth::AuthenticationOutcome`) and end up as a
//! translated flash notification, never as a raw technical error.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Application-wide error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found (404)
    #[error("Resource not found")]
    NotFound,

    /// Authentication required (401)
    #[error("Authentication required")]
    Unauthorized,

    /// The current request cannot carry a navigation instruction (400)
    ///
    /// Raised by the presenter when the client cannot be redirected,
    /// e.g. a request that only accepts `application/json`. The login
    /// flow propagates it unchanged.
    #[error("Unsupported request type: {0}")]
    UnsupportedRequestType(String),

    /// Validation error (400)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Translation label lookup failed (500)
    #[error("Translation error: {0}")]
    Translation(String),

    /// Stored credential material is unusable (500)
    ///
    /// A malformed password hash is an operator problem, not a wrong
    /// password; it must never surface as an authentication failure.
    #[error("Credential error: {0}")]
    Credential(String),

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Signing/verification key error (500)
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl IntoResponse for AppError {
    /// Convert error to HTTP response
    ///
    /// Maps each error variant to appropriate HTTP status code
    /// and JSON error body.
    fn into_response(self) -> Response {
        use axum::Json;

        let (status, error_message, error_type) = match &self {
            AppError::NotFound => (StatusCode::NOT_FOUND, self.to_string(), "not_found"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string(), "unauthorized"),
            AppError::UnsupportedRequestType(_) => (
                StatusCode::BAD_REQUEST,
                self.to_string(),
                "unsupported_request_type",
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone(), "validation"),
            AppError::Translation(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone(), "translation")
            }
            AppError::Credential(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Credential error".to_string(),
                "credential",
            ),
            AppError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone(), "config"),
            AppError::Encryption(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone(), "encryption")
            }
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                "internal",
            ),
        };

        // Record error metric
        use crate::metrics::ERRORS_TOTAL;
        ERRORS_TOTAL
            .with_label_values(&[error_type, "unknown"])
            .inc();

        let body = Json(serde_json::json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
