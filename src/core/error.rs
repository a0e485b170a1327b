//! Error type system for DGH Care
//!
//! This module provides the single error type used across the backend with:
//! - Classification into validation, auth, not-found, conflict and persistence errors
//! - HTTP status code mapping
//! - JSON error responses carrying a trace ID

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Main error type for the DGH Care backend
#[derive(Debug, thiserror::Error)]
pub enum CareError {
    // System-level errors
    #[error("System initialization failed: {0}")]
    InitializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Persistence errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    PoolError(#[from] r2d2::Error),

    #[error("Task error: {0}")]
    TaskError(String),

    // API-related errors
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("{0}")]
    AuthenticationError(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // I/O errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Network error: {0}")]
    NetworkError(String),
}

impl CareError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            CareError::InvalidRequest(_) | CareError::ValidationError(_) => {
                StatusCode::BAD_REQUEST
            }

            // 401 Unauthorized
            CareError::AuthenticationError(_) => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            CareError::PermissionDenied(_) => StatusCode::FORBIDDEN,

            // 404 Not Found
            CareError::NotFound(_) => StatusCode::NOT_FOUND,

            // 409 Conflict
            CareError::Conflict(_) => StatusCode::CONFLICT,

            // 500 Internal Server Error
            CareError::InitializationError(_)
            | CareError::ConfigError(_)
            | CareError::DatabaseError(_)
            | CareError::PoolError(_)
            | CareError::TaskError(_)
            | CareError::IoError(_)
            | CareError::NetworkError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type name for API responses
    pub fn error_type(&self) -> &'static str {
        match self {
            CareError::InitializationError(_) => "InitializationError",
            CareError::ConfigError(_) => "ConfigError",
            CareError::DatabaseError(_) | CareError::PoolError(_) | CareError::TaskError(_) => {
                "PersistenceError"
            }
            CareError::InvalidRequest(_) | CareError::ValidationError(_) => "ValidationError",
            CareError::AuthenticationError(_) => "AuthError",
            CareError::PermissionDenied(_) => "PermissionDenied",
            CareError::NotFound(_) => "NotFoundError",
            CareError::Conflict(_) => "ConflictError",
            CareError::IoError(_) => "IoError",
            CareError::NetworkError(_) => "NetworkError",
        }
    }

    /// Message safe to return to the client.
    ///
    /// Internal failures are reported generically; their details only go to the log.
    pub fn public_message(&self) -> String {
        if self.status_code().is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        }
    }
}

// Extractor rejections are client input errors and use the common error body.
impl From<JsonRejection> for CareError {
    fn from(rejection: JsonRejection) -> Self {
        CareError::ValidationError(rejection.body_text())
    }
}

impl From<PathRejection> for CareError {
    fn from(rejection: PathRejection) -> Self {
        CareError::ValidationError(rejection.body_text())
    }
}

impl From<QueryRejection> for CareError {
    fn from(rejection: QueryRejection) -> Self {
        CareError::ValidationError(rejection.body_text())
    }
}

/// Error response structure for API endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error type identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Unique trace ID for this error
    pub trace_id: String,
}

impl ErrorResponse {
    /// Create a new error response with a generated trace ID
    pub fn new(error: String, message: String) -> Self {
        Self {
            error,
            message,
            trace_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an error response from a CareError
    pub fn from_error(error: &CareError) -> Self {
        Self::new(error.error_type().to_string(), error.public_message())
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} (trace_id: {})",
            self.error, self.message, self.trace_id
        )
    }
}

/// Implement IntoResponse for CareError to enable automatic error handling in Axum
impl IntoResponse for CareError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let error_response = ErrorResponse::from_error(&self);

        if status_code.is_server_error() {
            tracing::error!(
                error_type = self.error_type(),
                trace_id = %error_response.trace_id,
                status_code = %status_code,
                "Request failed: {}",
                self
            );
        } else {
            tracing::warn!(
                error_type = self.error_type(),
                trace_id = %error_response.trace_id,
                status_code = %status_code,
                "Request rejected: {}",
                self
            );
        }

        let mut response = (status_code, Json(error_response)).into_response();
        if status_code == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// Result type alias for operations that can fail with CareError
pub type Result<T> = std::result::Result<T, CareError>;

/// Context extension trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context to an error using a closure
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::fmt::Display,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let context_str = context.into();
            CareError::InitializationError(format!("{}: {}", context_str, e))
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let context_str = f();
            CareError::InitializationError(format!("{}: {}", context_str, e))
        })
    }
}
