//! Error types and handling
//!
//! This module provides the error handling framework for the admin API.
//! All errors are converted to a consistent JSON response format.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request - invalid input (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Unauthorized - authentication required (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Forbidden - insufficient permissions (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Conflict - resource already exists or state conflict (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Unprocessable entity - validation failed (422)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Database error (500)
    #[error("Database error: {0}")]
    Database(String),
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        AppError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        AppError::Forbidden(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        AppError::Conflict(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::ValidationError(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal(message.into())
    }
}

/// Error response body
#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    /// Error type identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Additional error details (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Add details to the error response
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, should_log) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", false),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request", false),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized", false),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden", true),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict", false),
            AppError::ValidationError(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", false)
            }
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", true),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error", true),
        };

        if should_log {
            error!(error = %self, error_type = error_type, "Request error");
        }

        let body = ErrorResponse::new(error_type, self.to_string());

        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        // Repositories wrap sqlx errors in context; surface constraint failures properly
        if let Some(sqlx_err) = err.downcast_ref::<sqlx::Error>() {
            if let Some(mapped) = map_constraint_error(sqlx_err) {
                return mapped;
            }
        }
        if let Some(validation_err) = err.downcast_ref::<validator::ValidationErrors>() {
            return AppError::ValidationError(validation_err.to_string());
        }
        AppError::Internal(format!("{:#}", err))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(mapped) = map_constraint_error(&err) {
            return mapped;
        }
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".to_string()),
            _ => AppError::Database(err.to_string()),
        }
    }
}

fn map_constraint_error(err: &sqlx::Error) -> Option<AppError> {
    let sqlx::Error::Database(db_err) = err else {
        return None;
    };
    let message = db_err.message();
    if message.contains("UNIQUE constraint failed") {
        Some(AppError::Conflict("Resource already exists".to_string()))
    } else if message.contains("FOREIGN KEY constraint failed") {
        Some(AppError::ValidationError(
            "Referenced record does not exist".to_string(),
        ))
    } else if message.contains("CHECK constraint failed") {
        Some(AppError::ValidationError(format!(
            "Value rejected by storage constraint: {}",
            message
        )))
    } else {
        None
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(format!("JSON parsing error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
