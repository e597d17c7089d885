//! Application error taxonomy and its HTTP mapping.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::domain::repositories::StoreError;
use crate::utils::url_validator::UrlValidationError;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Machine-readable error payload returned to clients.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

/// Errors returned by the shortener core and surfaced by the HTTP layer.
///
/// | Variant               | HTTP | Meaning                                   |
/// |-----------------------|------|-------------------------------------------|
/// | `InvalidInput`        | 400  | Empty or malformed URL, bad request body  |
/// | `CodeAlreadyExists`   | 400  | Custom code collides with a live mapping  |
/// | `NotFound`            | 404  | Unknown or expired short code             |
/// | `StorageFailure`      | 500  | Store unreachable or erroring             |
/// | `KeyspaceExhausted`   | 500  | Allocator retry cap exceeded              |
/// | `EntropyUnavailable`  | 500  | OS random source failed on every attempt  |
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    InvalidInput { message: String, details: Value },

    #[error("{message}")]
    CodeAlreadyExists { message: String, details: Value },

    #[error("{message}")]
    NotFound { message: String, details: Value },

    #[error("{message}")]
    StorageFailure { message: String, details: Value },

    #[error("{message}")]
    KeyspaceExhausted { message: String, details: Value },

    #[error("{message}")]
    EntropyUnavailable { message: String, details: Value },
}

impl AppError {
    pub fn invalid_input(message: impl Into<String>, details: Value) -> Self {
        Self::InvalidInput {
            message: message.into(),
            details,
        }
    }

    pub fn code_already_exists(code: &str) -> Self {
        Self::CodeAlreadyExists {
            message: "Short code already exists".to_string(),
            details: json!({ "code": code }),
        }
    }

    pub fn not_found(code: &str) -> Self {
        Self::NotFound {
            message: "URL not found".to_string(),
            details: json!({ "code": code }),
        }
    }

    /// Builds a storage failure without exposing backend error text.
    pub fn storage_failure() -> Self {
        Self::StorageFailure {
            message: "Storage backend unavailable".to_string(),
            details: json!({}),
        }
    }

    pub fn keyspace_exhausted(attempts: u32, max_length: usize) -> Self {
        Self::KeyspaceExhausted {
            message: "Failed to allocate a unique short code".to_string(),
            details: json!({ "attempts": attempts, "max_length": max_length }),
        }
    }

    pub fn entropy_unavailable(attempts: u32) -> Self {
        Self::EntropyUnavailable {
            message: "Secure random source unavailable".to_string(),
            details: json!({ "attempts": attempts }),
        }
    }

    fn parts(&self) -> (StatusCode, &'static str, &str, &Value) {
        match self {
            AppError::InvalidInput { message, details } => {
                (StatusCode::BAD_REQUEST, "invalid_input", message, details)
            }
            AppError::CodeAlreadyExists { message, details } => (
                StatusCode::BAD_REQUEST,
                "code_already_exists",
                message,
                details,
            ),
            AppError::NotFound { message, details } => {
                (StatusCode::NOT_FOUND, "not_found", message, details)
            }
            AppError::StorageFailure { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "storage_failure",
                message,
                details,
            ),
            AppError::KeyspaceExhausted { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "keyspace_exhausted",
                message,
                details,
            ),
            AppError::EntropyUnavailable { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "entropy_unavailable",
                message,
                details,
            ),
        }
    }

    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        self.parts().0
    }

    /// Converts the error into its client-facing payload.
    pub fn to_error_info(&self) -> ErrorInfo {
        let (_, code, message, details) = self.parts();
        ErrorInfo {
            code,
            message: message.to_string(),
            details: details.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (self.status(), Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(_: StoreError) -> Self {
        AppError::storage_failure()
    }
}

impl From<UrlValidationError> for AppError {
    fn from(e: UrlValidationError) -> Self {
        AppError::invalid_input(e.to_string(), json!({}))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        let details = serde_json::to_value(&e).unwrap_or_else(|_| json!({}));
        AppError::invalid_input("Request validation failed", details)
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::invalid_input("Invalid JSON body", json!({ "reason": e.body_text() }))
    }
}
