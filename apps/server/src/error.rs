//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Flow                                      │
//! │                                                                         │
//! │  till-core / till-store errors                                          │
//! │       │                                                                 │
//! │       ▼ From impls                                                      │
//! │  ApiError { code, message }                                             │
//! │       │                                                                 │
//! │       ▼ IntoResponse                                                    │
//! │  HTTP status + JSON body                                                │
//! │                                                                         │
//! │  Status mapping:                                                        │
//! │    VALIDATION_ERROR    → 400                                            │
//! │    INSUFFICIENT_STOCK  → 400                                            │
//! │    NOT_FOUND           → 404                                            │
//! │    STORAGE_ERROR       → 500                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Storage internals (SQL text, pool state) are logged at error level and
//! replaced with a generic message before they reach a client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use till_core::CoreError;
use till_store::StoreError;

/// API error returned from HTTP handlers.
///
/// ## Serialization
/// This is the body a client receives when a request fails:
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Product not found: 7b0c..."
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable message for display
    pub message: String,
}

/// Error codes for API responses.
///
/// Serialized as SCREAMING_SNAKE_CASE strings, e.g. `INSUFFICIENT_STOCK`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The requested resource does not exist (404)
    NotFound,

    /// Request input failed validation (400)
    ValidationError,

    /// A sale asked for more units than are available (400)
    InsufficientStock,

    /// A storage operation failed (500)
    StorageError,
}

impl ErrorCode {
    /// HTTP status this code maps to.
    fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::InsufficientStock => StatusCode::BAD_REQUEST,
            ErrorCode::StorageError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => ApiError::not_found(&entity, &id),

            StoreError::Domain(core) => core.into(),

            StoreError::ConstraintViolation(msg) => {
                tracing::error!("Constraint violation: {}", msg);
                ApiError::new(ErrorCode::StorageError, "Storage operation failed")
            }
            StoreError::ConnectionFailed(msg) => {
                tracing::error!("Database connection failed: {}", msg);
                ApiError::new(ErrorCode::StorageError, "Database unavailable")
            }
            StoreError::MigrationFailed(msg) => {
                tracing::error!("Migration failed: {}", msg);
                ApiError::new(ErrorCode::StorageError, "Storage operation failed")
            }
            StoreError::QueryFailed(msg) => {
                // Log the real error, return a generic message
                tracing::error!("Query failed: {}", msg);
                ApiError::new(ErrorCode::StorageError, "Storage operation failed")
            }
            StoreError::PoolExhausted => {
                tracing::error!("Connection pool exhausted");
                ApiError::new(ErrorCode::StorageError, "Database busy, try again")
            }
            StoreError::Internal(msg) => {
                tracing::error!("Internal storage error: {}", msg);
                ApiError::new(ErrorCode::StorageError, "Storage operation failed")
            }
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductsNotFound { ids } => ApiError::new(
                ErrorCode::NotFound,
                format!("Products not found: {}", ids.join(", ")),
            ),
            CoreError::InsufficientStock {
                name,
                available,
                requested,
                ..
            } => ApiError::new(
                ErrorCode::InsufficientStock,
                format!(
                    "Insufficient stock for '{}': available {}, requested {}",
                    name, available, requested
                ),
            ),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}
