/// Error handling for the API server
///
/// A unified error type that maps to HTTP responses. Handlers return
/// `Result<T, ApiError>` which converts to the right status code.
///
/// # Example
///
/// ```
/// use linkstash_api::error::{ApiError, ApiResult};
/// use axum::Json;
///
/// async fn handler() -> ApiResult<Json<serde_json::Value>> {
///     Err(ApiError::NotFound("Link not found".to_string()))
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use linkstash_shared::auth::password::PasswordError;
use linkstash_shared::models::link::InvalidUrl;
use linkstash_shared::search::SearchError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400) - malformed URL, unknown format, bad query params
    BadRequest(String),

    /// Unauthorized (401) - uniform for all credential and token failures
    Unauthorized(String),

    /// Not found (404) - absent ids and foreign-owned ids are
    /// indistinguishable
    NotFound(String),

    /// Conflict (409) - duplicate username or tag name
    Conflict(String),

    /// Payload too large (413) - setting key/value bounds
    PayloadTooLarge(String),

    /// Unprocessable entity (422) - validation errors
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),

    /// Cascading tag delete partially failed (500); reports which links
    /// were deleted and which were not
    CascadeFailed {
        succeeded: Vec<i64>,
        failed: Vec<i64>,
    },
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,

    /// Link ids deleted before a cascade failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub succeeded: Option<Vec<i64>>,

    /// Link ids that could not be deleted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed: Option<Vec<i64>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::PayloadTooLarge(msg) => write!(f, "Payload too large: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::CascadeFailed { succeeded, failed } => write!(
                f,
                "Cascade failed: {} deleted, {} failed",
                succeeded.len(),
                failed.len()
            ),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Cascade failures carry extra payload fields
        if let ApiError::CascadeFailed { succeeded, failed } = self {
            let body = Json(ErrorResponse {
                error: "cascade_failed".to_string(),
                message: "Some links could not be deleted; the tag was kept".to_string(),
                details: None,
                succeeded: Some(succeeded),
                failed: Some(failed),
            });
            return (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
        }

        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "payload_too_large",
                msg,
                None,
            ),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            ApiError::CascadeFailed { .. } => unreachable!("handled above"),
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
            succeeded: None,
            failed: None,
        });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                // Check for unique constraint violations
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("username") {
                        return ApiError::Conflict("Username is already in use".to_string());
                    }
                    if constraint.contains("tags") {
                        return ApiError::Conflict(
                            "You already have a tag with that name".to_string(),
                        );
                    }
                    return ApiError::Conflict(format!("Constraint violation: {}", constraint));
                }

                // Other database errors are internal
                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

/// Convert URL parse errors to API errors
impl From<InvalidUrl> for ApiError {
    fn from(err: InvalidUrl) -> Self {
        ApiError::BadRequest(format!("Invalid URL: {}", err))
    }
}

/// Convert search errors to API errors
///
/// Only the synchronous search read path maps to a response; mirror writes
/// are handled by the background worker and never reach here.
impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        ApiError::InternalError(format!("Search error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("Link not found".to_string());
        assert_eq!(err.to_string(), "Not found: Link not found");
    }

    #[test]
    fn test_validation_error() {
        let errors = vec![ValidationErrorDetail {
            field: "username".to_string(),
            message: "Username too long".to_string(),
        }];

        let err = ApiError::ValidationError(errors);
        assert_eq!(err.to_string(), "Validation failed: 1 errors");
    }

    #[test]
    fn test_cascade_failed_display() {
        let err = ApiError::CascadeFailed {
            succeeded: vec![1, 2],
            failed: vec![3],
        };
        assert_eq!(err.to_string(), "Cascade failed: 2 deleted, 1 failed");
    }
}
