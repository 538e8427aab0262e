/// Unified error types for the homecam controller
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the controller and its record store
#[derive(Error, Debug)]
pub enum CamError {
    /// Malformed ID, over-long field, bad filter or sort specification
    #[error("Validation error: {0}")]
    Validation(String),

    /// Get/Update/Delete on an absent ID
    #[error("Not found: {0}")]
    NotFound(String),

    /// Insert of an ID that already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Embedded store failures (I/O, corruption, transaction errors)
    #[error("Storage error: {0}")]
    Storage(#[from] redb::Error),

    /// Stored document could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CamError {
    /// Shorthand used by field validators
    pub fn validation(message: impl Into<String>) -> Self {
        CamError::Validation(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, CamError::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CamError::NotFound(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, CamError::Conflict(_))
    }
}

impl From<redb::DatabaseError> for CamError {
    fn from(e: redb::DatabaseError) -> Self {
        CamError::Storage(e.into())
    }
}

impl From<redb::TransactionError> for CamError {
    fn from(e: redb::TransactionError) -> Self {
        CamError::Storage(e.into())
    }
}

impl From<redb::TableError> for CamError {
    fn from(e: redb::TableError) -> Self {
        CamError::Storage(e.into())
    }
}

impl From<redb::StorageError> for CamError {
    fn from(e: redb::StorageError) -> Self {
        CamError::Storage(e.into())
    }
}

impl From<redb::CommitError> for CamError {
    fn from(e: redb::CommitError) -> Self {
        CamError::Storage(e.into())
    }
}

/// JSON error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Convert CamError to HTTP response
impl IntoResponse for CamError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            CamError::Validation(_) => (
                StatusCode::BAD_REQUEST,
                "InvalidRequest",
                self.to_string(),
            ),
            CamError::Authentication(_) => (
                StatusCode::UNAUTHORIZED,
                "AuthenticationRequired",
                self.to_string(),
            ),
            CamError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                "NotFound",
                self.to_string(),
            ),
            CamError::Conflict(_) => (
                StatusCode::CONFLICT,
                "Conflict",
                self.to_string(),
            ),
            CamError::Storage(_)
            | CamError::Serialization(_)
            | CamError::Internal(_)
            | CamError::Io(_) => {
                tracing::error!("request failed: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "InternalServerError",
                    "Internal server error".to_string(), // Don't leak details
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for controller operations
pub type CamResult<T> = Result<T, CamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (CamError::validation("bad"), StatusCode::BAD_REQUEST),
            (CamError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (CamError::Conflict("x".into()), StatusCode::CONFLICT),
            (CamError::Authentication("x".into()), StatusCode::UNAUTHORIZED),
            (CamError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_kind_predicates() {
        assert!(CamError::validation("x").is_validation());
        assert!(CamError::NotFound("x".into()).is_not_found());
        assert!(CamError::Conflict("x".into()).is_conflict());
        assert!(!CamError::Internal("x".into()).is_validation());
    }
}
