/// Unified error types for the Clinia service
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the service
#[derive(Error, Debug)]
pub enum AppError {
    /// Referenced account, pending signup, or history entry is absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Uniqueness violation on username or email
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Malformed email address
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Bad login, or bad username/token pair
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    /// Confirmation window elapsed
    #[error("Expired: {0}")]
    Expired(String),

    /// Admin targets their own account for delete/demote
    #[error("Forbidden self-action: {0}")]
    SelfActionForbidden(String),

    /// Caller lacks the admin role for this operation
    #[error("Not authorized: {0}")]
    Forbidden(String),

    /// Per-account prediction limit reached
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Unparseable store document
    #[error("Corrupt data in collection '{0}'")]
    CorruptData(String),

    /// Mail dispatch or report generation failed
    #[error("Collaborator failure: {0}")]
    Collaborator(String),

    /// Request or configuration validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Convert AppError to HTTP response
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound", self.to_string()),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "Conflict", self.to_string()),
            AppError::InvalidFormat(_) => {
                (StatusCode::BAD_REQUEST, "InvalidFormat", self.to_string())
            }
            AppError::InvalidCredential(_) => (
                StatusCode::UNAUTHORIZED,
                "InvalidCredential",
                self.to_string(),
            ),
            AppError::Expired(_) => (StatusCode::GONE, "Expired", self.to_string()),
            AppError::SelfActionForbidden(_) => (
                StatusCode::FORBIDDEN,
                "SelfActionForbidden",
                self.to_string(),
            ),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "Forbidden", self.to_string()),
            AppError::QuotaExceeded(_) => (
                StatusCode::TOO_MANY_REQUESTS,
                "QuotaExceeded",
                self.to_string(),
            ),
            AppError::Collaborator(_) => (
                StatusCode::BAD_GATEWAY,
                "CollaboratorFailure",
                self.to_string(),
            ),
            AppError::Validation(_) => {
                (StatusCode::BAD_REQUEST, "InvalidRequest", self.to_string())
            }
            AppError::CorruptData(_) | AppError::Io(_) | AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalServerError",
                "Internal server error".to_string(), // Don't leak details
            ),
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for service operations
pub type AppResult<T> = Result<T, AppError>;
