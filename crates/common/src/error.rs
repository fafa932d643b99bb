//! Common error types and handling for Fundline

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Common result type
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Fundline application
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unexpected error: {0}")]
    Unexpected(#[from] anyhow::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Project not editable: {0}")]
    ProjectEditability(String),

    #[error("Milestone sequence violation: {0}")]
    MilestoneSequence(String),

    #[error("Data integrity violation: {0}")]
    DataIntegrity(String),

    #[error("Without permission: {0}")]
    WithoutPermission(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Permission failures always carry the same message, matching the
    /// single response body the API exposes for them.
    pub fn without_permission() -> Self {
        Error::WithoutPermission("without permission to perform this action".to_string())
    }

    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidParameters(_) => StatusCode::BAD_REQUEST,
            Error::ProjectEditability(_)
            | Error::MilestoneSequence(_)
            | Error::DataIntegrity(_) => StatusCode::CONFLICT,
            Error::WithoutPermission(_) => StatusCode::FORBIDDEN,
            Error::Unexpected(_) | Error::Database(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message surfaced in API response bodies. The `Display` impl carries a
    /// variant prefix for logs; clients only see the underlying message.
    pub fn message(&self) -> String {
        match self {
            Error::Unexpected(e) => e.to_string(),
            Error::Database(e) => e.to_string(),
            Error::NotFound(m)
            | Error::InvalidParameters(m)
            | Error::ProjectEditability(m)
            | Error::MilestoneSequence(m)
            | Error::DataIntegrity(m)
            | Error::WithoutPermission(m)
            | Error::Internal(m) => m.clone(),
        }
    }

    /// Get the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Unexpected(_) => "UNEXPECTED_ERROR",
            Error::Database(_) => "DATABASE_ERROR",
            Error::NotFound(_) => "NOT_FOUND",
            Error::InvalidParameters(_) => "INVALID_PARAMETERS",
            Error::ProjectEditability(_) => "PROJECT_NOT_EDITABLE",
            Error::MilestoneSequence(_) => "MILESTONE_SEQUENCE_VIOLATION",
            Error::DataIntegrity(_) => "DATA_INTEGRITY_VIOLATION",
            Error::WithoutPermission(_) => "WITHOUT_PERMISSION",
            Error::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        // Log internal errors with full context
        if matches!(status, StatusCode::INTERNAL_SERVER_ERROR) {
            tracing::error!(error = %self, "Internal server error");
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": self.message(),
            }
        }));

        (status, body).into_response()
    }
}
