//! Shared store types for Fundline
//!
//! This module provides the common error type store adapters use to report
//! failures. Adapters normalize backend-specific failures (constraint
//! violations in particular) into [`StoreError`] so the service layer can
//! translate them into domain errors without knowing the backend.

use crate::error::Error;
use thiserror::Error;

/// Store-specific error types
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Record not found")]
    NotFound,

    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    #[error("Referential integrity violation: {0}")]
    ForeignKeyViolation(String),

    #[error("Database connection error: {0}")]
    Connection(sqlx::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db_err) => match db_err.kind() {
                sqlx::error::ErrorKind::UniqueViolation => {
                    StoreError::UniqueViolation(db_err.to_string())
                }
                sqlx::error::ErrorKind::ForeignKeyViolation => {
                    StoreError::ForeignKeyViolation(db_err.to_string())
                }
                _ => StoreError::Connection(err),
            },
            _ => StoreError::Connection(err),
        }
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Error::NotFound("record not found".to_string()),
            StoreError::UniqueViolation(msg) => Error::InvalidParameters(msg),
            StoreError::ForeignKeyViolation(msg) => Error::DataIntegrity(msg),
            StoreError::Connection(e) => Error::Database(e),
            StoreError::InvalidData(msg) => Error::InvalidParameters(msg),
        }
    }
}
