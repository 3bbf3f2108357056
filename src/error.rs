//! Error types for the circulation core

use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Already lent: {0}")]
    AlreadyLent(String),

    #[error("Not on loan: {0}")]
    NotOnLoan(String),

    #[error("Loan not found: {0}")]
    LoanNotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    /// Classify an insert failure: SQLite reports primary-key collisions as
    /// "UNIQUE constraint failed: <table>.<column>".
    pub(crate) fn from_insert(err: sqlx::Error, entity: &str, key: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.message().contains("UNIQUE constraint failed") {
                return AppError::DuplicateKey(format!("{entity} {key} already exists"));
            }
        }
        AppError::Database(err)
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::StorageUnavailable(err.to_string())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
