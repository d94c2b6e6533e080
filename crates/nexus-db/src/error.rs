//! Database errors

use nexus_types::NexusError;
use thiserror::Error;

/// Database errors
#[derive(Error, Debug)]
pub enum DbError {
    /// SQLx error
    #[error("database error: {0}")]
    Sqlx(sqlx::Error),

    /// Record not found
    #[error("record not found")]
    NotFound,

    /// A unique constraint rejected the write
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Backend unavailable or refused the operation
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A stored value does not decode into its domain type
    #[error("invalid stored value: {0}")]
    InvalidData(#[from] NexusError),
}

impl DbError {
    /// Whether the error is a uniqueness violation on the given constraint
    pub fn is_unique_violation_on(&self, constraint: &str) -> bool {
        matches!(self, Self::UniqueViolation(c) if c == constraint)
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound,
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                Self::UniqueViolation(db_err.constraint().unwrap_or_default().to_string())
            }
            other => Self::Sqlx(other),
        }
    }
}

/// Result type for repository operations
pub type DbResult<T> = Result<T, DbError>;
