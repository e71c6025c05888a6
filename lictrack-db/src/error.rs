//! Error types for the SQLite adapter.

use lictrack_store::RemoteError;
use thiserror::Error;

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

/// Errors that can occur in the SQLite adapter.
#[derive(Debug, Error)]
pub enum DbError {
    /// SQLite error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The connection mutex was poisoned by a panicking query.
    #[error("database connection poisoned")]
    Poisoned,

    /// The blocking task running the query did not complete.
    #[error("database task failed: {0}")]
    Task(String),
}

impl DbError {
    /// Returns true for UNIQUE, CHECK and NOT NULL violations.
    #[must_use]
    pub fn is_constraint(&self) -> bool {
        matches!(
            self,
            Self::Sqlite(rusqlite::Error::SqliteFailure(code, _))
                if code.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }
}

impl From<DbError> for RemoteError {
    fn from(e: DbError) -> Self {
        if e.is_constraint() {
            RemoteError::Constraint(e.to_string())
        } else {
            RemoteError::Connectivity(e.to_string())
        }
    }
}
