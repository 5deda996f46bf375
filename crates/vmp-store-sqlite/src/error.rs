// crates/vmp-store-sqlite/src/error.rs
// ============================================================================
// Module: Store Errors
// Description: Error taxonomy for the SQLite-backed persistence layer.
// Purpose: Translate rusqlite and schema failures into the shared VmpError.
// Dependencies: rusqlite, thiserror, vmp-core
// ============================================================================

use thiserror::Error;
use vmp_core::ErrorKind;
use vmp_core::VmpError;

/// Failures from the SQLite store.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// The database file could not be opened or its directory created.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// A `SQLite` engine error occurred.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// A unique constraint was violated.
    #[error("sqlite store conflict: {0}")]
    Conflict(String),
    /// The requested row does not exist.
    #[error("sqlite store row not found: {0}")]
    NotFound(String),
    /// A row violated an application-level invariant (bad enum label, etc).
    #[error("sqlite store data invalid: {0}")]
    Invalid(String),
}

impl From<rusqlite::Error> for SqliteStoreError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(sqlite_err, _) = &err
            && sqlite_err.code == rusqlite::ErrorCode::ConstraintViolation
        {
            return SqliteStoreError::Conflict(err.to_string());
        }
        SqliteStoreError::Db(err.to_string())
    }
}

impl From<SqliteStoreError> for VmpError {
    fn from(err: SqliteStoreError) -> Self {
        match &err {
            SqliteStoreError::Io(_) | SqliteStoreError::Db(_) => {
                VmpError::new(ErrorKind::Unavailable, err.to_string())
            }
            SqliteStoreError::Conflict(_) => VmpError::new(ErrorKind::Conflict, err.to_string()),
            SqliteStoreError::NotFound(_) => VmpError::new(ErrorKind::NotFound, err.to_string()),
            SqliteStoreError::Invalid(_) => VmpError::new(ErrorKind::Internal, err.to_string()),
        }
    }
}
