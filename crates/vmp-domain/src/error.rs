// crates/vmp-domain/src/error.rs
// ============================================================================
// Module: Domain Errors
// Description: Error taxonomy for every case-engine, tenant, and evidence
//              operation in vmp-domain.
// Purpose: Translate authz/storage/store failures and domain-level
//          precondition violations into the shared VmpError.
// Dependencies: thiserror, vmp-core, vmp-authz, vmp-storage, vmp-store-sqlite
// ============================================================================

use thiserror::Error;
use vmp_authz::AuthzError;
use vmp_core::ErrorKind;
use vmp_core::VmpError;
use vmp_storage::StorageError;
use vmp_store_sqlite::SqliteStoreError;

/// Failures surfaced by `vmp-domain` services.
///
/// # Invariants
/// - Every variant carries a caller-safe message; none wrap a raw
///   `rusqlite`/filesystem error message directly (those stay in the
///   wrapped [`SqliteStoreError`]/[`StorageError`], mapped at the
///   [`From<DomainError> for VmpError`] boundary).
#[derive(Debug, Error)]
pub enum DomainError {
    /// Caller input failed validation.
    #[error("{0}")]
    Validation(String),
    /// The requested row does not exist, or is outside the caller's scope.
    #[error("{0}")]
    NotFound(String),
    /// Request conflicts with existing state.
    #[error("{0}")]
    Conflict(String),
    /// A precondition for the requested transition was not met.
    #[error("{0}")]
    Precondition(String),
    /// Caller is authenticated but lacks the privilege for this action.
    #[error("{0}")]
    Forbidden(String),
    /// Password hashing or verification failed.
    #[error("password hashing error: {0}")]
    Hash(String),
    /// The authorization layer rejected the caller's session.
    #[error(transparent)]
    Authz(#[from] AuthzError),
    /// The storage gateway failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// The persistence layer failed.
    #[error(transparent)]
    Store(#[from] SqliteStoreError),
}

impl DomainError {
    /// Shorthand for [`DomainError::Validation`].
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Shorthand for [`DomainError::NotFound`].
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Shorthand for [`DomainError::Conflict`].
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Shorthand for [`DomainError::Precondition`].
    #[must_use]
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }

    /// Shorthand for [`DomainError::Forbidden`].
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }
}

impl From<DomainError> for VmpError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => VmpError::new(ErrorKind::Validation, msg),
            DomainError::NotFound(msg) => VmpError::new(ErrorKind::NotFound, msg),
            DomainError::Conflict(msg) => VmpError::new(ErrorKind::Conflict, msg),
            DomainError::Precondition(msg) => VmpError::new(ErrorKind::Precondition, msg),
            DomainError::Forbidden(msg) => VmpError::new(ErrorKind::Forbidden, msg),
            DomainError::Hash(msg) => VmpError::new(ErrorKind::Internal, format!("password hashing error: {msg}")),
            DomainError::Authz(inner) => VmpError::from(inner),
            DomainError::Storage(inner) => {
                let kind = match &inner {
                    StorageError::NotFound(_) => ErrorKind::NotFound,
                    StorageError::TooLarge { .. } => ErrorKind::Validation,
                    StorageError::Backend(_) => ErrorKind::Storage,
                };
                VmpError::new(kind, inner.to_string())
            }
            DomainError::Store(inner) => VmpError::from(inner),
        }
    }
}
