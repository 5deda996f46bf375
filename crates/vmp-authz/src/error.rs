// crates/vmp-authz/src/error.rs
// ============================================================================
// Module: Authorization Errors
// Description: Error taxonomy for principal resolution and filter construction.
// Purpose: Give every authz failure a stable mapping onto vmp_core::ErrorKind.
// Dependencies: vmp-core, thiserror
// ============================================================================

use thiserror::Error;
use vmp_core::ErrorKind;
use vmp_core::VmpError;

/// Failures that can occur while resolving a bearer token into a [`crate::Principal`].
#[derive(Debug, Error)]
pub enum AuthzError {
    /// No session matches the presented token, or it is expired/revoked.
    #[error("session not found or no longer valid")]
    InvalidSession,
    /// The session's user account is inactive or soft-deleted.
    #[error("user account is not active")]
    InactiveUser,
    /// The underlying session or user store failed.
    #[error("authz backend error: {0}")]
    Backend(String),
}

impl From<AuthzError> for VmpError {
    fn from(err: AuthzError) -> Self {
        match &err {
            AuthzError::InvalidSession | AuthzError::InactiveUser => {
                VmpError::new(ErrorKind::Unauthenticated, err.to_string())
            }
            AuthzError::Backend(_) => VmpError::new(ErrorKind::Internal, err.to_string()),
        }
    }
}
