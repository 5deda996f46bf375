// crates/vmp-core/src/error.rs
// ============================================================================
// Module: Error Taxonomy
// Description: Shared error kinds and the safe-to-display error envelope.
// Purpose: Give every crate in the workspace one vocabulary for failure.
// Dependencies: thiserror, serde
// ============================================================================

//! ## Overview
//! Every crate in the workspace surfaces failures through [`VmpError`],
//! tagged with an [`ErrorKind`] drawn from the fixed taxonomy. The kind
//! determines both the HTTP status the server maps it to and the retry
//! policy applied by callers; see `Docs/error-handling.md` in the original
//! design notes for the full propagation table.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Stable error classification shared across the whole platform.
///
/// # Invariants
/// - Variants are stable for programmatic handling and HTTP status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Caller could not be authenticated.
    Unauthenticated,
    /// Caller is authenticated but lacks a cross-tenant admin privilege.
    Forbidden,
    /// Resource does not exist, or exists but is out of the caller's scope.
    NotFound,
    /// Caller input failed validation.
    Validation,
    /// Request conflicts with existing state (duplicate, already used).
    Conflict,
    /// A precondition for the requested transition was not met.
    Precondition,
    /// Blob storage I/O failed.
    Storage,
    /// Audit-chain append or verification failed.
    Chain,
    /// A dependency timed out or is unavailable.
    Unavailable,
    /// Unexpected internal failure.
    Internal,
}

impl ErrorKind {
    /// Returns the conventional HTTP status code for this error kind.
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::Unauthenticated => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Precondition => 412,
            Self::Unavailable => 503,
            Self::Storage | Self::Chain | Self::Internal => 500,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::Validation => "VALIDATION",
            Self::Conflict => "CONFLICT",
            Self::Precondition => "PRECONDITION",
            Self::Storage => "STORAGE",
            Self::Chain => "CHAIN",
            Self::Unavailable => "UNAVAILABLE",
            Self::Internal => "INTERNAL",
        };
        f.write_str(label)
    }
}

/// Safe-to-display error returned across every service seam.
///
/// # Invariants
/// - `message` never contains a stack trace or internal path.
/// - `details`, when present, is safe to serialize directly to the caller.
#[derive(Debug, Error, Serialize)]
#[error("{kind}: {message}")]
pub struct VmpError {
    /// Stable error classification.
    pub kind: ErrorKind,
    /// Human-readable, caller-safe message.
    pub message: String,
    /// Optional structured detail fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl VmpError {
    /// Builds an error with no structured details.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    /// Builds an error carrying structured details.
    #[must_use]
    pub fn with_details(
        kind: ErrorKind,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            details: Some(details),
        }
    }

    /// Shorthand for [`ErrorKind::NotFound`].
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Shorthand for [`ErrorKind::Validation`].
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Shorthand for [`ErrorKind::Conflict`].
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Shorthand for [`ErrorKind::Precondition`].
    #[must_use]
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Precondition, message)
    }

    /// Shorthand for [`ErrorKind::Unauthenticated`].
    #[must_use]
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthenticated, message)
    }

    /// Shorthand for [`ErrorKind::Forbidden`].
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    /// Shorthand for [`ErrorKind::Internal`].
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        reason = "Test-only assertions."
    )]
    use super::*;

    #[test]
    fn http_status_mapping_matches_taxonomy() {
        assert_eq!(ErrorKind::Validation.http_status(), 400);
        assert_eq!(ErrorKind::Unauthenticated.http_status(), 401);
        assert_eq!(ErrorKind::Forbidden.http_status(), 403);
        assert_eq!(ErrorKind::NotFound.http_status(), 404);
        assert_eq!(ErrorKind::Conflict.http_status(), 409);
        assert_eq!(ErrorKind::Precondition.http_status(), 412);
        assert_eq!(ErrorKind::Unavailable.http_status(), 503);
        assert_eq!(ErrorKind::Internal.http_status(), 500);
    }

    #[test]
    fn details_are_omitted_when_absent() {
        let err = VmpError::not_found("case not found");
        let json = serde_json::to_value(&err).expect("serialize");
        assert!(json.get("details").is_none());
    }
}
