// crates/vmp-storage/src/gateway.rs
// ============================================================================
// Module: Storage Gateway
// Description: The Put/GetSignedURL contract every evidence blob flows through.
// Purpose: Keep evidence storage swappable (S3 in production, in-memory for
//          tests) behind one narrow, async trait.
// Dependencies: async-trait
// ============================================================================

//! ## Overview
//! `vmp-domain`'s evidence service never touches an S3 client directly; it
//! depends only on [`StorageGateway`]. Object keys are treated as opaque,
//! already-sanitized strings (see `vmp_core::domain::evidence::build_storage_key`);
//! this trait does not re-validate them.

use async_trait::async_trait;
use thiserror::Error;

/// Maximum signed-URL lifetime the gateway will honor, per the storage contract.
pub const MAX_SIGNED_URL_TTL_SECONDS: u64 = 24 * 60 * 60;
/// Default signed-URL lifetime when a caller does not specify one.
pub const DEFAULT_SIGNED_URL_TTL_SECONDS: u64 = 60 * 60;

/// Failures from the storage gateway.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend rejected the request (network, auth, bucket policy).
    #[error("storage backend error: {0}")]
    Backend(String),
    /// No object exists at the given key.
    #[error("object not found: {0}")]
    NotFound(String),
    /// The requested object exceeded a caller-supplied size limit.
    #[error("object too large: {key} ({actual_bytes} > {max_bytes})")]
    TooLarge {
        key: String,
        max_bytes: u64,
        actual_bytes: u64,
    },
}

/// Clamps a requested TTL to `(0, MAX_SIGNED_URL_TTL_SECONDS]`, substituting
/// [`DEFAULT_SIGNED_URL_TTL_SECONDS`] for a zero or absent request.
#[must_use]
pub fn clamp_ttl_seconds(requested: Option<u64>) -> u64 {
    match requested {
        None | Some(0) => DEFAULT_SIGNED_URL_TTL_SECONDS,
        Some(ttl) => ttl.min(MAX_SIGNED_URL_TTL_SECONDS),
    }
}

/// The storage backend contract: put an object, and mint a time-bounded
/// signed URL to read it back.
///
/// # Invariants
/// - `put` is idempotent: writing the same key twice overwrites, it never
///   errors on "already exists".
/// - `signed_url`'s returned URL must not remain valid past `ttl_seconds`
///   (clamped via [`clamp_ttl_seconds`] by callers before reaching this trait).
#[async_trait]
pub trait StorageGateway: Send + Sync {
    /// Uploads `bytes` to `key`, overwriting any existing object there.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), StorageError>;

    /// Mints a signed URL valid for `ttl_seconds`, already clamped by the caller.
    async fn signed_url(&self, key: &str, ttl_seconds: u64) -> Result<String, StorageError>;
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
    fn absent_ttl_uses_default() {
        assert_eq!(clamp_ttl_seconds(None), DEFAULT_SIGNED_URL_TTL_SECONDS);
    }

    #[test]
    fn zero_ttl_uses_default() {
        assert_eq!(clamp_ttl_seconds(Some(0)), DEFAULT_SIGNED_URL_TTL_SECONDS);
    }

    #[test]
    fn oversized_ttl_is_clamped_to_24_hours() {
        assert_eq!(clamp_ttl_seconds(Some(999_999)), MAX_SIGNED_URL_TTL_SECONDS);
    }

    #[test]
    fn in_range_ttl_passes_through() {
        assert_eq!(clamp_ttl_seconds(Some(120)), 120);
    }
}
