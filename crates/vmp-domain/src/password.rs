// crates/vmp-domain/src/password.rs
// ============================================================================
// Module: Password Hashing
// Description: Argon2id hashing and verification run on the blocking pool.
// Purpose: Keep the request-handling runtime free of CPU-bound hashing work.
// Dependencies: argon2, tokio
// ============================================================================

use argon2::Argon2;
use argon2::PasswordHash;
use argon2::PasswordHasher;
use argon2::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;

use crate::error::DomainError;

/// Hashes `password` with Argon2id on a blocking thread, returning the PHC
/// string form suitable for storage in `User::password_hash`.
///
/// # Errors
///
/// Returns [`DomainError::Hash`] if the blocking task panics or the
/// underlying hash computation fails.
pub async fn hash_password(password: String) -> Result<String, DomainError> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| DomainError::Hash(err.to_string()))
    })
    .await
    .map_err(|err| DomainError::Hash(err.to_string()))?
}

/// Verifies `password` against a stored Argon2id PHC string.
///
/// Returns `Ok(false)` for a mismatched password, never an error; only a
/// malformed stored hash or a runtime failure produces [`DomainError::Hash`].
///
/// # Errors
///
/// Returns [`DomainError::Hash`] if `hash` is not a well-formed PHC string or
/// the blocking task panics.
pub async fn verify_password(password: String, hash: String) -> Result<bool, DomainError> {
    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&hash).map_err(|err| DomainError::Hash(err.to_string()))?;
        Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
    })
    .await
    .map_err(|err| DomainError::Hash(err.to_string()))?
}
