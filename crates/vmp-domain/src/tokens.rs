// crates/vmp-domain/src/tokens.rs
// ============================================================================
// Module: Secret Tokens
// Description: CSPRNG token generation for invites and password resets.
// Purpose: Give every single-use link a 256-bit secret whose hash, not
//          cleartext, is what gets persisted.
// Dependencies: rand, hex, vmp-authz
// ============================================================================

use rand::RngCore;

/// Number of random bytes in a freshly minted secret token.
const TOKEN_BYTES: usize = 32;

/// Generates a new 256-bit secret token, hex-encoded.
///
/// The cleartext value is returned to the caller exactly once; callers
/// persist only [`hash_token`]'s output.
#[must_use]
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hashes a cleartext token for storage/lookup.
///
/// Delegates to `vmp_authz::hash_token` so invites, password resets, and
/// sessions all address their secrets the same way.
#[must_use]
pub fn hash_token(token: &str) -> String {
    vmp_authz::hash_token(token)
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
    fn generated_tokens_are_64_hex_characters() {
        let token = generate_token();
        assert_eq!(token.len(), TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn successive_tokens_differ() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn hashing_is_deterministic() {
        let token = generate_token();
        assert_eq!(hash_token(&token), hash_token(&token));
    }
}
