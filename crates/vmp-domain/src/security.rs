// crates/vmp-domain/src/security.rs
// ============================================================================
// Module: Security Primitives
// Description: Constant-time comparison for secret tokens.
// Purpose: Compare invite/reset tokens without leaking timing information
//          about how many leading bytes matched.
// Dependencies: subtle
// ============================================================================

use subtle::ConstantTimeEq;

/// Compares two byte strings in constant time.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

/// Compares two strings in constant time.
#[must_use]
pub fn constant_time_eq_str(a: &str, b: &str) -> bool {
    constant_time_eq(a.as_bytes(), b.as_bytes())
}
