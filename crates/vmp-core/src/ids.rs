// crates/vmp-core/src/ids.rs
// ============================================================================
// Module: ID Generation
// Description: Deterministic-shape, cryptographically random prefixed IDs.
// Purpose: Mint stable, human-scannable identifiers for every entity.
// Dependencies: rand, hex
// ============================================================================

//! ## Overview
//! Identifiers are `PREFIX-XXXXYYYY`: `XXXX` borrows up to four uppercase
//! alphanumeric characters from a caller-supplied seed name (padded with
//! fresh randomness when the seed is short or absent), and `YYYY` is four
//! hex characters of fresh CSPRNG output. Tenants additionally mint a
//! matched `(TNT-, TC-, TV-)` triple sharing one eight-character suffix, so
//! that a tenant's client and vendor identities are recognizably paired
//! without being derivable from one another.

use rand::Rng;
use rand::distributions::Alphanumeric;

/// Builds a new prefixed identifier.
///
/// `seed_name`, when given, contributes its first 1-4 uppercase alphanumeric
/// characters to the identifier body; the remainder is padded with fresh
/// CSPRNG alphanumerics so the body is always exactly four characters.
#[must_use]
pub fn new_id(prefix: &str, seed_name: Option<&str>) -> String {
    let seed_part = seed_component(seed_name);
    let suffix = random_hex4();
    format!("{prefix}-{seed_part}{suffix}")
}

/// Matched triple of tenant/client/vendor identifiers sharing one suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTenantIds {
    /// Canonical tenant identifier (`TNT-`).
    pub tenant_id: String,
    /// Paired client identifier (`TC-`).
    pub client_id: String,
    /// Paired vendor identifier (`TV-`).
    pub vendor_id: String,
}

/// Mints a tenant's three paired identifiers, all sharing one 8-char suffix.
#[must_use]
pub fn new_tenant_ids(name: &str) -> NewTenantIds {
    let body = format!("{}{}", seed_component(Some(name)), random_hex4());
    NewTenantIds {
        tenant_id: format!("TNT-{body}"),
        client_id: format!("TC-{body}"),
        vendor_id: format!("TV-{body}"),
    }
}

/// Extracts up to 4 uppercase alphanumeric characters from `seed`, padding
/// with fresh CSPRNG alphanumerics to a fixed width of 4.
fn seed_component(seed: Option<&str>) -> String {
    let mut body: String = seed
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .take(4)
        .collect();
    let mut rng = rand::thread_rng();
    while body.len() < 4 {
        body.push(rng.sample(Alphanumeric) as char);
    }
    body
}

/// Returns four hex characters of fresh CSPRNG output.
fn random_hex4() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 2] = rng.r#gen();
    hex::encode(bytes)
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
    fn new_id_has_expected_shape() {
        let id = new_id("CASE", None);
        assert!(id.starts_with("CASE-"));
        assert_eq!(id.len(), "CASE-".len() + 8);
    }

    #[test]
    fn new_id_uses_seed_prefix() {
        let id = new_id("USR", Some("alice"));
        assert!(id.starts_with("USR-ALIC"));
    }

    #[test]
    fn tenant_ids_share_one_suffix() {
        let ids = new_tenant_ids("Acme Corp");
        let tenant_suffix = ids.tenant_id.strip_prefix("TNT-").expect("tnt prefix");
        let client_suffix = ids.client_id.strip_prefix("TC-").expect("tc prefix");
        let vendor_suffix = ids.vendor_id.strip_prefix("TV-").expect("tv prefix");
        assert_eq!(tenant_suffix, client_suffix);
        assert_eq!(tenant_suffix, vendor_suffix);
        assert!(tenant_suffix.starts_with("ACME"));
    }

    #[test]
    fn short_seed_is_padded() {
        let id = new_id("TV", Some("a"));
        let body = id.strip_prefix("TV-").expect("tv prefix");
        assert_eq!(body.len(), 8);
        assert_eq!(&body[0..1], "A");
    }
}
