// crates/vmp-core/src/audit.rs
// ============================================================================
// Module: Audit Chain Math
// Description: Deterministic, pure hash-chain computation for document events.
// Purpose: Give every implementation (real store, test double) one hash
//          function so they cannot silently diverge.
// Dependencies: sha2, serde, serde_json, serde_jcs
// ============================================================================

//! ## Overview
//! The audit chain is a global, append-only, hash-linked ledger of document
//! events. This module contains only the deterministic math: computing a
//! `chainHash` from an entry's fields. Sequencing, locking, and persistence
//! live in `vmp-store-sqlite`; keeping the hash function here lets both the
//! real store and any in-memory test double compute byte-identical hashes.
//!
//! Security posture: `chainHash` is computed server-side only; a
//! client-supplied chain hash is never trusted (see [`AuditChainEntry::chain_hash`]
//! callers must always derive this value via [`compute_chain_hash`]).

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;

/// Genesis `previousHash` value used for the first entry in the chain.
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// A single, immutable audit chain entry.
///
/// # Invariants
/// - `sequence_id` is 1-based and contiguous within the chain.
/// - `previous_hash` equals [`GENESIS_HASH`] for `sequence_id == 1`, else the
///   `chain_hash` of the entry at `sequence_id - 1`.
/// - `chain_hash` is always the output of [`compute_chain_hash`] over this
///   entry's other fields; it is never accepted from a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditChainEntry {
    /// 1-based, gap-free position in the chain.
    pub sequence_id: u64,
    /// Identifier of the document this event concerns.
    pub document_id: String,
    /// Identifier of the user who caused the event.
    pub user_id: String,
    /// SHA-256 hex digest of the document payload bytes.
    pub payload_hash: String,
    /// Caller-supplied structured event metadata.
    pub metadata: serde_json::Value,
    /// Chain hash of the preceding entry, or [`GENESIS_HASH`] for seq 1.
    pub previous_hash: String,
    /// This entry's deterministic chain hash.
    pub chain_hash: String,
    /// UTC time the entry was written.
    pub created_at: DateTime<Utc>,
}

/// Computes the deterministic `chainHash` for an entry.
///
/// `chainHash = SHA256(previousHash || payloadHash || canonical_json(metadata) || userId)`.
///
/// # Errors
///
/// Returns an error if `metadata` cannot be canonicalized (not valid JSON
/// after normalization, e.g. contains `NaN`/`Infinity` floats).
pub fn compute_chain_hash(
    previous_hash: &str,
    payload_hash: &str,
    metadata: &serde_json::Value,
    user_id: &str,
) -> Result<String, serde_json::Error> {
    let canonical_metadata = serde_jcs::to_string(metadata)?;
    let mut hasher = Sha256::new();
    hasher.update(previous_hash.as_bytes());
    hasher.update(payload_hash.as_bytes());
    hasher.update(canonical_metadata.as_bytes());
    hasher.update(user_id.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Computes the SHA-256 hex digest of arbitrary bytes (used for `payloadHash`).
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Outcome of a full or partial chain verification scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChainVerification {
    /// The scanned range is internally consistent.
    Valid,
    /// A break was found at `broken_at`.
    Invalid {
        /// Sequence id of the first entry that fails verification.
        broken_at: u64,
        /// Human-readable reason for the break.
        reason: String,
    },
}

/// Verifies a contiguous, ordered slice of chain entries.
///
/// Entries must already be sorted by `sequence_id` ascending; this function
/// does not sort them. Returns [`ChainVerification::Invalid`] on the first
/// entry whose `sequence_id`, `previous_hash`, or `chain_hash` fails to
/// match expectations.
#[must_use]
pub fn verify_chain(entries: &[AuditChainEntry]) -> ChainVerification {
    let mut expected_previous = GENESIS_HASH.to_string();
    let mut expected_sequence = 1u64;
    for entry in entries {
        if entry.sequence_id != expected_sequence {
            return ChainVerification::Invalid {
                broken_at: entry.sequence_id,
                reason: format!(
                    "expected sequence_id {expected_sequence}, found {}",
                    entry.sequence_id
                ),
            };
        }
        if entry.previous_hash != expected_previous {
            return ChainVerification::Invalid {
                broken_at: entry.sequence_id,
                reason: "previous_hash does not match prior entry's chain_hash".to_string(),
            };
        }
        let recomputed = compute_chain_hash(
            &entry.previous_hash,
            &entry.payload_hash,
            &entry.metadata,
            &entry.user_id,
        );
        match recomputed {
            Ok(hash) if hash == entry.chain_hash => {}
            Ok(_) => {
                return ChainVerification::Invalid {
                    broken_at: entry.sequence_id,
                    reason: "chain_hash does not match recomputed hash".to_string(),
                };
            }
            Err(_) => {
                return ChainVerification::Invalid {
                    broken_at: entry.sequence_id,
                    reason: "metadata failed canonicalization during verification".to_string(),
                };
            }
        }
        expected_previous = entry.chain_hash.clone();
        expected_sequence += 1;
    }
    ChainVerification::Valid
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

    fn entry(seq: u64, previous: &str, payload_hash: &str, user: &str) -> AuditChainEntry {
        let metadata = serde_json::json!({"action": "UPLOAD", "seq": seq});
        let chain_hash = compute_chain_hash(previous, payload_hash, &metadata, user)
            .expect("canonicalize metadata");
        AuditChainEntry {
            sequence_id: seq,
            document_id: format!("DOC-{seq}"),
            user_id: user.to_string(),
            payload_hash: payload_hash.to_string(),
            metadata,
            previous_hash: previous.to_string(),
            chain_hash,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn genesis_entry_links_to_genesis_hash() {
        let e1 = entry(1, GENESIS_HASH, "abc", "USR-1");
        assert_eq!(verify_chain(&[e1]), ChainVerification::Valid);
    }

    #[test]
    fn chain_of_three_verifies() {
        let e1 = entry(1, GENESIS_HASH, "abc", "USR-1");
        let e2 = entry(2, &e1.chain_hash, "def", "USR-2");
        let e3 = entry(3, &e2.chain_hash, "ghi", "USR-1");
        assert_eq!(verify_chain(&[e1, e2, e3]), ChainVerification::Valid);
    }

    #[test]
    fn tampered_entry_breaks_verification_at_the_right_point() {
        let e1 = entry(1, GENESIS_HASH, "abc", "USR-1");
        let mut e2 = entry(2, &e1.chain_hash, "def", "USR-2");
        let e3 = entry(3, &e2.chain_hash, "ghi", "USR-1");
        e2.payload_hash = "tampered".to_string();
        match verify_chain(&[e1, e2, e3]) {
            ChainVerification::Invalid {
                broken_at,
                ..
            } => assert_eq!(broken_at, 2),
            ChainVerification::Valid => panic!("expected invalid chain"),
        }
    }

    #[test]
    fn gap_in_sequence_is_detected() {
        let e1 = entry(1, GENESIS_HASH, "abc", "USR-1");
        let e3 = entry(3, &e1.chain_hash, "ghi", "USR-1");
        match verify_chain(&[e1, e3]) {
            ChainVerification::Invalid {
                broken_at,
                ..
            } => assert_eq!(broken_at, 3),
            ChainVerification::Valid => panic!("expected invalid chain"),
        }
    }

    #[test]
    fn client_supplied_hash_is_never_the_source_of_truth() {
        let metadata = serde_json::json!({"action": "UPLOAD"});
        let honest = compute_chain_hash(GENESIS_HASH, "abc", &metadata, "USR-1")
            .expect("canonicalize metadata");
        let forged = "f".repeat(64);
        assert_ne!(honest, forged);
    }
}
