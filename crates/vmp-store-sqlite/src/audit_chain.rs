// crates/vmp-store-sqlite/src/audit_chain.rs
// ============================================================================
// Module: Audit Chain Repository
// Description: Append-only persistence for the global, hash-linked audit log.
// Purpose: Serialize every append through one writer so `chainHash` never
//          forks, and let any caller later verify the full chain.
// Dependencies: rusqlite, vmp-core
// ============================================================================

//! ## Overview
//! Appends take the same single-writer mutex as everything else in this
//! crate (see [`Store::with_connection`]), but additionally read the
//! current tail under that same lock before computing the next entry's
//! hash, so two concurrent appends cannot both observe the same tail and
//! fork the chain.

use rusqlite::OptionalExtension;
use rusqlite::params;
use vmp_core::audit::AuditChainEntry;
use vmp_core::audit::ChainVerification;
use vmp_core::audit::GENESIS_HASH;
use vmp_core::audit::compute_chain_hash;
use vmp_core::audit::verify_chain;

use crate::error::SqliteStoreError;
use crate::store::Store;

fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<AuditChainEntry> {
    let sequence_id: i64 = row.get("sequence_id")?;
    let metadata_json: String = row.get("metadata")?;
    Ok(AuditChainEntry {
        sequence_id: u64::try_from(sequence_id).unwrap_or(0),
        document_id: row.get("document_id")?,
        user_id: row.get("user_id")?,
        payload_hash: row.get("payload_hash")?,
        metadata: serde_json::from_str(&metadata_json).unwrap_or(serde_json::Value::Null),
        previous_hash: row.get("previous_hash")?,
        chain_hash: row.get("chain_hash")?,
        created_at: row.get("created_at")?,
    })
}

impl Store {
    /// Appends a new audit chain entry for `document_id`, computing its
    /// `previousHash`/`chainHash` from the current chain tail.
    ///
    /// Must run inside the caller's transaction (typically a
    /// [`Store::with_case_lock`] scope that also writes the decision or
    /// evidence row this entry documents), so the tail read and the insert
    /// are atomic with respect to other writers.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::Invalid`] if `metadata` cannot be
    /// canonicalized, or [`SqliteStoreError`] on a backend failure.
    pub fn append_audit_entry(
        &self,
        conn: &rusqlite::Connection,
        document_id: &str,
        user_id: &str,
        payload_hash: &str,
        metadata: &serde_json::Value,
        created_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<AuditChainEntry, SqliteStoreError> {
        let previous_hash: String = conn
            .query_row("SELECT chain_hash FROM audit_chain ORDER BY sequence_id DESC LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()?
            .unwrap_or_else(|| GENESIS_HASH.to_string());

        let chain_hash = compute_chain_hash(&previous_hash, payload_hash, metadata, user_id)
            .map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;

        conn.execute(
            "INSERT INTO audit_chain (document_id, user_id, payload_hash, metadata, previous_hash, chain_hash, created_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7)",
            params![document_id, user_id, payload_hash, metadata.to_string(), previous_hash, chain_hash, created_at],
        )?;

        let sequence_id = u64::try_from(conn.last_insert_rowid()).unwrap_or(0);
        Ok(AuditChainEntry {
            sequence_id,
            document_id: document_id.to_string(),
            user_id: user_id.to_string(),
            payload_hash: payload_hash.to_string(),
            metadata: metadata.clone(),
            previous_hash,
            chain_hash,
            created_at,
        })
    }

    /// Lists every audit chain entry concerning `document_id`, in sequence
    /// order. Note this is a projection, not a verifiable sub-chain: use
    /// [`Store::verify_full_audit_chain`] to verify the whole ledger.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] on a backend failure.
    pub fn list_audit_entries_for_document(
        &self,
        document_id: &str,
    ) -> Result<Vec<AuditChainEntry>, SqliteStoreError> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM audit_chain WHERE document_id = ?1 ORDER BY sequence_id",
            )?;
            let rows = stmt.query_map([document_id], row_to_entry)?.collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Verifies every entry in the chain from genesis.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] on a backend failure reading the chain.
    pub fn verify_full_audit_chain(&self) -> Result<ChainVerification, SqliteStoreError> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare("SELECT * FROM audit_chain ORDER BY sequence_id")?;
            let rows = stmt.query_map([], row_to_entry)?.collect::<Result<Vec<_>, _>>()?;
            Ok(verify_chain(&rows))
        })
    }
}
