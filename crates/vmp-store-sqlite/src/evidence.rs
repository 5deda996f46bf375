// crates/vmp-store-sqlite/src/evidence.rs
// ============================================================================
// Module: Evidence Repository
// Description: CRUD and version-lineage bookkeeping for uploaded evidence.
// Purpose: Guarantee evidence versions stay 1-based and contiguous per type.
// Dependencies: rusqlite, vmp-core
// ============================================================================

use rusqlite::OptionalExtension;
use rusqlite::params;
use vmp_core::domain::Evidence;
use vmp_core::domain::EvidenceStatus;

use crate::error::SqliteStoreError;
use crate::store::Store;

fn status_label(status: EvidenceStatus) -> &'static str {
    match status {
        EvidenceStatus::Pending => "pending",
        EvidenceStatus::Accepted => "accepted",
        EvidenceStatus::Rejected => "rejected",
    }
}

fn parse_status(label: &str) -> Result<EvidenceStatus, SqliteStoreError> {
    match label {
        "pending" => Ok(EvidenceStatus::Pending),
        "accepted" => Ok(EvidenceStatus::Accepted),
        "rejected" => Ok(EvidenceStatus::Rejected),
        other => Err(SqliteStoreError::Invalid(format!("unknown evidence status {other}"))),
    }
}

fn row_to_evidence(row: &rusqlite::Row<'_>) -> rusqlite::Result<Evidence> {
    let status_label: String = row.get("status")?;
    let size_bytes: i64 = row.get("size_bytes")?;
    let version: u32 = row.get("version")?;
    Ok(Evidence {
        evidence_id: row.get("evidence_id")?,
        case_id: row.get("case_id")?,
        evidence_type: row.get("evidence_type")?,
        version,
        original_filename: row.get("original_filename")?,
        storage_key: row.get("storage_key")?,
        content_hash: row.get("content_hash")?,
        size_bytes: size_bytes.max(0) as u64,
        content_type: row.get("content_type")?,
        status: parse_status(&status_label).unwrap_or(EvidenceStatus::Pending),
        uploaded_by: row.get("uploaded_by")?,
        uploaded_at: row.get("uploaded_at")?,
        reviewed_by: row.get("reviewed_by")?,
        reviewed_at: row.get("reviewed_at")?,
        review_note: row.get("review_note")?,
    })
}

impl Store {
    /// Returns the next 1-based version for `(case_id, evidence_type)`.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] on a backend failure.
    pub fn next_evidence_version(
        &self,
        conn: &rusqlite::Connection,
        case_id: &str,
        evidence_type: &str,
    ) -> Result<u32, SqliteStoreError> {
        let max_version: Option<i64> = conn.query_row(
            "SELECT MAX(version) FROM evidence WHERE case_id = ?1 AND evidence_type = ?2",
            params![case_id, evidence_type],
            |row| row.get(0),
        )?;
        Ok(u32::try_from(max_version.unwrap_or(0)).unwrap_or(0) + 1)
    }

    /// Inserts a new evidence row. Callers must have computed `version` via
    /// [`Store::next_evidence_version`] inside the same transaction to avoid
    /// a version race.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::Conflict`] if `(case_id, evidence_type,
    /// version)` already exists.
    pub fn insert_evidence(
        &self,
        conn: &rusqlite::Connection,
        evidence: &Evidence,
    ) -> Result<(), SqliteStoreError> {
        conn.execute(
            "INSERT INTO evidence (evidence_id, case_id, evidence_type, version, original_filename, storage_key, content_hash, size_bytes, content_type, status, uploaded_by, uploaded_at, reviewed_by, reviewed_at, review_note)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15)",
            params![
                evidence.evidence_id,
                evidence.case_id,
                evidence.evidence_type,
                evidence.version,
                evidence.original_filename,
                evidence.storage_key,
                evidence.content_hash,
                evidence.size_bytes as i64,
                evidence.content_type,
                status_label(evidence.status),
                evidence.uploaded_by,
                evidence.uploaded_at,
                evidence.reviewed_by,
                evidence.reviewed_at,
                evidence.review_note,
            ],
        )?;
        Ok(())
    }

    /// Lists every evidence version uploaded to a case, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] on a backend failure.
    pub fn list_evidence_for_case(&self, case_id: &str) -> Result<Vec<Evidence>, SqliteStoreError> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM evidence WHERE case_id = ?1 ORDER BY evidence_type, version DESC",
            )?;
            let rows = stmt.query_map([case_id], row_to_evidence)?.collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Records a reviewer decision on one evidence row.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::NotFound`] if no evidence row matches.
    pub fn review_evidence(
        &self,
        conn: &rusqlite::Connection,
        evidence_id: &str,
        status: EvidenceStatus,
        reviewed_by: &str,
        reviewed_at: chrono::DateTime<chrono::Utc>,
        review_note: Option<&str>,
    ) -> Result<(), SqliteStoreError> {
        let changed = conn.execute(
            "UPDATE evidence SET status = ?1, reviewed_by = ?2, reviewed_at = ?3, review_note = ?4 WHERE evidence_id = ?5",
            params![status_label(status), reviewed_by, reviewed_at, review_note, evidence_id],
        )?;
        if changed == 0 {
            return Err(SqliteStoreError::NotFound(format!("evidence {evidence_id}")));
        }
        Ok(())
    }

    /// Looks up one evidence row by ID.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] on a backend failure.
    pub fn find_evidence(&self, evidence_id: &str) -> Result<Option<Evidence>, SqliteStoreError> {
        self.with_connection(|conn| {
            conn.query_row("SELECT * FROM evidence WHERE evidence_id = ?1", [evidence_id], row_to_evidence)
                .optional()
                .map_err(SqliteStoreError::from)
        })
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
    use chrono::Utc;

    use super::*;

    fn seed_case(store: &Store, case_id: &str) {
        store
            .with_connection(|conn| {
                conn.execute(
                    "INSERT INTO cases (case_id, client_id, vendor_id, case_type, status, priority, owner_team, escalation_level, title, description, opened_by, created_at, updated_at, resolved_at) VALUES (?1,'TC-1','TV-1','onboarding','open','normal','ap',0,'t','d','USR-1',?2,?2,NULL)",
                    params![case_id, Utc::now()],
                )?;
                Ok(())
            })
            .expect("seed case");
    }

    #[test]
    fn version_numbers_are_contiguous_per_evidence_type() {
        let store = Store::open_in_memory().expect("open");
        seed_case(&store, "CASE-1");

        for _ in 0..3 {
            store
                .with_connection(|conn| {
                    let version = store.next_evidence_version(conn, "CASE-1", "w9")?;
                    let evidence = Evidence {
                        evidence_id: vmp_core::new_id("EVD", None),
                        case_id: "CASE-1".to_string(),
                        evidence_type: "w9".to_string(),
                        version,
                        original_filename: "w9.pdf".to_string(),
                        storage_key: format!("evidence/CASE-1/w9/v{version}/w9.pdf"),
                        content_hash: "abc".to_string(),
                        size_bytes: 100,
                        content_type: "application/pdf".to_string(),
                        status: EvidenceStatus::Pending,
                        uploaded_by: "USR-1".to_string(),
                        uploaded_at: Utc::now(),
                        reviewed_by: None,
                        reviewed_at: None,
                        review_note: None,
                    };
                    store.insert_evidence(conn, &evidence)
                })
                .expect("insert evidence");
        }

        let all = store.list_evidence_for_case("CASE-1").expect("list");
        let mut versions: Vec<u32> = all.iter().map(|e| e.version).collect();
        versions.sort_unstable();
        assert_eq!(versions, vec![1, 2, 3]);
    }

    #[test]
    fn review_sets_status_and_reviewer() {
        let store = Store::open_in_memory().expect("open");
        seed_case(&store, "CASE-2");

        let evidence_id = store
            .with_connection(|conn| {
                let version = store.next_evidence_version(conn, "CASE-2", "bank_letter")?;
                let evidence = Evidence {
                    evidence_id: vmp_core::new_id("EVD", None),
                    case_id: "CASE-2".to_string(),
                    evidence_type: "bank_letter".to_string(),
                    version,
                    original_filename: "letter.pdf".to_string(),
                    storage_key: "evidence/CASE-2/bank_letter/v1/letter.pdf".to_string(),
                    content_hash: "def".to_string(),
                    size_bytes: 50,
                    content_type: "application/pdf".to_string(),
                    status: EvidenceStatus::Pending,
                    uploaded_by: "USR-1".to_string(),
                    uploaded_at: Utc::now(),
                    reviewed_by: None,
                    reviewed_at: None,
                    review_note: None,
                };
                store.insert_evidence(conn, &evidence)?;
                Ok(evidence.evidence_id)
            })
            .expect("insert evidence");

        store
            .with_connection(|conn| {
                store.review_evidence(conn, &evidence_id, EvidenceStatus::Rejected, "USR-2", Utc::now(), Some("blurry scan"))
            })
            .expect("review");

        let reloaded = store.find_evidence(&evidence_id).expect("find").expect("present");
        assert_eq!(reloaded.status, EvidenceStatus::Rejected);
        assert_eq!(reloaded.reviewed_by.as_deref(), Some("USR-2"));
    }
}
