// crates/vmp-store-sqlite/src/decision_log.rs
// ============================================================================
// Module: Decision Log Repository
// Description: Append-only insert and listing for case decisions.
// Purpose: Persist the immutable record of consequential case decisions.
// Dependencies: rusqlite, vmp-core
// ============================================================================

use rusqlite::params;
use vmp_core::domain::DecisionLogEntry;
use vmp_core::domain::DecisionType;

use crate::error::SqliteStoreError;
use crate::store::Store;

fn decision_type_label(decision_type: DecisionType) -> &'static str {
    match decision_type {
        DecisionType::Approve => "approve",
        DecisionType::Reject => "reject",
        DecisionType::RequestChanges => "request_changes",
        DecisionType::Escalate => "escalate",
        DecisionType::Resolve => "resolve",
    }
}

fn parse_decision_type(label: &str) -> Result<DecisionType, SqliteStoreError> {
    match label {
        "approve" => Ok(DecisionType::Approve),
        "reject" => Ok(DecisionType::Reject),
        "request_changes" => Ok(DecisionType::RequestChanges),
        "escalate" => Ok(DecisionType::Escalate),
        "resolve" => Ok(DecisionType::Resolve),
        other => Err(SqliteStoreError::Invalid(format!("unknown decision type {other}"))),
    }
}

fn row_to_decision(row: &rusqlite::Row<'_>) -> rusqlite::Result<DecisionLogEntry> {
    let decision_type_label: String = row.get("decision_type")?;
    Ok(DecisionLogEntry {
        decision_id: row.get("decision_id")?,
        case_id: row.get("case_id")?,
        decision_type: parse_decision_type(&decision_type_label).unwrap_or(DecisionType::Resolve),
        decided_by: row.get("decided_by")?,
        rationale: row.get("rationale")?,
        checklist_step_id: row.get("checklist_step_id")?,
        evidence_id: row.get("evidence_id")?,
        created_at: row.get("created_at")?,
    })
}

impl Store {
    /// Inserts an immutable decision log entry. Called from inside the same
    /// `with_case_lock` transaction as the audit chain entry it pairs with.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::Conflict`] if `decision_id` already exists.
    pub fn insert_decision(
        &self,
        conn: &rusqlite::Connection,
        decision: &DecisionLogEntry,
    ) -> Result<(), SqliteStoreError> {
        conn.execute(
            "INSERT INTO decision_log (decision_id, case_id, decision_type, decided_by, rationale, checklist_step_id, evidence_id, created_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8)",
            params![
                decision.decision_id,
                decision.case_id,
                decision_type_label(decision.decision_type),
                decision.decided_by,
                decision.rationale,
                decision.checklist_step_id,
                decision.evidence_id,
                decision.created_at,
            ],
        )?;
        Ok(())
    }

    /// Lists a case's decision history, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] on a backend failure.
    pub fn list_decisions_for_case(&self, case_id: &str) -> Result<Vec<DecisionLogEntry>, SqliteStoreError> {
        self.with_connection(|conn| {
            let mut stmt =
                conn.prepare("SELECT * FROM decision_log WHERE case_id = ?1 ORDER BY created_at")?;
            let rows = stmt.query_map([case_id], row_to_decision)?.collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
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
    use vmp_core::new_id;

    use super::*;

    #[test]
    fn insert_then_list_in_order() {
        let store = Store::open_in_memory().expect("open");
        store
            .with_connection(|conn| {
                conn.execute(
                    "INSERT INTO cases (case_id, client_id, vendor_id, case_type, status, priority, owner_team, escalation_level, title, description, opened_by, created_at, updated_at, resolved_at) VALUES ('CASE-1','TC-1','TV-1','invoice','open','normal','ap',0,'t','d','USR-1',?1,?1,NULL)",
                    params![Utc::now()],
                )?;
                Ok(())
            })
            .expect("seed case");

        let first = DecisionLogEntry {
            decision_id: new_id("DEC", None),
            case_id: "CASE-1".to_string(),
            decision_type: DecisionType::Approve,
            decided_by: "USR-1".to_string(),
            rationale: "invoice matches PO".to_string(),
            checklist_step_id: None,
            evidence_id: None,
            created_at: Utc::now(),
        };
        store.with_connection(|conn| store.insert_decision(conn, &first)).expect("insert");

        let listed = store.list_decisions_for_case("CASE-1").expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].decision_type, DecisionType::Approve);
    }
}
