// crates/vmp-store-sqlite/src/checklist.rs
// ============================================================================
// Module: Checklist Repository
// Description: CRUD for a case's checklist steps, plus rule-table seeding.
// Purpose: Persist the ordered, fixed work items a case's status derives from.
// Dependencies: rusqlite, vmp-core
// ============================================================================

use rusqlite::params;
use vmp_core::checklist_rules;
use vmp_core::domain::CaseType;
use vmp_core::domain::ChecklistStep;
use vmp_core::domain::ChecklistStepStatus;
use vmp_core::new_id;

use crate::error::SqliteStoreError;
use crate::store::Store;

fn status_label(status: ChecklistStepStatus) -> &'static str {
    match status {
        ChecklistStepStatus::Pending => "pending",
        ChecklistStepStatus::InProgress => "in_progress",
        ChecklistStepStatus::Complete => "complete",
        ChecklistStepStatus::Skipped => "skipped",
        ChecklistStepStatus::Rejected => "rejected",
    }
}

fn parse_status(label: &str) -> Result<ChecklistStepStatus, SqliteStoreError> {
    match label {
        "pending" => Ok(ChecklistStepStatus::Pending),
        "in_progress" => Ok(ChecklistStepStatus::InProgress),
        "complete" => Ok(ChecklistStepStatus::Complete),
        "skipped" => Ok(ChecklistStepStatus::Skipped),
        "rejected" => Ok(ChecklistStepStatus::Rejected),
        other => Err(SqliteStoreError::Invalid(format!("unknown checklist step status {other}"))),
    }
}

fn row_to_step(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChecklistStep> {
    let status_label: String = row.get("status")?;
    let requires_evidence: i64 = row.get("requires_evidence")?;
    let sequence: u32 = row.get("sequence")?;
    Ok(ChecklistStep {
        checklist_step_id: row.get("checklist_step_id")?,
        case_id: row.get("case_id")?,
        step_key: row.get("step_key")?,
        sequence,
        label: row.get("label")?,
        status: parse_status(&status_label).unwrap_or(ChecklistStepStatus::Pending),
        requires_evidence: requires_evidence != 0,
        completed_at: row.get("completed_at")?,
        completed_by: row.get("completed_by")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

impl Store {
    /// Seeds a newly created case's checklist from the fixed rule table for
    /// its `case_type`. A case type with no rules (general/contract/compliance)
    /// seeds zero steps.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] on a backend failure.
    pub fn seed_checklist_for_case(
        &self,
        conn: &rusqlite::Connection,
        case_id: &str,
        case_type: CaseType,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<Vec<ChecklistStep>, SqliteStoreError> {
        let mut steps = Vec::new();
        for rule in checklist_rules::rule_steps_for(case_type) {
            let step = ChecklistStep {
                checklist_step_id: new_id("CKL", None),
                case_id: case_id.to_string(),
                step_key: rule.step_key.to_string(),
                sequence: rule.sequence,
                label: rule.label.to_string(),
                status: ChecklistStepStatus::Pending,
                requires_evidence: rule.requires_evidence,
                completed_at: None,
                completed_by: None,
                created_at: now,
                updated_at: now,
            };
            conn.execute(
                "INSERT INTO checklist_steps (checklist_step_id, case_id, step_key, sequence, label, status, requires_evidence, completed_at, completed_by, created_at, updated_at)
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11)",
                params![
                    step.checklist_step_id,
                    step.case_id,
                    step.step_key,
                    step.sequence,
                    step.label,
                    status_label(step.status),
                    i64::from(step.requires_evidence),
                    step.completed_at,
                    step.completed_by,
                    step.created_at,
                    step.updated_at,
                ],
            )?;
            steps.push(step);
        }
        Ok(steps)
    }

    /// Lists a case's checklist steps in fixed sequence order.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] on a backend failure.
    pub fn list_checklist_steps(&self, case_id: &str) -> Result<Vec<ChecklistStep>, SqliteStoreError> {
        self.with_connection(|conn| {
            let mut stmt =
                conn.prepare("SELECT * FROM checklist_steps WHERE case_id = ?1 ORDER BY sequence")?;
            let rows = stmt.query_map([case_id], row_to_step)?.collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Transitions one checklist step's status within an already-open
    /// transaction (the case engine calls this from inside
    /// [`Store::with_case_lock`] so the status recomputation it triggers
    /// sees a consistent checklist snapshot).
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::NotFound`] if no step matches.
    pub fn update_checklist_step_status(
        &self,
        conn: &rusqlite::Connection,
        checklist_step_id: &str,
        status: ChecklistStepStatus,
        completed_by: Option<&str>,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), SqliteStoreError> {
        let completed_at = matches!(status, ChecklistStepStatus::Complete | ChecklistStepStatus::Skipped)
            .then_some(now);
        let changed = conn.execute(
            "UPDATE checklist_steps SET status = ?1, completed_at = ?2, completed_by = ?3, updated_at = ?4 WHERE checklist_step_id = ?5",
            params![status_label(status), completed_at, completed_by, now, checklist_step_id],
        )?;
        if changed == 0 {
            return Err(SqliteStoreError::NotFound(format!("checklist step {checklist_step_id}")));
        }
        Ok(())
    }
}
