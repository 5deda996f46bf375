// crates/vmp-core/src/domain/checklist.rs
// ============================================================================
// Module: Checklist Step
// Description: One required action within a case's checklist.
// Purpose: Let the case engine derive status from concrete, ordered work.
// Dependencies: serde, chrono
// ============================================================================

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Lifecycle of a single checklist step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistStepStatus {
    Pending,
    /// Evidence has been uploaded against this step but not yet verified.
    InProgress,
    Complete,
    Skipped,
    /// Submitted evidence was reviewed and rejected; blocks resolution until
    /// the counterparty resubmits.
    Rejected,
}

/// A single required action on a case's checklist.
///
/// # Invariants
/// - `step_key` is unique within a case and matches one entry in the
///   [`crate::checklist_rules`] table for the case's `CaseType`.
/// - `sequence` reflects the fixed ordering from the rule table; it is not
///   user-reorderable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistStep {
    /// Checklist step identifier (`CKL-`).
    pub checklist_step_id: String,
    pub case_id: String,
    /// Stable key identifying this step within its case type's rule set.
    pub step_key: String,
    /// Fixed ordering position, 0-based.
    pub sequence: u32,
    /// Human-readable label.
    pub label: String,
    pub status: ChecklistStepStatus,
    /// Whether completion requires at least one evidence row of a matching type.
    pub requires_evidence: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub completed_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChecklistStep {
    /// True when this step no longer blocks case resolution.
    #[must_use]
    pub fn is_satisfied(&self) -> bool {
        matches!(
            self.status,
            ChecklistStepStatus::Complete | ChecklistStepStatus::Skipped
        )
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
    use super::*;

    fn step(status: ChecklistStepStatus) -> ChecklistStep {
        ChecklistStep {
            checklist_step_id: "CKL-1".to_string(),
            case_id: "CASE-1".to_string(),
            step_key: "collect_w9".to_string(),
            sequence: 0,
            label: "Collect W-9".to_string(),
            status,
            requires_evidence: true,
            completed_at: None,
            completed_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn complete_and_skipped_are_satisfied() {
        assert!(step(ChecklistStepStatus::Complete).is_satisfied());
        assert!(step(ChecklistStepStatus::Skipped).is_satisfied());
    }

    #[test]
    fn pending_and_in_progress_are_not_satisfied() {
        assert!(!step(ChecklistStepStatus::Pending).is_satisfied());
        assert!(!step(ChecklistStepStatus::InProgress).is_satisfied());
    }

    #[test]
    fn rejected_is_not_satisfied() {
        assert!(!step(ChecklistStepStatus::Rejected).is_satisfied());
    }
}
