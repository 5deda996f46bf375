// crates/vmp-core/src/domain/decision_log.rs
// ============================================================================
// Module: Decision Log Entry
// Description: An immutable record of a consequential decision made on a case.
// Purpose: Preserve who decided what, and why, independent of the audit chain.
// Dependencies: serde, chrono
// ============================================================================

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// The kind of decision recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionType {
    Approve,
    Reject,
    RequestChanges,
    Escalate,
    Resolve,
}

/// An immutable record of a decision made on a case.
///
/// # Invariants
/// - Rows are never updated or deleted after insert; corrections are made
///   by inserting a new entry that supersedes the prior one in narrative,
///   not by mutating history.
/// - Every decision log entry also produces one [`super::super::audit`]
///   chain entry; the two are written in the same transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionLogEntry {
    /// Decision log entry identifier (`DEC-`).
    pub decision_id: String,
    pub case_id: String,
    pub decision_type: DecisionType,
    /// User who made the decision.
    pub decided_by: String,
    /// Free-text rationale supplied by the decider.
    pub rationale: String,
    /// Related checklist step, when the decision concerns one specifically.
    pub checklist_step_id: Option<String>,
    /// Related evidence row, when the decision concerns one specifically.
    pub evidence_id: Option<String>,
    pub created_at: DateTime<Utc>,
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
    fn decision_types_are_distinct() {
        assert_ne!(DecisionType::Approve, DecisionType::Reject);
    }
}
