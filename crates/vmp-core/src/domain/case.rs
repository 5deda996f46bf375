// crates/vmp-core/src/domain/case.rs
// ============================================================================
// Module: Case
// Description: The central collaboration unit binding a client and vendor
//              tenant to a checklist, evidence set, messages, and decisions.
// Purpose: Track one piece of cross-tenant work from open to resolved.
// Dependencies: serde, chrono
// ============================================================================

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// The kind of work a case represents, which selects its checklist rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseType {
    General,
    Invoice,
    Payment,
    Onboarding,
    Contract,
    Compliance,
    BankChange,
}

/// Derived lifecycle status of a case.
///
/// # Invariants
/// - Never set directly by a caller; always recomputed from checklist and
///   evidence state by the case engine (see `vmp-domain`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Open,
    WaitingSupplier,
    WaitingInternal,
    Resolved,
    Blocked,
}

/// Case urgency, set by the opening party and adjustable by internal staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CasePriority {
    Low,
    Normal,
    High,
    Urgent,
}

/// Internal team accountable for driving a case to resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerTeam {
    Procurement,
    Ap,
    Finance,
}

/// Escalation tier, 0 (none) through 3 (highest). Advanced by the case
/// engine when a case sits in `WaitingInternal` past its SLA window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EscalationLevel(pub u8);

impl EscalationLevel {
    /// No escalation in effect.
    pub const NONE: Self = Self(0);
    /// Highest escalation tier this type represents.
    pub const MAX: Self = Self(3);

    /// Returns the next escalation level, saturating at [`Self::MAX`].
    #[must_use]
    pub fn escalate(self) -> Self {
        Self(self.0.saturating_add(1).min(Self::MAX.0))
    }
}

impl Default for EscalationLevel {
    fn default() -> Self {
        Self::NONE
    }
}

/// A case: the unit of work connecting a client and vendor tenant.
///
/// # Invariants
/// - `client_id` and `vendor_id` must belong to an active
///   [`super::relationship::Relationship`] at creation time.
/// - `status` is recomputed, never hand-set, whenever checklist steps or
///   evidence rows change (see the case engine's status derivation rule).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    /// Case identifier (`CASE-`).
    pub case_id: String,
    pub client_id: String,
    pub vendor_id: String,
    pub case_type: CaseType,
    pub status: CaseStatus,
    pub priority: CasePriority,
    pub owner_team: OwnerTeam,
    pub escalation_level: EscalationLevel,
    /// Human-readable title.
    pub title: String,
    /// Longer-form description supplied at creation.
    pub description: String,
    /// User who opened the case.
    pub opened_by: String,
    /// Structured side-data a case type needs beyond the common fields --
    /// currently only `BankChange` cases populate this, with the proposed
    /// bank details a reviewer approves or rejects. An empty object for
    /// every other case type.
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Time the case most recently transitioned into a terminal status.
    pub resolved_at: Option<DateTime<Utc>>,
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
    fn escalation_saturates_at_max() {
        let mut level = EscalationLevel::NONE;
        for _ in 0..10 {
            level = level.escalate();
        }
        assert_eq!(level, EscalationLevel::MAX);
    }

    #[test]
    fn escalation_default_is_none() {
        assert_eq!(EscalationLevel::default(), EscalationLevel::NONE);
    }
}
