// crates/vmp-core/src/domain/notification.rs
// ============================================================================
// Module: Notification
// Description: An in-app notification fanned out to a user on a case event.
// Purpose: Tell a principal that something on their case needs attention.
// Dependencies: serde, chrono
// ============================================================================

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::case::CasePriority;

/// Notification urgency, derived from the triggering case's priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPriority {
    Low,
    Normal,
    High,
}

/// An in-app notification delivered to one user.
///
/// # Invariants
/// - `read_at` is set at most once, by the recipient; notifications are
///   never un-read.
/// - Delivery is in-app only; email/SMTP fan-out is a separate concern this
///   type does not model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Notification identifier (`NTF-`).
    pub notification_id: String,
    /// Recipient user.
    pub user_id: String,
    pub case_id: String,
    /// Short machine key identifying the triggering event, e.g. `"case.message.posted"`.
    pub event_key: String,
    /// Human-readable summary.
    pub summary: String,
    pub priority: NotificationPriority,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

impl Notification {
    /// Derives notification priority from a case's priority.
    ///
    /// `Urgent` and `High` case priority both escalate to `High` so a
    /// recipient cannot miss either; `Low`/`Normal` case priority maps to
    /// `Normal` notification priority rather than `Low`, since any
    /// case-triggered notification still warrants attention.
    #[must_use]
    pub fn priority_for(case_priority: CasePriority) -> NotificationPriority {
        match case_priority {
            CasePriority::Urgent | CasePriority::High => NotificationPriority::High,
            CasePriority::Normal | CasePriority::Low => NotificationPriority::Normal,
        }
    }

    /// Derives notification priority from both the triggering case's
    /// priority and `event_key`: a `payment_`/`invoice_`-prefixed event
    /// always escalates to `High`, regardless of case priority, since those
    /// touch money and a recipient should never triage them as routine.
    #[must_use]
    pub fn priority_for_event(event_key: &str, case_priority: CasePriority) -> NotificationPriority {
        if event_key.starts_with("payment_") || event_key.starts_with("invoice_") {
            NotificationPriority::High
        } else {
            Self::priority_for(case_priority)
        }
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

    #[test]
    fn urgent_and_high_case_priority_map_to_high() {
        assert_eq!(
            Notification::priority_for(CasePriority::Urgent),
            NotificationPriority::High
        );
        assert_eq!(
            Notification::priority_for(CasePriority::High),
            NotificationPriority::High
        );
    }

    #[test]
    fn normal_and_low_case_priority_map_to_normal() {
        assert_eq!(
            Notification::priority_for(CasePriority::Normal),
            NotificationPriority::Normal
        );
        assert_eq!(
            Notification::priority_for(CasePriority::Low),
            NotificationPriority::Normal
        );
    }

    #[test]
    fn payment_and_invoice_events_escalate_regardless_of_case_priority() {
        assert_eq!(
            Notification::priority_for_event("payment_overdue", CasePriority::Low),
            NotificationPriority::High
        );
        assert_eq!(
            Notification::priority_for_event("invoice_rejected", CasePriority::Low),
            NotificationPriority::High
        );
    }

    #[test]
    fn unrelated_events_fall_back_to_case_priority() {
        assert_eq!(
            Notification::priority_for_event("case.message.posted", CasePriority::Urgent),
            NotificationPriority::High
        );
        assert_eq!(
            Notification::priority_for_event("case.message.posted", CasePriority::Normal),
            NotificationPriority::Normal
        );
    }
}
