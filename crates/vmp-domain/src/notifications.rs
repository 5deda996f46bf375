// crates/vmp-domain/src/notifications.rs
// ============================================================================
// Module: Notification Service
// Description: Fan-out, unread counting, and read-tracking for in-app
//              notifications triggered by case events.
// Purpose: Give case-engine and messaging operations one call to notify a
//          set of users without duplicating priority derivation.
// Dependencies: vmp-core, vmp-store-sqlite
// ============================================================================

use std::sync::Arc;

use vmp_core::Clock;
use vmp_core::domain::CasePriority;
use vmp_core::domain::Notification;
use vmp_core::domain::NotificationPriority;
use vmp_core::new_id;
use vmp_store_sqlite::Store;

use crate::error::DomainError;

/// Breakdown returned by [`NotificationService::unread_count`]. `payment`
/// and `case` partition on the `event_key` prefix (`payment_*` vs.
/// everything else); `critical` is a cross-cutting count of
/// [`NotificationPriority::High`] items and overlaps with both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UnreadCounts {
    pub total: usize,
    pub payment: usize,
    pub case: usize,
    pub critical: usize,
}

/// Notification fan-out and read-state tracking, backed by one [`Store`]
/// and a [`Clock`].
///
/// This service is fire-and-forget by design: a caller failing to notify a
/// user never rolls back the case mutation that triggered it. Callers that
/// need the notification written inside the same transaction as the
/// triggering change should call [`Store::insert_notification_with`]
/// directly rather than through this service.
pub struct NotificationService {
    store: Arc<Store>,
    clock: Arc<dyn Clock>,
}

impl NotificationService {
    #[must_use]
    pub fn new(store: Arc<Store>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Notifies a single user about a case event.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Store`] on a backend failure.
    pub fn notify(
        &self,
        user_id: &str,
        case_id: &str,
        event_key: &str,
        summary: &str,
        case_priority: CasePriority,
    ) -> Result<Notification, DomainError> {
        let notification = Notification {
            notification_id: new_id("NTF", None),
            user_id: user_id.to_string(),
            case_id: case_id.to_string(),
            event_key: event_key.to_string(),
            summary: summary.to_string(),
            priority: Notification::priority_for_event(event_key, case_priority),
            created_at: self.clock.now(),
            read_at: None,
        };
        self.store.insert_notification(&notification)?;
        Ok(notification)
    }

    /// Notifies every user in `user_ids` about the same case event. Each
    /// notification is inserted independently; one failure does not prevent
    /// the rest from being attempted.
    ///
    /// # Errors
    ///
    /// Returns the first [`DomainError::Store`] encountered, after
    /// attempting every recipient.
    pub fn notify_many(
        &self,
        user_ids: &[String],
        case_id: &str,
        event_key: &str,
        summary: &str,
        case_priority: CasePriority,
    ) -> Result<Vec<Notification>, DomainError> {
        let mut notifications = Vec::with_capacity(user_ids.len());
        let mut first_error = None;
        for user_id in user_ids {
            match self.notify(user_id, case_id, event_key, summary, case_priority) {
                Ok(notification) => notifications.push(notification),
                Err(err) if first_error.is_none() => first_error = Some(err),
                Err(_) => {}
            }
        }
        if let Some(err) = first_error {
            return Err(err);
        }
        Ok(notifications)
    }

    /// Lists a user's notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Store`] on a backend failure.
    pub fn list_for_user(&self, user_id: &str) -> Result<Vec<Notification>, DomainError> {
        Ok(self.store.list_notifications_for_user(user_id)?)
    }

    /// Counts a user's unread notifications, broken down by category.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Store`] on a backend failure.
    pub fn unread_count(&self, user_id: &str) -> Result<UnreadCounts, DomainError> {
        let mut counts = UnreadCounts::default();
        for notification in self.store.list_notifications_for_user(user_id)?.iter().filter(|n| n.read_at.is_none()) {
            counts.total += 1;
            if notification.event_key.starts_with("payment_") {
                counts.payment += 1;
            } else {
                counts.case += 1;
            }
            if notification.priority == NotificationPriority::High {
                counts.critical += 1;
            }
        }
        Ok(counts)
    }

    /// Marks a notification read. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NotFound`] if `notification_id` does not
    /// exist.
    pub fn mark_read(&self, notification_id: &str) -> Result<(), DomainError> {
        Ok(self.store.mark_notification_read(notification_id, self.clock.now())?)
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
    use vmp_core::clock::FixedClock;

    use super::*;

    fn service() -> NotificationService {
        let store = Arc::new(Store::open_in_memory().expect("open"));
        let clock = Arc::new(FixedClock::new(chrono::Utc::now()));
        NotificationService::new(store, clock)
    }

    #[test]
    fn urgent_case_priority_yields_high_notification_priority() {
        let service = service();
        let notification = service
            .notify("USR-1", "CASE-1", "case.escalated", "Case escalated", CasePriority::Urgent)
            .expect("notify");
        assert_eq!(notification.priority, vmp_core::domain::NotificationPriority::High);
    }

    #[test]
    fn unread_count_reflects_read_state() {
        let service = service();
        service.notify("USR-1", "CASE-1", "case.message.posted", "New message", CasePriority::Normal).expect("notify");
        let second = service.notify("USR-1", "CASE-1", "case.message.posted", "Another message", CasePriority::Normal).expect("notify");
        assert_eq!(service.unread_count("USR-1").expect("count").total, 2);

        service.mark_read(&second.notification_id).expect("mark read");
        assert_eq!(service.unread_count("USR-1").expect("count").total, 1);
    }

    #[test]
    fn unread_count_breaks_down_by_category() {
        let service = service();
        service.notify("USR-1", "CASE-1", "payment_overdue", "Payment overdue", CasePriority::Low).expect("notify");
        service.notify("USR-1", "CASE-1", "case.message.posted", "New message", CasePriority::Normal).expect("notify");
        service.notify("USR-1", "CASE-1", "invoice_exception_raised", "Invoice exception", CasePriority::Low).expect("notify");

        let counts = service.unread_count("USR-1").expect("count");
        assert_eq!(counts.total, 3);
        assert_eq!(counts.payment, 1);
        assert_eq!(counts.case, 2);
        assert_eq!(counts.critical, 2);
    }

    #[test]
    fn notify_many_fans_out_to_every_recipient() {
        let service = service();
        let recipients = vec!["USR-1".to_string(), "USR-2".to_string(), "USR-3".to_string()];
        let notifications = service
            .notify_many(&recipients, "CASE-1", "case.onboarding.approved", "Onboarding approved", CasePriority::Normal)
            .expect("notify many");
        assert_eq!(notifications.len(), 3);
    }
}
