// crates/vmp-store-sqlite/src/notifications.rs
// ============================================================================
// Module: Notification Repository
// Description: CRUD for in-app notifications fanned out to individual users.
// Purpose: Persist per-user case event notices and their read state.
// Dependencies: rusqlite, vmp-core
// ============================================================================

use rusqlite::OptionalExtension;
use rusqlite::params;
use vmp_core::domain::Notification;
use vmp_core::domain::NotificationPriority;

use crate::error::SqliteStoreError;
use crate::store::Store;

fn priority_label(priority: NotificationPriority) -> &'static str {
    match priority {
        NotificationPriority::Low => "low",
        NotificationPriority::Normal => "normal",
        NotificationPriority::High => "high",
    }
}

fn parse_priority(label: &str) -> Result<NotificationPriority, SqliteStoreError> {
    match label {
        "low" => Ok(NotificationPriority::Low),
        "normal" => Ok(NotificationPriority::Normal),
        "high" => Ok(NotificationPriority::High),
        other => Err(SqliteStoreError::Invalid(format!("unknown notification priority {other}"))),
    }
}

fn row_to_notification(row: &rusqlite::Row<'_>) -> rusqlite::Result<Notification> {
    let priority_label: String = row.get("priority")?;
    Ok(Notification {
        notification_id: row.get("notification_id")?,
        user_id: row.get("user_id")?,
        case_id: row.get("case_id")?,
        event_key: row.get("event_key")?,
        summary: row.get("summary")?,
        priority: parse_priority(&priority_label).unwrap_or(NotificationPriority::Normal),
        created_at: row.get("created_at")?,
        read_at: row.get("read_at")?,
    })
}

impl Store {
    /// Inserts a new notification row.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::Conflict`] if `notification_id` exists.
    pub fn insert_notification(&self, notification: &Notification) -> Result<(), SqliteStoreError> {
        self.with_connection(|conn| self.insert_notification_with(conn, notification))
    }

    /// Same as [`Store::insert_notification`], against an already-open
    /// connection; used when a notification is the final step of a larger
    /// transaction (case decisions, invite acceptance).
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::Conflict`] if `notification_id` exists.
    pub fn insert_notification_with(
        &self,
        conn: &rusqlite::Connection,
        notification: &Notification,
    ) -> Result<(), SqliteStoreError> {
        conn.execute(
            "INSERT INTO notifications (notification_id, user_id, case_id, event_key, summary, priority, created_at, read_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8)",
            params![
                notification.notification_id,
                notification.user_id,
                notification.case_id,
                notification.event_key,
                notification.summary,
                priority_label(notification.priority),
                notification.created_at,
                notification.read_at,
            ],
        )?;
        Ok(())
    }

    /// Lists a user's notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] on a backend failure.
    pub fn list_notifications_for_user(&self, user_id: &str) -> Result<Vec<Notification>, SqliteStoreError> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM notifications WHERE user_id = ?1 ORDER BY created_at DESC",
            )?;
            let rows = stmt.query_map([user_id], row_to_notification)?.collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Marks a notification read. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::NotFound`] if no notification matches.
    pub fn mark_notification_read(
        &self,
        notification_id: &str,
        read_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), SqliteStoreError> {
        self.with_connection(|conn| {
            let changed = conn.execute(
                "UPDATE notifications SET read_at = ?1 WHERE notification_id = ?2 AND read_at IS NULL",
                params![read_at, notification_id],
            )?;
            if changed == 0 {
                let exists: Option<i64> = conn
                    .query_row(
                        "SELECT 1 FROM notifications WHERE notification_id = ?1",
                        [notification_id],
                        |row| row.get(0),
                    )
                    .optional()?;
                if exists.is_none() {
                    return Err(SqliteStoreError::NotFound(format!("notification {notification_id}")));
                }
            }
            Ok(())
        })
    }
}
