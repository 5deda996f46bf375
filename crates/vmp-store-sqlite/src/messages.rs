// crates/vmp-store-sqlite/src/messages.rs
// ============================================================================
// Module: Message Repository
// Description: CRUD for case thread messages, filtered by internal-note
//              visibility.
// Purpose: Guarantee internal notes never reach a non-internal reader,
//          independent of how the case itself is scoped.
// Dependencies: rusqlite, vmp-core, vmp-authz
// ============================================================================

use rusqlite::params;
use vmp_authz::AuthorizationFilters;
use vmp_core::domain::Channel;
use vmp_core::domain::Message;
use vmp_core::domain::SenderContext;

use crate::error::SqliteStoreError;
use crate::store::Store;

fn sender_context_label(context: SenderContext) -> &'static str {
    match context {
        SenderContext::Client => "client",
        SenderContext::Vendor => "vendor",
        SenderContext::Internal => "internal",
        SenderContext::System => "system",
        SenderContext::Ai => "ai",
    }
}

fn parse_sender_context(label: &str) -> Result<SenderContext, SqliteStoreError> {
    match label {
        "client" => Ok(SenderContext::Client),
        "vendor" => Ok(SenderContext::Vendor),
        "internal" => Ok(SenderContext::Internal),
        "system" => Ok(SenderContext::System),
        "ai" => Ok(SenderContext::Ai),
        other => Err(SqliteStoreError::Invalid(format!("unknown sender context {other}"))),
    }
}

fn channel_label(channel: Channel) -> &'static str {
    match channel {
        Channel::Portal => "portal",
        Channel::Whatsapp => "whatsapp",
        Channel::Email => "email",
        Channel::Slack => "slack",
    }
}

fn parse_channel(label: &str) -> Result<Channel, SqliteStoreError> {
    match label {
        "portal" => Ok(Channel::Portal),
        "whatsapp" => Ok(Channel::Whatsapp),
        "email" => Ok(Channel::Email),
        "slack" => Ok(Channel::Slack),
        other => Err(SqliteStoreError::Invalid(format!("unknown channel {other}"))),
    }
}

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    let sender_context_label: String = row.get("sender_context")?;
    let channel_label: String = row.get("channel")?;
    Ok(Message {
        message_id: row.get("message_id")?,
        case_id: row.get("case_id")?,
        sender_user_id: row.get("sender_user_id")?,
        sender_context: parse_sender_context(&sender_context_label).unwrap_or(SenderContext::Internal),
        channel: parse_channel(&channel_label).unwrap_or(Channel::Portal),
        is_internal_note: row.get("is_internal_note")?,
        body: row.get("body")?,
        classifier_hint: row.get("classifier_hint")?,
        created_at: row.get("created_at")?,
        edited_at: row.get("edited_at")?,
    })
}

impl Store {
    /// Inserts a new message row.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::Conflict`] if `message_id` already exists.
    pub fn insert_message(&self, message: &Message) -> Result<(), SqliteStoreError> {
        self.with_connection(|conn| self.insert_message_with(conn, message))
    }

    /// Same as [`Store::insert_message`], against an already-open
    /// connection; used when a message is posted as a side effect of a
    /// larger case transaction (e.g. an escalation's internal note).
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::Conflict`] if `message_id` already exists.
    pub fn insert_message_with(&self, conn: &rusqlite::Connection, message: &Message) -> Result<(), SqliteStoreError> {
        conn.execute(
            "INSERT INTO messages (message_id, case_id, sender_user_id, sender_context, channel, is_internal_note, body, classifier_hint, created_at, edited_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)",
            params![
                message.message_id,
                message.case_id,
                message.sender_user_id,
                sender_context_label(message.sender_context),
                channel_label(message.channel),
                message.is_internal_note,
                message.body,
                message.classifier_hint,
                message.created_at,
                message.edited_at,
            ],
        )?;
        Ok(())
    }

    /// Lists a case's messages in chronological order (ties broken by
    /// insertion order, via SQLite's implicit `rowid`), dropping internal
    /// notes unless `filters.can_see_internal_channel`.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] on a backend failure.
    pub fn list_messages_for_case(
        &self,
        case_id: &str,
        filters: &AuthorizationFilters,
    ) -> Result<Vec<Message>, SqliteStoreError> {
        self.with_connection(|conn| {
            let mut stmt =
                conn.prepare("SELECT * FROM messages WHERE case_id = ?1 ORDER BY created_at, rowid")?;
            let rows = stmt.query_map([case_id], row_to_message)?.collect::<Result<Vec<_>, _>>()?;
            Ok(rows
                .into_iter()
                .filter(|message| filters.can_see_internal_channel || !message.is_internal_note)
                .collect())
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

    fn seed_case(store: &Store, case_id: &str) {
        store
            .with_connection(|conn| {
                conn.execute(
                    "INSERT INTO cases (case_id, client_id, vendor_id, case_type, status, priority, owner_team, escalation_level, title, description, opened_by, metadata, created_at, updated_at, resolved_at) VALUES (?1,'TC-1','TV-1','general','open','normal','ap',0,'t','d','USR-1','{}',?2,?2,NULL)",
                    rusqlite::params![case_id, Utc::now()],
                )?;
                Ok(())
            })
            .expect("seed case");
    }

    fn message(case_id: &str, is_internal_note: bool) -> Message {
        Message {
            message_id: new_id("MSG", None),
            case_id: case_id.to_string(),
            sender_user_id: "USR-1".to_string(),
            sender_context: SenderContext::Internal,
            channel: Channel::Portal,
            is_internal_note,
            body: "note".to_string(),
            classifier_hint: None,
            created_at: Utc::now(),
            edited_at: None,
        }
    }

    #[test]
    fn internal_note_hidden_from_client_and_vendor_principals() {
        let store = Store::open_in_memory().expect("open");
        seed_case(&store, "CASE-1");
        store.insert_message(&message("CASE-1", false)).expect("insert");
        store.insert_message(&message("CASE-1", true)).expect("insert");

        let client_filters = AuthorizationFilters::for_client_tenant(&vmp_core::domain::Tenant {
            tenant_id: "TNT-1".to_string(),
            client_id: "TC-1".to_string(),
            vendor_id: "TV-1".to_string(),
            name: "Acme".to_string(),
            email: "a@example.test".to_string(),
            phone: None,
            address: None,
            settings: serde_json::json!({}),
            status: vmp_core::domain::TenantStatus::Active,
            onboarding_status: "complete".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        });
        let visible = store.list_messages_for_case("CASE-1", &client_filters).expect("list");
        assert_eq!(visible.len(), 1);
        assert!(!visible[0].is_internal_note);

        let internal_filters = AuthorizationFilters::internal_super("TNT-OPS");
        let all = store.list_messages_for_case("CASE-1", &internal_filters).expect("list");
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn messages_with_identical_timestamps_keep_insertion_order() {
        let store = Store::open_in_memory().expect("open");
        seed_case(&store, "CASE-1");
        let same_instant = Utc::now();
        let mut first = message("CASE-1", false);
        first.created_at = same_instant;
        first.body = "first".to_string();
        let mut second = message("CASE-1", false);
        second.created_at = same_instant;
        second.body = "second".to_string();
        store.insert_message(&first).expect("insert first");
        store.insert_message(&second).expect("insert second");

        let internal_filters = AuthorizationFilters::internal_super("TNT-OPS");
        let ordered = store.list_messages_for_case("CASE-1", &internal_filters).expect("list");
        assert_eq!(ordered.iter().map(|m| m.body.as_str()).collect::<Vec<_>>(), vec!["first", "second"]);
    }
}
