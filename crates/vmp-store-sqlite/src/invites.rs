// crates/vmp-store-sqlite/src/invites.rs
// ============================================================================
// Module: Invite Repository
// Description: CRUD for single-use relationship invites.
// Purpose: Persist invites addressed only by their token hash, never the
//          cleartext token.
// Dependencies: rusqlite, vmp-core
// ============================================================================

use rusqlite::OptionalExtension;
use rusqlite::params;
use vmp_core::domain::Invite;
use vmp_core::domain::InviteStatus;

use crate::error::SqliteStoreError;
use crate::store::Store;

fn status_label(status: InviteStatus) -> &'static str {
    match status {
        InviteStatus::Pending => "pending",
        InviteStatus::Accepted => "accepted",
        InviteStatus::Expired => "expired",
        InviteStatus::Revoked => "revoked",
    }
}

fn parse_status(label: &str) -> Result<InviteStatus, SqliteStoreError> {
    match label {
        "pending" => Ok(InviteStatus::Pending),
        "accepted" => Ok(InviteStatus::Accepted),
        "expired" => Ok(InviteStatus::Expired),
        "revoked" => Ok(InviteStatus::Revoked),
        other => Err(SqliteStoreError::Invalid(format!("unknown invite status {other}"))),
    }
}

fn row_to_invite(row: &rusqlite::Row<'_>) -> rusqlite::Result<Invite> {
    let status_label: String = row.get("status")?;
    Ok(Invite {
        invite_id: row.get("invite_id")?,
        inviting_tenant_id: row.get("inviting_tenant_id")?,
        invitee_email: row.get("invitee_email")?,
        token_hash: row.get("token_hash")?,
        status: parse_status(&status_label).unwrap_or(InviteStatus::Expired),
        created_by: row.get("created_by")?,
        created_at: row.get("created_at")?,
        expires_at: row.get("expires_at")?,
        accepted_at: row.get("accepted_at")?,
        resulting_tenant_id: row.get("resulting_tenant_id")?,
    })
}

impl Store {
    /// Inserts a new invite row.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::Conflict`] on an `invite_id` or
    /// `token_hash` collision.
    pub fn insert_invite(&self, invite: &Invite) -> Result<(), SqliteStoreError> {
        self.with_connection(|conn| {
            conn.execute(
                "INSERT INTO invites (invite_id, inviting_tenant_id, invitee_email, token_hash, status, created_by, created_at, expires_at, accepted_at, resulting_tenant_id)
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)",
                params![
                    invite.invite_id,
                    invite.inviting_tenant_id,
                    invite.invitee_email,
                    invite.token_hash,
                    status_label(invite.status),
                    invite.created_by,
                    invite.created_at,
                    invite.expires_at,
                    invite.accepted_at,
                    invite.resulting_tenant_id,
                ],
            )?;
            Ok(())
        })
    }

    /// Looks up an invite by the SHA-256 hex digest of its token.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] on a backend failure.
    pub fn find_invite_by_token_hash(&self, token_hash: &str) -> Result<Option<Invite>, SqliteStoreError> {
        self.with_connection(|conn| {
            conn.query_row("SELECT * FROM invites WHERE token_hash = ?1", [token_hash], row_to_invite)
                .optional()
                .map_err(SqliteStoreError::from)
        })
    }

    /// Marks an invite accepted, recording the tenant it produced.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::NotFound`] if no invite matches.
    pub fn mark_invite_accepted(
        &self,
        invite_id: &str,
        accepted_at: chrono::DateTime<chrono::Utc>,
        resulting_tenant_id: &str,
    ) -> Result<(), SqliteStoreError> {
        self.with_connection(|conn| self.mark_invite_accepted_with(conn, invite_id, accepted_at, resulting_tenant_id))
    }

    /// Same as [`Store::mark_invite_accepted`], against an already-open
    /// connection; the last step of the invite-acceptance transaction.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::NotFound`] if no invite matches.
    pub fn mark_invite_accepted_with(
        &self,
        conn: &rusqlite::Connection,
        invite_id: &str,
        accepted_at: chrono::DateTime<chrono::Utc>,
        resulting_tenant_id: &str,
    ) -> Result<(), SqliteStoreError> {
        let changed = conn.execute(
            "UPDATE invites SET status = 'accepted', accepted_at = ?1, resulting_tenant_id = ?2 WHERE invite_id = ?3",
            params![accepted_at, resulting_tenant_id, invite_id],
        )?;
        if changed == 0 {
            return Err(SqliteStoreError::NotFound(format!("invite {invite_id}")));
        }
        Ok(())
    }

    /// Marks an invite revoked.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::NotFound`] if no invite matches.
    pub fn mark_invite_revoked(&self, invite_id: &str) -> Result<(), SqliteStoreError> {
        self.with_connection(|conn| {
            let changed =
                conn.execute("UPDATE invites SET status = 'revoked' WHERE invite_id = ?1", [invite_id])?;
            if changed == 0 {
                return Err(SqliteStoreError::NotFound(format!("invite {invite_id}")));
            }
            Ok(())
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

    fn sample() -> Invite {
        Invite {
            invite_id: "INV-1".to_string(),
            inviting_tenant_id: "TNT-AAAA1111".to_string(),
            invitee_email: "vendor@example.test".to_string(),
            token_hash: "hash-of-token".to_string(),
            status: InviteStatus::Pending,
            created_by: "USR-1".to_string(),
            created_at: Utc::now(),
            expires_at: Utc::now() + chrono::Duration::hours(1),
            accepted_at: None,
            resulting_tenant_id: None,
        }
    }

    #[test]
    fn insert_then_find_by_token_hash() {
        let store = Store::open_in_memory().expect("open");
        let invite = sample();
        store.insert_invite(&invite).expect("insert");

        let found = store.find_invite_by_token_hash(&invite.token_hash).expect("find").expect("present");
        assert_eq!(found.invite_id, invite.invite_id);
    }

    #[test]
    fn accepting_records_resulting_tenant() {
        let store = Store::open_in_memory().expect("open");
        let invite = sample();
        store.insert_invite(&invite).expect("insert");
        store.mark_invite_accepted(&invite.invite_id, Utc::now(), "TNT-NEW0000").expect("accept");

        let found = store.find_invite_by_token_hash(&invite.token_hash).expect("find").expect("present");
        assert_eq!(found.status, InviteStatus::Accepted);
        assert_eq!(found.resulting_tenant_id.as_deref(), Some("TNT-NEW0000"));
    }

    #[test]
    fn revoking_missing_invite_is_not_found() {
        let store = Store::open_in_memory().expect("open");
        let err = store.mark_invite_revoked("INV-NOPE").unwrap_err();
        assert!(matches!(err, SqliteStoreError::NotFound(_)));
    }
}
