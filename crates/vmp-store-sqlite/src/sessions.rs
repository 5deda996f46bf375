// crates/vmp-store-sqlite/src/sessions.rs
// ============================================================================
// Module: Session Repository
// Description: CRUD for sessions and the `vmp_authz::SessionStore` port adapter.
// Purpose: Persist bearer-token sessions addressed only by their hash.
// Dependencies: rusqlite, vmp-core, vmp-authz, async-trait
// ============================================================================

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use rusqlite::OptionalExtension;
use rusqlite::params;
use vmp_authz::AuthzError;
use vmp_authz::SessionRecord;
use vmp_authz::SessionStore;

use crate::error::SqliteStoreError;
use crate::store::Store;

impl Store {
    /// Inserts a new session row, keyed by the SHA-256 hex of its bearer
    /// token (see `vmp_authz::hash_token`). The cleartext token is never
    /// persisted.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::Conflict`] on a token-hash collision.
    pub fn insert_session(
        &self,
        token_hash: &str,
        user_id: &str,
        tenant_id: &str,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<(), SqliteStoreError> {
        self.with_connection(|conn| {
            conn.execute(
                "INSERT INTO sessions (token_hash, user_id, tenant_id, created_at, expires_at, revoked_at)
                 VALUES (?1,?2,?3,?4,?5,NULL)",
                params![token_hash, user_id, tenant_id, created_at, expires_at],
            )?;
            Ok(())
        })
    }

    /// Marks a session revoked as of `revoked_at`. Idempotent: revoking an
    /// already-revoked session is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::NotFound`] if no session matches.
    pub fn revoke_session(&self, token_hash: &str, revoked_at: DateTime<Utc>) -> Result<(), SqliteStoreError> {
        self.with_connection(|conn| {
            let changed = conn.execute(
                "UPDATE sessions SET revoked_at = ?1 WHERE token_hash = ?2 AND revoked_at IS NULL",
                params![revoked_at, token_hash],
            )?;
            if changed == 0 {
                let exists: Option<i64> = conn
                    .query_row("SELECT 1 FROM sessions WHERE token_hash = ?1", [token_hash], |row| row.get(0))
                    .optional()?;
                if exists.is_none() {
                    return Err(SqliteStoreError::NotFound(format!("session {token_hash}")));
                }
            }
            Ok(())
        })
    }

    fn find_session_record(&self, token_hash: &str) -> Result<Option<SessionRecord>, SqliteStoreError> {
        self.with_connection(|conn| {
            conn.query_row(
                "SELECT user_id, tenant_id, expires_at, revoked_at FROM sessions WHERE token_hash = ?1",
                [token_hash],
                |row| {
                    Ok(SessionRecord {
                        user_id: row.get("user_id")?,
                        tenant_id: row.get("tenant_id")?,
                        expires_at: row.get("expires_at")?,
                        revoked_at: row.get("revoked_at")?,
                    })
                },
            )
            .optional()
            .map_err(SqliteStoreError::from)
        })
    }
}

#[async_trait]
impl SessionStore for Store {
    async fn find_session(&self, token_hash: &str) -> Result<Option<SessionRecord>, AuthzError> {
        self.find_session_record(token_hash).map_err(|err| AuthzError::Backend(err.to_string()))
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
    use vmp_authz::hash_token;

    use super::*;

    #[tokio::test]
    async fn inserted_session_resolves_by_hash() {
        let store = Store::open_in_memory().expect("open");
        let now = Utc::now();
        let hash = hash_token("a-bearer-token");
        store
            .insert_session(&hash, "USR-1", "TNT-1", now, now + chrono::Duration::hours(1))
            .expect("insert");

        let record = SessionStore::find_session(&store, &hash).await.expect("find").expect("present");
        assert_eq!(record.user_id, "USR-1");
        assert!(record.revoked_at.is_none());
    }

    #[tokio::test]
    async fn revoke_marks_session_dead() {
        let store = Store::open_in_memory().expect("open");
        let now = Utc::now();
        let hash = hash_token("a-bearer-token");
        store
            .insert_session(&hash, "USR-1", "TNT-1", now, now + chrono::Duration::hours(1))
            .expect("insert");
        store.revoke_session(&hash, now).expect("revoke");

        let record = SessionStore::find_session(&store, &hash).await.expect("find").expect("present");
        assert!(record.revoked_at.is_some());
    }

    #[tokio::test]
    async fn revoking_missing_session_is_not_found() {
        let store = Store::open_in_memory().expect("open");
        let err = store.revoke_session("missing-hash", Utc::now()).unwrap_err();
        assert!(matches!(err, SqliteStoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn missing_session_resolves_to_none() {
        let store = Store::open_in_memory().expect("open");
        let found = SessionStore::find_session(&store, "missing-hash").await.expect("find");
        assert!(found.is_none());
    }
}
