// crates/vmp-store-sqlite/src/users.rs
// ============================================================================
// Module: User Repository
// Description: CRUD for users and the `vmp_authz::UserStore` port adapter.
// Purpose: Persist human principals and answer authentication lookups.
// Dependencies: rusqlite, vmp-core, vmp-authz, async-trait
// ============================================================================

use async_trait::async_trait;
use rusqlite::OptionalExtension;
use rusqlite::params;
use vmp_authz::AuthzError;
use vmp_authz::Principal;
use vmp_authz::UserStore;
use vmp_core::domain::Scope;
use vmp_core::domain::User;
use vmp_core::domain::UserRole;

use crate::error::SqliteStoreError;
use crate::store::Store;

fn role_label(role: UserRole) -> &'static str {
    match role {
        UserRole::Owner => "owner",
        UserRole::Admin => "admin",
        UserRole::Member => "member",
        UserRole::Internal => "internal",
    }
}

fn parse_role(label: &str) -> Result<UserRole, SqliteStoreError> {
    match label {
        "owner" => Ok(UserRole::Owner),
        "admin" => Ok(UserRole::Admin),
        "member" => Ok(UserRole::Member),
        "internal" => Ok(UserRole::Internal),
        other => Err(SqliteStoreError::Invalid(format!("unknown user role {other}"))),
    }
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let role_label: String = row.get("role")?;
    let scope_json: Option<String> = row.get("scope_json")?;
    let active: i64 = row.get("active")?;
    Ok(User {
        user_id: row.get("user_id")?,
        tenant_id: row.get("tenant_id")?,
        email: row.get("email")?,
        password_hash: row.get("password_hash")?,
        external_auth_id: row.get("external_auth_id")?,
        role: parse_role(&role_label).unwrap_or(UserRole::Member),
        scope: scope_json.and_then(|json| serde_json::from_str::<Scope>(&json).ok()),
        active: active != 0,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        deleted_at: row.get("deleted_at")?,
    })
}

impl Store {
    /// Inserts a new user row.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::Conflict`] if `user_id` or `email` already
    /// exist.
    pub fn insert_user(&self, user: &User) -> Result<(), SqliteStoreError> {
        self.with_connection(|conn| self.insert_user_with(conn, user))
    }

    /// Same as [`Store::insert_user`], against an already-open connection;
    /// used when composing a user insert into a larger transaction (invite
    /// acceptance inserts a tenant and its owner user together).
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::Conflict`] if `user_id` or `email` already
    /// exist.
    pub fn insert_user_with(&self, conn: &rusqlite::Connection, user: &User) -> Result<(), SqliteStoreError> {
        let scope_json = user
            .scope
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        conn.execute(
            "INSERT INTO users (user_id, tenant_id, email, password_hash, external_auth_id, role, scope_json, active, created_at, updated_at, deleted_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11)",
            params![
                user.user_id,
                user.tenant_id,
                user.email.to_lowercase(),
                user.password_hash,
                user.external_auth_id,
                role_label(user.role),
                scope_json,
                i64::from(user.active),
                user.created_at,
                user.updated_at,
                user.deleted_at,
            ],
        )?;
        Ok(())
    }

    /// Activates every user belonging to `tenant_id` (vendor onboarding
    /// approval flips its users from provisional to active in one pass).
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] on a backend failure.
    pub fn activate_users_for_tenant(
        &self,
        conn: &rusqlite::Connection,
        tenant_id: &str,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), SqliteStoreError> {
        conn.execute(
            "UPDATE users SET active = 1, updated_at = ?1 WHERE tenant_id = ?2",
            params![now, tenant_id],
        )?;
        Ok(())
    }

    /// Looks up a user by their canonical identifier.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] on a backend failure.
    pub fn find_user_by_id(&self, user_id: &str) -> Result<Option<User>, SqliteStoreError> {
        self.with_connection(|conn| {
            conn.query_row("SELECT * FROM users WHERE user_id = ?1", [user_id], row_to_user)
                .optional()
                .map_err(SqliteStoreError::from)
        })
    }

    /// Looks up a user by their case-insensitive email.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] on a backend failure.
    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>, SqliteStoreError> {
        self.with_connection(|conn| {
            conn.query_row(
                "SELECT * FROM users WHERE email = ?1",
                [email.to_lowercase()],
                row_to_user,
            )
            .optional()
            .map_err(SqliteStoreError::from)
        })
    }

    /// Replaces a user's password hash, e.g. on password-reset redemption.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::NotFound`] if no user matches.
    pub fn update_user_password_hash(
        &self,
        conn: &rusqlite::Connection,
        user_id: &str,
        password_hash: &str,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), SqliteStoreError> {
        let changed = conn.execute(
            "UPDATE users SET password_hash = ?1, updated_at = ?2 WHERE user_id = ?3",
            params![password_hash, now, user_id],
        )?;
        if changed == 0 {
            return Err(SqliteStoreError::NotFound(format!("user {user_id}")));
        }
        Ok(())
    }

    /// Lists every active user belonging to `tenant_id`.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] on a backend failure.
    pub fn list_users_for_tenant(&self, tenant_id: &str) -> Result<Vec<User>, SqliteStoreError> {
        self.with_connection(|conn| {
            let mut stmt =
                conn.prepare("SELECT * FROM users WHERE tenant_id = ?1 AND deleted_at IS NULL")?;
            let rows = stmt.query_map([tenant_id], row_to_user)?.collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

#[async_trait]
impl UserStore for Store {
    async fn find_principal(&self, user_id: &str) -> Result<Option<(Principal, bool)>, AuthzError> {
        let user = self
            .find_user_by_id(user_id)
            .map_err(|err| AuthzError::Backend(err.to_string()))?;
        Ok(user.map(|user| {
            (
                Principal {
                    user_id: user.user_id,
                    tenant_id: user.tenant_id,
                    email: user.email,
                    role: user.role,
                    scope: user.scope,
                },
                user.active && user.deleted_at.is_none(),
            )
        }))
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

    fn sample_user(tenant_id: &str) -> User {
        User {
            user_id: new_id("USR", None),
            tenant_id: tenant_id.to_string(),
            email: "Jane.Doe@Example.Test".to_string(),
            password_hash: Some("hash".to_string()),
            external_auth_id: None,
            role: UserRole::Member,
            scope: None,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn email_lookup_is_case_insensitive() {
        let store = Store::open_in_memory().expect("open");
        let ids = vmp_core::new_tenant_ids("Acme");
        store
            .insert_tenant(&vmp_core::domain::Tenant {
                tenant_id: ids.tenant_id.clone(),
                client_id: ids.client_id,
                vendor_id: ids.vendor_id,
                name: "Acme".to_string(),
                email: "ops@acme.test".to_string(),
                phone: None,
                address: None,
                settings: serde_json::json!({}),
                status: vmp_core::domain::TenantStatus::Active,
                onboarding_status: "pending".to_string(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
                deleted_at: None,
            })
            .expect("insert tenant");

        let user = sample_user(&ids.tenant_id);
        store.insert_user(&user).expect("insert user");

        let found = store.find_user_by_email("jane.doe@example.test").expect("find").expect("present");
        assert_eq!(found.user_id, user.user_id);
    }

    #[tokio::test]
    async fn user_store_port_reports_inactive_accounts() {
        let store = Store::open_in_memory().expect("open");
        let ids = vmp_core::new_tenant_ids("Acme");
        store
            .insert_tenant(&vmp_core::domain::Tenant {
                tenant_id: ids.tenant_id.clone(),
                client_id: ids.client_id,
                vendor_id: ids.vendor_id,
                name: "Acme".to_string(),
                email: "ops@acme.test".to_string(),
                phone: None,
                address: None,
                settings: serde_json::json!({}),
                status: vmp_core::domain::TenantStatus::Active,
                onboarding_status: "pending".to_string(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
                deleted_at: None,
            })
            .expect("insert tenant");

        let mut user = sample_user(&ids.tenant_id);
        user.active = false;
        store.insert_user(&user).expect("insert user");

        let (_, active) = UserStore::find_principal(&store, &user.user_id)
            .await
            .expect("find")
            .expect("present");
        assert!(!active);
    }

    #[tokio::test]
    async fn user_store_port_reports_missing_user_as_none() {
        let store = Store::open_in_memory().expect("open");
        let found = UserStore::find_principal(&store, "USR-NOPE0000").await.expect("find");
        assert!(found.is_none());
    }
}
