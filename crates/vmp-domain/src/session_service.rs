// crates/vmp-domain/src/session_service.rs
// ============================================================================
// Module: Session Service
// Description: Login, logout, and bearer-session issuance.
// Purpose: The one place a cleartext password is checked and a session
//          token is minted, so vmp-server never touches a password hash.
// Dependencies: vmp-core, vmp-authz, vmp-store-sqlite, chrono
// ============================================================================

use std::sync::Arc;

use chrono::Duration;
use vmp_authz::hash_token;
use vmp_core::Clock;
use vmp_core::domain::User;
use vmp_store_sqlite::Store;

use crate::error::DomainError;
use crate::password::verify_password;
use crate::tokens::generate_token;

/// A freshly issued session: the cleartext bearer token (returned exactly
/// once) and the user it belongs to.
#[derive(Debug)]
pub struct IssuedSession {
    pub token: String,
    pub user: User,
}

/// Login/logout and session-lifetime management, backed by one [`Store`]
/// and a [`Clock`].
pub struct SessionService {
    store: Arc<Store>,
    clock: Arc<dyn Clock>,
    session_ttl: Duration,
}

impl SessionService {
    #[must_use]
    pub fn new(store: Arc<Store>, clock: Arc<dyn Clock>, session_ttl: Duration) -> Self {
        Self { store, clock, session_ttl }
    }

    /// Verifies `email`/`password` and mints a new bearer session.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Forbidden`] when the email is unknown, the
    /// password does not match, or the user is inactive -- deliberately the
    /// same error in every case so a caller cannot enumerate registered
    /// emails by timing or message differences.
    pub async fn login(&self, email: &str, password: &str) -> Result<IssuedSession, DomainError> {
        let invalid = || DomainError::forbidden("invalid email or password");
        let user = self.store.find_user_by_email(email)?.ok_or_else(invalid)?;
        if !user.active || user.deleted_at.is_some() {
            return Err(invalid());
        }
        let hash = user.password_hash.clone().ok_or_else(invalid)?;
        if !verify_password(password.to_string(), hash).await? {
            return Err(invalid());
        }

        let token = generate_token();
        let now = self.clock.now();
        self.store.insert_session(&hash_token(&token), &user.user_id, &user.tenant_id, now, now + self.session_ttl)?;
        Ok(IssuedSession { token, user })
    }

    /// Mints a session for `user` without checking a password, for flows
    /// that have already established the caller's identity some other way
    /// (invite redemption, where the owner is deliberately left inactive
    /// until onboarding is approved and so could never pass [`Self::login`]).
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Store`] on a backend failure.
    pub fn issue_for_user(&self, user: &User) -> Result<IssuedSession, DomainError> {
        let token = generate_token();
        let now = self.clock.now();
        self.store.insert_session(&hash_token(&token), &user.user_id, &user.tenant_id, now, now + self.session_ttl)?;
        Ok(IssuedSession { token, user: user.clone() })
    }

    /// Revokes the session backing `bearer_token`. Idempotent: revoking an
    /// already-revoked or unknown session never errors, since a logout
    /// caller has no further use for that distinction.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Store`] on a backend failure.
    pub fn logout(&self, bearer_token: &str) -> Result<(), DomainError> {
        let now = self.clock.now();
        match self.store.revoke_session(&hash_token(bearer_token), now) {
            Ok(()) | Err(vmp_store_sqlite::SqliteStoreError::NotFound(_)) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
