// crates/vmp-authz/src/resolver.rs
// ============================================================================
// Module: Principal Resolver
// Description: Turns a bearer session token into an authenticated Principal.
// Purpose: Give the HTTP layer one fail-closed seam for authentication,
//          independent of how sessions and users are actually stored.
// Dependencies: vmp-core, async-trait, sha2, hex, chrono
// ============================================================================

//! ## Overview
//! Resolution happens once per inbound request: the bearer token is hashed
//! (never looked up or logged in cleartext), matched against an active,
//! unexpired, unrevoked session, and the owning user loaded and checked for
//! activity. [`SessionPrincipalResolver`] holds no cache across requests;
//! "per-request-only memoization" means a single resolution never looks up
//! the same session or user twice, not that results survive past the call.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sha2::Digest;
use sha2::Sha256;
use vmp_core::Clock;

use crate::error::AuthzError;
use crate::principal::Principal;

/// A resolved, still-valid session row, as reported by the session store port.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub user_id: String,
    pub tenant_id: String,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl SessionRecord {
    fn is_live_at(&self, at: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && at < self.expires_at
    }
}

/// Port onto session storage, implemented by `vmp-store-sqlite`.
///
/// Sessions are looked up by the SHA-256 hex digest of the bearer token,
/// never by the cleartext token itself.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Looks up a session by its token hash. Returns `Ok(None)` when no row
    /// matches; this is indistinguishable, from the caller's perspective,
    /// from a session that exists but has expired or been revoked.
    async fn find_session(&self, token_hash: &str) -> Result<Option<SessionRecord>, AuthzError>;
}

/// Port onto user storage, implemented by `vmp-store-sqlite`.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Loads the principal for `user_id`, or `Ok(None)` if absent or
    /// soft-deleted. Returns `active = false` rows too; the resolver itself
    /// decides whether an inactive user may authenticate.
    async fn find_principal(&self, user_id: &str) -> Result<Option<(Principal, bool)>, AuthzError>;
}

/// Resolves bearer tokens to [`Principal`]s via a session and user store.
#[async_trait]
pub trait PrincipalResolver: Send + Sync {
    /// Resolves `bearer_token` into an authenticated principal.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::InvalidSession`] when no live session matches,
    /// [`AuthzError::InactiveUser`] when the session's user cannot currently
    /// authenticate, and [`AuthzError::Backend`] on store failure.
    async fn resolve(&self, bearer_token: &str) -> Result<Principal, AuthzError>;
}

/// Hashes a bearer token the same way sessions are stored: SHA-256 hex.
#[must_use]
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Default [`PrincipalResolver`] backed by a session store, a user store,
/// and a clock for expiry comparison.
pub struct SessionPrincipalResolver {
    sessions: Arc<dyn SessionStore>,
    users: Arc<dyn UserStore>,
    clock: Arc<dyn Clock>,
}

impl SessionPrincipalResolver {
    /// Builds a resolver over the given session store, user store, and clock.
    #[must_use]
    pub fn new(sessions: Arc<dyn SessionStore>, users: Arc<dyn UserStore>, clock: Arc<dyn Clock>) -> Self {
        Self { sessions, users, clock }
    }

    async fn resolve_inner(&self, bearer_token: &str) -> Result<Principal, AuthzError> {
        let token_hash = hash_token(bearer_token);
        let session = self
            .sessions
            .find_session(&token_hash)
            .await?
            .ok_or(AuthzError::InvalidSession)?;
        if !session.is_live_at(self.clock.now()) {
            return Err(AuthzError::InvalidSession);
        }
        let (principal, active) = self
            .users
            .find_principal(&session.user_id)
            .await?
            .ok_or(AuthzError::InvalidSession)?;
        if !active {
            return Err(AuthzError::InactiveUser);
        }
        Ok(principal)
    }
}

#[async_trait]
impl PrincipalResolver for SessionPrincipalResolver {
    async fn resolve(&self, bearer_token: &str) -> Result<Principal, AuthzError> {
        self.resolve_inner(bearer_token).await
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
    use std::sync::Mutex;

    use vmp_core::FixedClock;
    use vmp_core::domain::UserRole;

    use super::*;

    struct FakeSessions(Mutex<Option<SessionRecord>>);

    #[async_trait]
    impl SessionStore for FakeSessions {
        async fn find_session(&self, _token_hash: &str) -> Result<Option<SessionRecord>, AuthzError> {
            Ok(self.0.lock().expect("lock").clone())
        }
    }

    struct FakeUsers;

    #[async_trait]
    impl UserStore for FakeUsers {
        async fn find_principal(&self, user_id: &str) -> Result<Option<(Principal, bool)>, AuthzError> {
            Ok(Some((
                Principal {
                    user_id: user_id.to_string(),
                    tenant_id: "TNT-AAAA1111".to_string(),
                    email: "a@example.test".to_string(),
                    role: UserRole::Member,
                    scope: None,
                },
                true,
            )))
        }
    }

    fn resolver(session: Option<SessionRecord>, now: DateTime<Utc>) -> SessionPrincipalResolver {
        SessionPrincipalResolver::new(
            Arc::new(FakeSessions(Mutex::new(session))),
            Arc::new(FakeUsers),
            Arc::new(FixedClock::new(now)),
        )
    }

    #[tokio::test]
    async fn missing_session_is_unauthenticated() {
        let now = Utc::now();
        let err = resolver(None, now).resolve_inner("tok").await.unwrap_err();
        assert!(matches!(err, AuthzError::InvalidSession));
    }

    #[tokio::test]
    async fn expired_session_is_unauthenticated() {
        let now = Utc::now();
        let session = SessionRecord {
            user_id: "USR-1".to_string(),
            tenant_id: "TNT-1".to_string(),
            expires_at: now - chrono::Duration::seconds(1),
            revoked_at: None,
        };
        let err = resolver(Some(session), now).resolve_inner("tok").await.unwrap_err();
        assert!(matches!(err, AuthzError::InvalidSession));
    }

    #[tokio::test]
    async fn revoked_session_is_unauthenticated() {
        let now = Utc::now();
        let session = SessionRecord {
            user_id: "USR-1".to_string(),
            tenant_id: "TNT-1".to_string(),
            expires_at: now + chrono::Duration::hours(1),
            revoked_at: Some(now),
        };
        let err = resolver(Some(session), now).resolve_inner("tok").await.unwrap_err();
        assert!(matches!(err, AuthzError::InvalidSession));
    }

    #[tokio::test]
    async fn live_session_resolves_to_principal() {
        let now = Utc::now();
        let session = SessionRecord {
            user_id: "USR-1".to_string(),
            tenant_id: "TNT-1".to_string(),
            expires_at: now + chrono::Duration::hours(1),
            revoked_at: None,
        };
        let principal = resolver(Some(session), now).resolve_inner("tok").await.expect("resolve");
        assert_eq!(principal.user_id, "USR-1");
    }

    #[tokio::test]
    async fn token_hash_is_deterministic_and_never_cleartext() {
        let hash_a = hash_token("super-secret-token");
        let hash_b = hash_token("super-secret-token");
        assert_eq!(hash_a, hash_b);
        assert_ne!(hash_a, "super-secret-token");
        assert_eq!(hash_a.len(), 64);
    }
}
