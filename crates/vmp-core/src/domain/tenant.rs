// crates/vmp-core/src/domain/tenant.rs
// ============================================================================
// Module: Tenant, User, Scope, Company
// Description: Principal organization model and the human principals it owns.
// Purpose: Ground every authorization decision in a stable tenant identity.
// Dependencies: serde, chrono
// ============================================================================

//! ## Overview
//! A tenant is a single organizational principal. It owns users and plays
//! client and/or vendor roles through [`super::relationship::Relationship`]
//! rows, addressed by its paired `TC-`/`TV-` identities (see `vmp-core::ids`).

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Tenant lifecycle status.
///
/// # Invariants
/// - Transitions are one-directional in practice (active -> suspended ->
///   terminated) but this type does not enforce that; callers do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantStatus {
    /// Tenant may transact normally.
    Active,
    /// Tenant is temporarily blocked from new activity.
    Suspended,
    /// Tenant is permanently retired.
    Terminated,
}

/// A principal organization: owns users, plays client and/or vendor roles.
///
/// # Invariants
/// - `tenant_id`, `client_id`, `vendor_id` are reserved together at creation
///   (see [`crate::ids::new_tenant_ids`]) and never reassigned.
/// - The shared 8-character suffix across the three IDs is unique across
///   tenants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    /// Canonical tenant identifier (`TNT-`).
    pub tenant_id: String,
    /// Paired client-facing identifier (`TC-`).
    pub client_id: String,
    /// Paired vendor-facing identifier (`TV-`).
    pub vendor_id: String,
    /// Display name.
    pub name: String,
    /// Primary contact email.
    pub email: String,
    /// Primary contact phone number.
    pub phone: Option<String>,
    /// Mailing or registered address.
    pub address: Option<String>,
    /// Free-form tenant settings (branding, preferences).
    pub settings: serde_json::Value,
    /// Lifecycle status.
    pub status: TenantStatus,
    /// Onboarding progress marker ("pending" at creation).
    pub onboarding_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft-delete tombstone.
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A company scoped under a client tenant, used for internal-user scoping.
///
/// # Invariants
/// - `tenant_id` always refers to a tenant acting as a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    /// Company identifier (`CO-`).
    pub company_id: String,
    /// Owning client tenant.
    pub tenant_id: String,
    /// Optional group identifier for scope=group grouping.
    pub group_id: Option<String>,
    /// Display name.
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// User role within their tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Tenant founder/primary administrator.
    Owner,
    /// Administrative privileges within the tenant.
    Admin,
    /// Ordinary tenant member.
    Member,
    /// Platform-internal operator (ops/procurement/ap/finance staff).
    Internal,
}

/// Scope of companies an internal user may see.
///
/// # Invariants
/// - Only meaningful for `UserRole::Internal`; non-internal users derive
///   their scope from their own tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scope {
    /// Sees every company in one group.
    Group {
        /// Group identifier.
        group_id: String,
    },
    /// Sees exactly one company.
    Company {
        /// Company identifier.
        company_id: String,
    },
    /// Sees every company in the tenant (unbounded).
    Super,
}

/// A human principal belonging to exactly one tenant.
///
/// # Invariants
/// - `email` is unique, case-insensitively, across all tenants.
/// - Exactly one of `password_hash` or `external_auth_id` is present.
/// - `scope` is only meaningful when `role == UserRole::Internal`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User identifier (`USR-`).
    pub user_id: String,
    /// Owning tenant.
    pub tenant_id: String,
    /// Case-insensitively unique email.
    pub email: String,
    /// Argon2id password hash, when password auth is configured.
    pub password_hash: Option<String>,
    /// External identity-provider subject, when OAuth/SSO is configured.
    pub external_auth_id: Option<String>,
    /// Role within the tenant.
    pub role: UserRole,
    /// Company-visibility scope (internal users only).
    pub scope: Option<Scope>,
    /// Whether the account can currently authenticate.
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Returns true if this user is a platform-internal operator.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(self.role, UserRole::Internal)
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
    fn internal_role_detection() {
        let mut user = sample_user();
        assert!(!user.is_internal());
        user.role = UserRole::Internal;
        assert!(user.is_internal());
    }

    fn sample_user() -> User {
        User {
            user_id: "USR-AAAA1111".to_string(),
            tenant_id: "TNT-AAAA1111".to_string(),
            email: "a@example.test".to_string(),
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
}
