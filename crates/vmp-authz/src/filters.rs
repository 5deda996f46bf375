// crates/vmp-authz/src/filters.rs
// ============================================================================
// Module: Authorization Filters
// Description: The row-visibility rule set every domain-layer query must
//              apply, expressed as an owned value rather than a trait object.
// Purpose: Make "forgot to filter" a compile error, not a code review finding.
// Dependencies: vmp-core
// ============================================================================

//! ## Overview
//! `vmp-domain` functions take an [`AuthorizationFilters`] by value, never a
//! `Principal` plus a database handle. There is no "admin bypass" variant
//! and no way to construct an unrestricted filter except through
//! [`AuthorizationFilters::internal_super`], so a reviewer scanning call
//! sites for that one constructor name can audit every unrestricted query
//! in the codebase.

use std::collections::BTreeSet;

use vmp_core::domain::Tenant;

/// The set of counterpart tenant IDs a principal may see, on one side of a
/// case (client or vendor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
    /// Every ID on this side is visible (internal `Scope::Super` only).
    All,
    /// Exactly these IDs are visible.
    Only(BTreeSet<String>),
}

impl Visibility {
    /// True when `id` is within this visibility set.
    #[must_use]
    pub fn allows(&self, id: &str) -> bool {
        match self {
            Visibility::All => true,
            Visibility::Only(ids) => ids.contains(id),
        }
    }
}

/// The row-visibility rules a domain call must apply to every case, message,
/// evidence row, and notification it touches.
///
/// # Invariants
/// - There is exactly one way to obtain an unrestricted filter:
///   [`AuthorizationFilters::internal_super`]. Every other constructor
///   produces a filter scoped to a specific tenant or company set.
/// - `can_see_internal_channel` is true only for internal principals; a
///   client or vendor principal must never observe `isInternalNote=true`
///   messages regardless of case visibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationFilters {
    /// Tenant the acting principal belongs to (for audit/notification targeting).
    pub principal_tenant_id: String,
    /// Client-side tenants visible to this principal.
    pub visible_clients: Visibility,
    /// Vendor-side tenants visible to this principal.
    pub visible_vendors: Visibility,
    /// Whether the principal may see `isInternalNote=true` messages and notes.
    pub can_see_internal_channel: bool,
}

impl AuthorizationFilters {
    /// Filters for a client-tenant principal: sees only cases where
    /// `client_id` matches their own tenant's client identity.
    #[must_use]
    pub fn for_client_tenant(tenant: &Tenant) -> Self {
        Self {
            principal_tenant_id: tenant.tenant_id.clone(),
            visible_clients: Visibility::Only(BTreeSet::from([tenant.client_id.clone()])),
            visible_vendors: Visibility::All,
            can_see_internal_channel: false,
        }
    }

    /// Filters for a vendor-tenant principal: sees only cases where
    /// `vendor_id` matches their own tenant's vendor identity.
    #[must_use]
    pub fn for_vendor_tenant(tenant: &Tenant) -> Self {
        Self {
            principal_tenant_id: tenant.tenant_id.clone(),
            visible_clients: Visibility::All,
            visible_vendors: Visibility::Only(BTreeSet::from([tenant.vendor_id.clone()])),
            can_see_internal_channel: false,
        }
    }

    /// Filters for an internal principal scoped to specific client tenants
    /// (`Scope::Group` or `Scope::Company`), resolved by the caller against
    /// the company/group membership tables before constructing this value.
    #[must_use]
    pub fn for_internal_scoped(principal_tenant_id: impl Into<String>, client_ids: BTreeSet<String>) -> Self {
        Self {
            principal_tenant_id: principal_tenant_id.into(),
            visible_clients: Visibility::Only(client_ids),
            visible_vendors: Visibility::All,
            can_see_internal_channel: true,
        }
    }

    /// The single unrestricted filter: `Scope::Super` internal principals.
    #[must_use]
    pub fn internal_super(principal_tenant_id: impl Into<String>) -> Self {
        Self {
            principal_tenant_id: principal_tenant_id.into(),
            visible_clients: Visibility::All,
            visible_vendors: Visibility::All,
            can_see_internal_channel: true,
        }
    }

    /// True if a case with the given client/vendor IDs is visible under
    /// these filters.
    #[must_use]
    pub fn allows_case(&self, client_id: &str, vendor_id: &str) -> bool {
        self.visible_clients.allows(client_id) && self.visible_vendors.allows(vendor_id)
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

    fn tenant() -> Tenant {
        Tenant {
            tenant_id: "TNT-AAAA1111".to_string(),
            client_id: "TC-AAAA1111".to_string(),
            vendor_id: "TV-AAAA1111".to_string(),
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
        }
    }

    #[test]
    fn client_tenant_only_sees_its_own_client_id() {
        let filters = AuthorizationFilters::for_client_tenant(&tenant());
        assert!(filters.allows_case("TC-AAAA1111", "TV-ANYTHING"));
        assert!(!filters.allows_case("TC-OTHERXXX", "TV-ANYTHING"));
        assert!(!filters.can_see_internal_channel);
    }

    #[test]
    fn vendor_tenant_only_sees_its_own_vendor_id() {
        let filters = AuthorizationFilters::for_vendor_tenant(&tenant());
        assert!(filters.allows_case("TC-ANYTHING", "TV-AAAA1111"));
        assert!(!filters.allows_case("TC-ANYTHING", "TV-OTHERXXX"));
    }

    #[test]
    fn internal_super_sees_everything() {
        let filters = AuthorizationFilters::internal_super("TNT-INTERNAL1");
        assert!(filters.allows_case("TC-ANY", "TV-ANY"));
        assert!(filters.can_see_internal_channel);
    }

    #[test]
    fn internal_scoped_is_restricted_to_listed_clients() {
        let filters = AuthorizationFilters::for_internal_scoped(
            "TNT-INTERNAL1",
            BTreeSet::from(["TC-AAAA1111".to_string()]),
        );
        assert!(filters.allows_case("TC-AAAA1111", "TV-ANY"));
        assert!(!filters.allows_case("TC-OTHERXXX", "TV-ANY"));
    }
}
