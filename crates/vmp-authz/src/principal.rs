// crates/vmp-authz/src/principal.rs
// ============================================================================
// Module: Principal
// Description: The authenticated identity attached to every domain call.
// Purpose: Carry exactly the facts authorization decisions need, nothing more.
// Dependencies: vmp-core
// ============================================================================

use vmp_core::domain::Scope;
use vmp_core::domain::UserRole;

/// An authenticated caller, resolved once per request.
///
/// # Invariants
/// - `scope` is only meaningful when `role == UserRole::Internal`; client
///   and vendor users are scoped entirely by their `tenant_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Resolved user identity.
    pub user_id: String,
    /// Owning tenant of this user.
    pub tenant_id: String,
    pub email: String,
    pub role: UserRole,
    /// Company-visibility scope, present only for internal users.
    pub scope: Option<Scope>,
}

impl Principal {
    /// True for platform-internal operators (ops/procurement/ap/finance staff).
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(self.role, UserRole::Internal)
    }
}
