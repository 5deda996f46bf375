// crates/vmp-server/src/authz.rs
// ============================================================================
// Module: Request-Time Authorization Resolution
// Description: Turns a resolved Principal plus a `facing` query parameter
//              into the AuthorizationFilters every vmp-domain call needs.
// Purpose: The one place "which hat is this caller wearing" gets decided,
//          since a tenant carries both a clientId and a vendorId and a
//          Principal carries neither directly.
// Dependencies: vmp-authz, vmp-store-sqlite, vmp-contract
// ============================================================================

use std::collections::BTreeSet;

use vmp_authz::AuthorizationFilters;
use vmp_authz::Principal;
use vmp_core::domain::Scope;
use vmp_core::domain::UserRole;
use vmp_core::VmpError;
use vmp_contract::requests::Facing;
use vmp_store_sqlite::Store;

/// Resolves the row-visibility filters for `principal` given the `facing`
/// side requested by the caller.
///
/// `facing` only matters for client/vendor principals, who must own a
/// tenant on the requested side; an internal principal's visibility comes
/// entirely from their `Scope` and ignores `facing`.
///
/// # Errors
///
/// Returns [`VmpError::not_found`] when the principal's own tenant record
/// is missing, and [`VmpError::forbidden`] when an internal scope names a
/// group or company that does not exist.
pub fn resolve_filters(store: &Store, principal: &Principal, facing: Facing) -> Result<AuthorizationFilters, VmpError> {
    if principal.role == UserRole::Internal {
        return resolve_scope(store, &principal.tenant_id, principal.scope.as_ref());
    }

    let tenant = store
        .find_tenant_by_id(&principal.tenant_id)?
        .ok_or_else(|| VmpError::not_found("principal tenant not found"))?;

    match facing {
        Facing::Client => Ok(AuthorizationFilters::for_client_tenant(&tenant)),
        Facing::Vendor => Ok(AuthorizationFilters::for_vendor_tenant(&tenant)),
    }
}

/// Resolves an internal [`Scope`] -- the principal's own, or an arbitrary
/// one named by an ops view -- into row-visibility filters.
///
/// # Errors
///
/// Returns [`VmpError::forbidden`] when `scope` names a group or company
/// that does not exist.
pub fn resolve_scope(store: &Store, principal_tenant_id: &str, scope: Option<&Scope>) -> Result<AuthorizationFilters, VmpError> {
    match scope {
        None | Some(Scope::Super) => Ok(AuthorizationFilters::internal_super(principal_tenant_id)),
        Some(Scope::Company { company_id }) => {
            let company = store.find_company_by_id(company_id)?.ok_or_else(|| VmpError::forbidden("unknown company scope"))?;
            let owner = store.find_tenant_by_id(&company.tenant_id)?.ok_or_else(|| VmpError::forbidden("company has no owning tenant"))?;
            Ok(AuthorizationFilters::for_internal_scoped(principal_tenant_id, BTreeSet::from([owner.client_id])))
        }
        Some(Scope::Group { group_id }) => {
            let companies = store.list_companies_in_group(group_id)?;
            let mut client_ids = BTreeSet::new();
            for company in companies {
                if let Some(owner) = store.find_tenant_by_id(&company.tenant_id)? {
                    client_ids.insert(owner.client_id);
                }
            }
            Ok(AuthorizationFilters::for_internal_scoped(principal_tenant_id, client_ids))
        }
    }
}
