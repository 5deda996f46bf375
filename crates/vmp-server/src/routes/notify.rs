// crates/vmp-server/src/routes/notify.rs
// ============================================================================
// Module: Case Notification Fan-out
// Description: Resolves the active users of a case's client or vendor
//              tenant and fans a notification out to them.
// Purpose: One place for the vendor/client fan-out every case, messaging,
//          and evidence transition needs, instead of each handler
//          re-deriving "the other tenant's active users."
// Dependencies: vmp-domain, vmp-store-sqlite
// ============================================================================

use vmp_core::domain::Case;
use vmp_core::domain::UserRole;

use crate::error::HttpError;
use crate::state::AppState;

fn active_user_ids(state: &AppState, tenant_id: &str) -> Result<Vec<String>, HttpError> {
    Ok(state
        .store
        .list_users_for_tenant(tenant_id)
        .map_err(vmp_domain::DomainError::from)?
        .into_iter()
        .filter(|user| user.active && user.deleted_at.is_none())
        .map(|user| user.user_id)
        .collect())
}

/// Notifies every active user of `case`'s vendor tenant. A missing vendor
/// tenant is not an error here; the case mutation that triggered this
/// already succeeded and notification delivery never rolls it back.
pub fn notify_vendor_users(state: &AppState, case: &Case, event_key: &str, summary: &str) -> Result<(), HttpError> {
    let Some(tenant) = state.store.find_tenant_by_vendor_id(&case.vendor_id).map_err(vmp_domain::DomainError::from)? else {
        return Ok(());
    };
    let recipients = active_user_ids(state, &tenant.tenant_id)?;
    state.notifications.notify_many(&recipients, &case.case_id, event_key, summary, case.priority)?;
    Ok(())
}

/// Notifies every active user of `case`'s client tenant.
pub fn notify_client_users(state: &AppState, case: &Case, event_key: &str, summary: &str) -> Result<(), HttpError> {
    let Some(tenant) = state.store.find_tenant_by_client_id(&case.client_id).map_err(vmp_domain::DomainError::from)? else {
        return Ok(());
    };
    let recipients = active_user_ids(state, &tenant.tenant_id)?;
    state.notifications.notify_many(&recipients, &case.case_id, event_key, summary, case.priority)?;
    Ok(())
}

/// Notifies the vendor tenant's owner specifically, rather than every
/// active user -- used right after approving onboarding, when the rest of
/// the vendor's users are only just now being activated.
pub fn notify_vendor_owner(state: &AppState, case: &Case, event_key: &str, summary: &str) -> Result<(), HttpError> {
    let Some(tenant) = state.store.find_tenant_by_vendor_id(&case.vendor_id).map_err(vmp_domain::DomainError::from)? else {
        return Ok(());
    };
    let owner = state
        .store
        .list_users_for_tenant(&tenant.tenant_id)
        .map_err(vmp_domain::DomainError::from)?
        .into_iter()
        .find(|user| user.role == UserRole::Owner);
    if let Some(owner) = owner {
        state.notifications.notify(&owner.user_id, &case.case_id, event_key, summary, case.priority)?;
    }
    Ok(())
}
