// crates/vmp-server/src/routes/context.rs
// ============================================================================
// Module: Context Routes
// Description: Reports a tenant's own identity and its relationships on
//              both sides, so a client can offer "view as client"/"view as
//              vendor" without server-side session state.
// Purpose: `GetMyContexts()`. There is no `SwitchContext` route -- which
//          side of a relationship a request views is carried per-request
//          on `ListCasesQuery.facing`, not stored on the session (see
//          DESIGN.md).
// Dependencies: axum, vmp-contract
// ============================================================================

use axum::extract::State;
use axum::Json;
use vmp_contract::responses::MyContextsView;
use vmp_contract::responses::RelationshipView;
use vmp_contract::responses::TenantView;
use vmp_core::VmpError;

use crate::error::HttpError;
use crate::extract::AuthenticatedPrincipal;
use crate::state::AppState;

pub async fn get_my_contexts(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
) -> Result<Json<MyContextsView>, HttpError> {
    let tenant = state
        .store
        .find_tenant_by_id(&principal.tenant_id)
        .map_err(vmp_domain::DomainError::from)?
        .ok_or_else(|| VmpError::not_found("tenant not found"))?;

    let client_relationships =
        state.store.list_relationships_for_client(&tenant.client_id).map_err(vmp_domain::DomainError::from)?;
    let vendor_relationships =
        state.store.list_relationships_for_vendor(&tenant.vendor_id).map_err(vmp_domain::DomainError::from)?;

    Ok(Json(MyContextsView {
        tenant: TenantView::from(&tenant),
        client_relationships: client_relationships.iter().map(RelationshipView::from).collect(),
        vendor_relationships: vendor_relationships.iter().map(RelationshipView::from).collect(),
    }))
}
