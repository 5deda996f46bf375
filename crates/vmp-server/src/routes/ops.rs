// crates/vmp-server/src/routes/ops.rs
// ============================================================================
// Module: Ops Routes
// Description: Internal-only scoped views over the org hierarchy, case
//              queue, and vendor directory, plus the audit chain verifier.
// Purpose: Give ops/procurement/ap/finance staff a cross-tenant lens that a
//          client or vendor principal can never reach.
// Dependencies: axum, vmp-domain, vmp-contract, vmp-authz
// ============================================================================

use axum::extract::Query;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use vmp_authz::Visibility;
use vmp_contract::envelope::Page;
use vmp_contract::responses::CaseSummaryView;
use vmp_contract::responses::ChainVerificationView;
use vmp_contract::responses::CompanyView;
use vmp_contract::responses::OrgGroupView;
use vmp_contract::responses::OrgTreeView;
use vmp_contract::responses::RelationshipView;
use vmp_contract::responses::ScopedDashboardView;
use vmp_contract::responses::TenantView;
use vmp_contract::responses::VendorDirectoryEntryView;
use vmp_core::domain::CaseStatus;
use vmp_core::domain::Scope;
use vmp_core::domain::UserRole;
use vmp_core::VmpError;

use crate::authz::resolve_scope;
use crate::error::HttpError;
use crate::extract::AuthenticatedPrincipal;
use crate::state::AppState;

/// The `scopeType`/`scopeId` pair every ops view takes, naming an arbitrary
/// scope rather than the caller's own -- an internal principal's own
/// `Scope` only ever narrows `resolve_filters`, never widens an ops view.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeQuery {
    pub scope_type: String,
    #[serde(default)]
    pub scope_id: Option<String>,
}

fn parse_scope(query: &ScopeQuery) -> Result<Option<Scope>, VmpError> {
    match query.scope_type.as_str() {
        "super" => Ok(None),
        "group" => {
            let group_id = query.scope_id.clone().ok_or_else(|| VmpError::validation("scopeId required for group scope"))?;
            Ok(Some(Scope::Group { group_id }))
        }
        "company" => {
            let company_id = query.scope_id.clone().ok_or_else(|| VmpError::validation("scopeId required for company scope"))?;
            Ok(Some(Scope::Company { company_id }))
        }
        other => Err(VmpError::validation(format!("unknown scopeType {other}"))),
    }
}

fn require_internal(principal: &vmp_authz::Principal) -> Result<(), HttpError> {
    if principal.role != UserRole::Internal {
        return Err(VmpError::forbidden("ops views are internal only").into());
    }
    Ok(())
}

/// `GetOrgTree` (internal only): every group's companies, plus ungrouped
/// ones, restricted to companies whose owning tenant is visible to the
/// caller's own scope.
pub async fn get_org_tree(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
) -> Result<Json<OrgTreeView>, HttpError> {
    require_internal(&principal)?;
    let filters = resolve_scope(&state.store, &principal.tenant_id, principal.scope.as_ref())?;

    let mut visible = Vec::new();
    for company in state.store.list_all_companies().map_err(vmp_domain::DomainError::from)? {
        let owner = state.store.find_tenant_by_id(&company.tenant_id).map_err(vmp_domain::DomainError::from)?;
        let client_id = owner.map(|t| t.client_id);
        if client_id.is_some_and(|id| filters.visible_clients.allows(&id)) {
            visible.push(company);
        }
    }

    let mut groups: std::collections::BTreeMap<String, Vec<CompanyView>> = std::collections::BTreeMap::new();
    let mut ungrouped = Vec::new();
    for company in &visible {
        match &company.group_id {
            Some(group_id) => groups.entry(group_id.clone()).or_default().push(CompanyView::from(company)),
            None => ungrouped.push(CompanyView::from(company)),
        }
    }

    Ok(Json(OrgTreeView {
        groups: groups.into_iter().map(|(group_id, companies)| OrgGroupView { group_id, companies }).collect(),
        ungrouped,
    }))
}

/// `GetScopedDashboard(scopeType, scopeId)` (internal only): case counts by
/// status within the named scope.
pub async fn get_scoped_dashboard(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<ScopedDashboardView>, HttpError> {
    require_internal(&principal)?;
    let scope = parse_scope(&query)?;
    let filters = resolve_scope(&state.store, &principal.tenant_id, scope.as_ref())?;
    let cases = state.cases.list_cases(&filters)?;

    let count = |status: CaseStatus| cases.iter().filter(|c| c.status == status).count();
    Ok(Json(ScopedDashboardView {
        total_cases: cases.len(),
        open_cases: count(CaseStatus::Open),
        waiting_supplier_cases: count(CaseStatus::WaitingSupplier),
        waiting_internal_cases: count(CaseStatus::WaitingInternal),
        blocked_cases: count(CaseStatus::Blocked),
        resolved_cases: count(CaseStatus::Resolved),
    }))
}

/// `GetOpsCaseQueue(scopeType, scopeId, filters)` query parameters: the
/// scope discriminator plus the same status/priority/paging knobs
/// `list_cases` exposes, minus `facing` -- scope, not a tenant side, picks
/// the visible set here.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpsCaseQueueQuery {
    #[serde(flatten)]
    pub scope: ScopeQuery,
    #[serde(default)]
    pub status: Option<CaseStatus>,
    #[serde(default)]
    pub priority: Option<vmp_core::domain::CasePriority>,
    #[serde(flatten)]
    pub page: vmp_contract::envelope::PageRequest,
}

/// `GetOpsCaseQueue(scopeType, scopeId, filters)` (internal only): the same
/// paged/sorted case listing as `list_cases`, but scoped by an arbitrary
/// `scopeType`/`scopeId` instead of the caller's own scope.
pub async fn get_ops_case_queue(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Query(query): Query<OpsCaseQueueQuery>,
) -> Result<Json<Page<CaseSummaryView>>, HttpError> {
    require_internal(&principal)?;
    let scope = parse_scope(&query.scope)?;
    let filters = resolve_scope(&state.store, &principal.tenant_id, scope.as_ref())?;

    let mut cases = state.cases.list_cases(&filters)?;
    if let Some(status) = query.status {
        cases.retain(|c| c.status == status);
    }
    if let Some(priority) = query.priority {
        cases.retain(|c| c.priority == priority);
    }
    cases.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let paging = query.page.normalized();
    let total = cases.len();
    let page_rows: Vec<CaseSummaryView> =
        cases.iter().skip(paging.offset() as usize).take(paging.limit as usize).map(CaseSummaryView::from).collect();
    Ok(Json(Page::new(page_rows, paging.page, paging.limit, total as u64)))
}

/// `GetVendorDirectory(scopeType, scopeId)` (internal only): every vendor
/// tenant with an active relationship to a client visible under the named
/// scope, alongside those relationships.
pub async fn get_vendor_directory(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<Vec<VendorDirectoryEntryView>>, HttpError> {
    require_internal(&principal)?;
    let scope = parse_scope(&query)?;
    let filters = resolve_scope(&state.store, &principal.tenant_id, scope.as_ref())?;

    let client_ids: Vec<String> = match &filters.visible_clients {
        Visibility::All => state.store.list_all_companies().map_err(vmp_domain::DomainError::from)?.into_iter().filter_map(|c| {
            state.store.find_tenant_by_id(&c.tenant_id).ok().flatten().map(|t| t.client_id)
        }).collect(),
        Visibility::Only(ids) => ids.iter().cloned().collect(),
    };

    let mut by_vendor: std::collections::BTreeMap<String, Vec<RelationshipView>> = std::collections::BTreeMap::new();
    for client_id in &client_ids {
        let relationships = state.store.list_relationships_for_client(client_id).map_err(vmp_domain::DomainError::from)?;
        for relationship in &relationships {
            by_vendor.entry(relationship.vendor_id.clone()).or_default().push(RelationshipView::from(relationship));
        }
    }

    let mut entries = Vec::new();
    for (vendor_id, relationships) in by_vendor {
        if let Some(tenant) = state.store.find_tenant_by_vendor_id(&vendor_id).map_err(vmp_domain::DomainError::from)? {
            entries.push(VendorDirectoryEntryView { vendor_tenant: TenantView::from(&tenant), relationships });
        }
    }
    Ok(Json(entries))
}

/// `GET /chain/verify` (internal only).
pub async fn verify_chain(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
) -> Result<Json<ChainVerificationView>, HttpError> {
    require_internal(&principal)?;
    let verification = state.store.verify_full_audit_chain().map_err(vmp_domain::DomainError::from)?;
    Ok(Json(ChainVerificationView::from(verification)))
}
