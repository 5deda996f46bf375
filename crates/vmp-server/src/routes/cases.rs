// crates/vmp-server/src/routes/cases.rs
// ============================================================================
// Module: Case Routes
// Description: List/create/inspect cases, post messages, drive checklist
//              decisions, escalate, reassign, and close.
// Purpose: The central collaboration surface of the platform.
// Dependencies: axum, vmp-domain, vmp-contract, vmp-authz
// ============================================================================

use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use vmp_contract::envelope::Page;
use vmp_contract::requests::CloseCaseRequest;
use vmp_contract::requests::CreateCaseRequest;
use vmp_contract::requests::EscalateCaseRequest;
use vmp_contract::requests::FacingQuery;
use vmp_contract::requests::ListCasesQuery;
use vmp_contract::requests::PostMessageRequest;
use vmp_contract::requests::ReassignCaseRequest;
use vmp_contract::requests::RequestBankChangeRequest;
use vmp_contract::requests::ReviewStepRequest;
use vmp_contract::responses::CaseDetailView;
use vmp_contract::responses::CaseSummaryView;
use vmp_contract::responses::ChecklistStepView;
use vmp_contract::responses::DecisionLogEntryView;
use vmp_contract::responses::EvidenceView;
use vmp_contract::responses::MessageView;
use vmp_core::domain::CasePriority;
use vmp_core::domain::OwnerTeam;
use vmp_core::domain::SenderContext;
use vmp_core::domain::UserRole;
use vmp_core::VmpError;

use crate::authz::resolve_filters;
use crate::error::HttpError;
use crate::extract::AuthenticatedPrincipal;
use crate::routes::notify;
use crate::state::AppState;

pub async fn list_cases(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Query(query): Query<ListCasesQuery>,
) -> Result<Json<Page<CaseSummaryView>>, HttpError> {
    let filters = resolve_filters(&state.store, &principal, query.facing)?;
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

pub async fn create_case(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Json(body): Json<CreateCaseRequest>,
) -> Result<(StatusCode, Json<CaseSummaryView>), HttpError> {
    let case = state.cases.create_case(
        &body.client_id,
        &body.vendor_id,
        body.case_type,
        body.priority.unwrap_or(CasePriority::Normal),
        body.owner_team.unwrap_or(OwnerTeam::Procurement),
        &body.title,
        &body.description,
        &principal.user_id,
    )?;

    let event_key = match case.case_type {
        vmp_core::domain::CaseType::Payment => "payment_case_opened",
        vmp_core::domain::CaseType::Invoice => "invoice_case_opened",
        _ => "case.opened",
    };
    notify::notify_vendor_users(&state, &case, event_key, &format!("New case opened: {}", case.title))?;

    Ok((StatusCode::CREATED, Json(CaseSummaryView::from(&case))))
}

async fn load_case_detail(state: &AppState, case_id: &str, filters: &vmp_authz::AuthorizationFilters) -> Result<CaseDetailView, HttpError> {
    let case = state.cases.get_case(case_id, filters)?.ok_or_else(|| VmpError::not_found(format!("case {case_id}")))?;
    let checklist = state.store.list_checklist_steps(case_id).map_err(vmp_domain::DomainError::from)?;
    let evidence = state.store.list_evidence_for_case(case_id).map_err(vmp_domain::DomainError::from)?;
    let messages = state.messaging.list_messages(case_id, filters)?;
    let decisions = state.store.list_decisions_for_case(case_id).map_err(vmp_domain::DomainError::from)?;

    Ok(CaseDetailView {
        description: case.description.clone(),
        opened_by: case.opened_by.clone(),
        metadata: case.metadata.clone(),
        case: CaseSummaryView::from(&case),
        checklist: checklist.iter().map(ChecklistStepView::from).collect(),
        evidence: evidence.iter().map(EvidenceView::from).collect(),
        messages: messages.iter().map(MessageView::from).collect(),
        decisions: decisions.iter().map(DecisionLogEntryView::from).collect(),
    })
}

/// `GET /cases/{caseId}`. Resolves visibility against both sides of the
/// relationship, since a single-case fetch has no `facing` parameter to
/// disambiguate -- an internal principal's scope, or either tenant role a
/// client/vendor principal plays, is tried in turn.
pub async fn get_case(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path(case_id): Path<String>,
) -> Result<Json<CaseDetailView>, HttpError> {
    let filters = if principal.role == UserRole::Internal {
        resolve_filters(&state.store, &principal, vmp_contract::requests::Facing::Client)?
    } else {
        let tenant = state
            .store
            .find_tenant_by_id(&principal.tenant_id)
            .map_err(vmp_domain::DomainError::from)?
            .ok_or_else(|| VmpError::not_found("tenant not found"))?;
        let as_client = vmp_authz::AuthorizationFilters::for_client_tenant(&tenant);
        if state.cases.get_case(&case_id, &as_client)?.is_some() {
            as_client
        } else {
            vmp_authz::AuthorizationFilters::for_vendor_tenant(&tenant)
        }
    };
    Ok(Json(load_case_detail(&state, &case_id, &filters).await?))
}

pub async fn post_message(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path(case_id): Path<String>,
    Query(query): Query<FacingQuery>,
    Json(body): Json<PostMessageRequest>,
) -> Result<(StatusCode, Json<MessageView>), HttpError> {
    let filters = resolve_filters(&state.store, &principal, query.facing)?;
    let sender_context = match (principal.role, query.facing) {
        (UserRole::Internal, _) => SenderContext::Internal,
        (_, vmp_contract::requests::Facing::Client) => SenderContext::Client,
        (_, vmp_contract::requests::Facing::Vendor) => SenderContext::Vendor,
    };
    let message = state.messaging.create_message(
        &case_id,
        &filters,
        &principal.user_id,
        sender_context,
        body.channel,
        body.is_internal_note,
        &body.body,
    )?;

    if !message.is_internal_note {
        if let Some(case) = state.cases.get_case(&case_id, &filters)? {
            let summary = "New message posted on your case.";
            match sender_context {
                SenderContext::Vendor => notify::notify_client_users(&state, &case, "case.message.posted", summary)?,
                SenderContext::Client | SenderContext::Internal => {
                    notify::notify_vendor_users(&state, &case, "case.message.posted", summary)?;
                }
                SenderContext::System | SenderContext::Ai => {}
            }
        }
    }

    Ok((StatusCode::CREATED, Json(MessageView::from(&message))))
}

pub async fn verify_step(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path((case_id, step_id)): Path<(String, String)>,
    Query(query): Query<FacingQuery>,
    Json(body): Json<ReviewStepRequest>,
) -> Result<Json<ChecklistStepView>, HttpError> {
    let filters = resolve_filters(&state.store, &principal, query.facing)?;
    state.cases.verify_step(&case_id, &step_id, &filters, &principal.user_id, body.reason.as_deref().unwrap_or("verified"))?;
    let step = find_step(&state, &case_id, &step_id)?;
    Ok(Json(ChecklistStepView::from(&step)))
}

pub async fn reject_step(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path((case_id, step_id)): Path<(String, String)>,
    Query(query): Query<FacingQuery>,
    Json(body): Json<ReviewStepRequest>,
) -> Result<Json<ChecklistStepView>, HttpError> {
    let filters = resolve_filters(&state.store, &principal, query.facing)?;
    state.cases.reject_step(&case_id, &step_id, &filters, &principal.user_id, body.reason.as_deref().unwrap_or("rejected"))?;
    let step = find_step(&state, &case_id, &step_id)?;
    Ok(Json(ChecklistStepView::from(&step)))
}

fn find_step(state: &AppState, case_id: &str, step_id: &str) -> Result<vmp_core::domain::ChecklistStep, HttpError> {
    state
        .store
        .list_checklist_steps(case_id)
        .map_err(vmp_domain::DomainError::from)?
        .into_iter()
        .find(|s| s.checklist_step_id == step_id)
        .ok_or_else(|| VmpError::not_found(format!("checklist step {step_id}")).into())
}

pub async fn escalate(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path(case_id): Path<String>,
    Query(query): Query<FacingQuery>,
    Json(body): Json<EscalateCaseRequest>,
) -> Result<Json<CaseSummaryView>, HttpError> {
    let filters = resolve_filters(&state.store, &principal, query.facing)?;
    let case = state.cases.escalate(&case_id, &filters, &principal.user_id, body.level, &body.reason)?;
    Ok(Json(CaseSummaryView::from(&case)))
}

pub async fn reassign(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path(case_id): Path<String>,
    Query(query): Query<FacingQuery>,
    Json(body): Json<ReassignCaseRequest>,
) -> Result<Json<CaseSummaryView>, HttpError> {
    let filters = resolve_filters(&state.store, &principal, query.facing)?;
    let case = state.cases.reassign(&case_id, &filters, body.owner_team, &principal.user_id)?;
    Ok(Json(CaseSummaryView::from(&case)))
}

pub async fn approve_onboarding(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path(case_id): Path<String>,
    Query(query): Query<FacingQuery>,
) -> Result<Json<CaseSummaryView>, HttpError> {
    let filters = resolve_filters(&state.store, &principal, query.facing)?;
    let case = state.cases.approve_onboarding(&case_id, &filters, &principal.user_id)?;
    notify::notify_vendor_owner(&state, &case, "case.onboarding.approved", "Your onboarding has been approved.")?;
    Ok(Json(CaseSummaryView::from(&case)))
}

pub async fn close_case(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path(case_id): Path<String>,
    Query(query): Query<FacingQuery>,
    Json(body): Json<CloseCaseRequest>,
) -> Result<Json<CaseSummaryView>, HttpError> {
    let filters = resolve_filters(&state.store, &principal, query.facing)?;
    let case = state.cases.close(&case_id, &filters, &principal.user_id, &body.reason)?;
    Ok(Json(CaseSummaryView::from(&case)))
}

/// `POST /cases/bank-change`. Opens a finance-owned case carrying the
/// vendor's proposed bank details in `metadata`, pending approval.
pub async fn request_bank_change(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Json(body): Json<RequestBankChangeRequest>,
) -> Result<(StatusCode, Json<CaseSummaryView>), HttpError> {
    let case = state.cases.request_bank_change(&body.client_id, &body.vendor_id, body.proposed_bank_details, &principal.user_id)?;
    notify::notify_vendor_users(&state, &case, "payment_bank_change_requested", "A bank detail change is pending approval.")?;
    Ok((StatusCode::CREATED, Json(CaseSummaryView::from(&case))))
}

/// `POST /cases/{caseId}/approve-bank-change`. Applies once the checklist
/// (new bank letter, internal authorization) is complete.
pub async fn approve_bank_change(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path(case_id): Path<String>,
    Query(query): Query<FacingQuery>,
) -> Result<Json<CaseSummaryView>, HttpError> {
    let filters = resolve_filters(&state.store, &principal, query.facing)?;
    let case = state.cases.approve_bank_change(&case_id, &filters, &principal.user_id)?;
    notify::notify_vendor_users(&state, &case, "payment_bank_change_approved", "Your bank detail change has been approved.")?;
    Ok(Json(CaseSummaryView::from(&case)))
}
