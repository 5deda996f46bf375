// crates/vmp-server/src/routes/evidence.rs
// ============================================================================
// Module: Evidence Routes
// Description: Multipart evidence upload, signed-URL retrieval, and the
//              accept/reject review actions.
// Purpose: The only place an uploaded blob ever touches an axum handler
//          directly; everything downstream deals in storage keys.
// Dependencies: axum (multipart), vmp-domain, vmp-contract
// ============================================================================

use axum::extract::Multipart;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use vmp_contract::requests::FacingQuery;
use vmp_contract::responses::EvidenceView;
use vmp_core::VmpError;

use crate::authz::resolve_filters;
use crate::error::HttpError;
use crate::extract::AuthenticatedPrincipal;
use crate::routes::notify;
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadEvidenceQuery {
    facing: vmp_contract::requests::Facing,
    #[serde(default)]
    checklist_step_id: Option<String>,
}

/// `POST /cases/{caseId}/evidence`. Expects a multipart body with one
/// `file` part and an `evidenceType` text part.
pub async fn upload_evidence(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path(case_id): Path<String>,
    Query(query): Query<UploadEvidenceQuery>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<EvidenceView>), HttpError> {
    let filters = resolve_filters(&state.store, &principal, query.facing)?;

    let mut evidence_type = None;
    let mut filename = None;
    let mut content_type = None;
    let mut bytes = None;

    while let Some(field) = multipart.next_field().await.map_err(|err| VmpError::validation(err.to_string()))? {
        match field.name() {
            Some("evidenceType") => {
                evidence_type = Some(field.text().await.map_err(|err| VmpError::validation(err.to_string()))?);
            }
            Some("file") => {
                filename = field.file_name().map(str::to_string);
                content_type = field.content_type().map(str::to_string);
                bytes = Some(field.bytes().await.map_err(|err| VmpError::validation(err.to_string()))?.to_vec());
            }
            _ => {}
        }
    }

    let evidence_type = evidence_type.ok_or_else(|| VmpError::validation("missing evidenceType field"))?;
    let bytes = bytes.ok_or_else(|| VmpError::validation("missing file field"))?;
    let filename = filename.unwrap_or_else(|| "upload.bin".to_string());
    let content_type = content_type.unwrap_or_else(|| "application/octet-stream".to_string());

    let evidence = state
        .evidence
        .upload_evidence(
            &case_id,
            &filters,
            &evidence_type,
            &filename,
            &content_type,
            bytes,
            &principal.user_id,
            query.checklist_step_id.as_deref(),
        )
        .await?;

    if let Some(case) = state.cases.get_case(&case_id, &filters)? {
        let event_key = match evidence_type.as_str() {
            "invoice_pdf" => "invoice_evidence_submitted",
            "payment_confirmation" => "payment_evidence_submitted",
            _ => "case.evidence.submitted",
        };
        let summary = format!("New {evidence_type} evidence submitted.");
        match query.facing {
            vmp_contract::requests::Facing::Vendor => notify::notify_client_users(&state, &case, event_key, &summary)?,
            vmp_contract::requests::Facing::Client => notify::notify_vendor_users(&state, &case, event_key, &summary)?,
        }
    }

    Ok((StatusCode::CREATED, Json(EvidenceView::from(&evidence))))
}

pub async fn get_evidence_url(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path(evidence_id): Path<String>,
    Query(query): Query<FacingQuery>,
) -> Result<Json<serde_json::Value>, HttpError> {
    let filters = resolve_filters(&state.store, &principal, query.facing)?;
    let url = state
        .evidence
        .get_evidence_url(&evidence_id, &filters, &principal.user_id, Some(state.storage_url_ttl_seconds))
        .await?;
    Ok(Json(serde_json::json!({ "url": url })))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEvidenceQuery {
    pub facing: vmp_contract::requests::Facing,
    pub checklist_step_id: String,
}

pub async fn accept_evidence(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path((case_id, evidence_id)): Path<(String, String)>,
    Query(query): Query<ReviewEvidenceQuery>,
) -> Result<StatusCode, HttpError> {
    let filters = resolve_filters(&state.store, &principal, query.facing)?;
    state.evidence.accept_evidence(&case_id, &evidence_id, &query.checklist_step_id, &filters, &principal.user_id)?;
    if let Some(case) = state.cases.get_case(&case_id, &filters)? {
        let summary = "Submitted evidence was verified.";
        match query.facing {
            vmp_contract::requests::Facing::Vendor => notify::notify_client_users(&state, &case, "case.evidence.verified", summary)?,
            vmp_contract::requests::Facing::Client => notify::notify_vendor_users(&state, &case, "case.evidence.verified", summary)?,
        }
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reject_evidence(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Path((case_id, evidence_id)): Path<(String, String)>,
    Query(query): Query<ReviewEvidenceQuery>,
    Json(body): Json<vmp_contract::requests::ReviewStepRequest>,
) -> Result<StatusCode, HttpError> {
    let filters = resolve_filters(&state.store, &principal, query.facing)?;
    let note = body.reason.as_deref().unwrap_or("");
    state.evidence.reject_evidence(&case_id, &evidence_id, &query.checklist_step_id, &filters, &principal.user_id, note)?;
    if let Some(case) = state.cases.get_case(&case_id, &filters)? {
        let summary = "Submitted evidence was rejected and needs another look.";
        match query.facing {
            vmp_contract::requests::Facing::Vendor => notify::notify_client_users(&state, &case, "case.evidence.rejected", summary)?,
            vmp_contract::requests::Facing::Client => notify::notify_vendor_users(&state, &case, "case.evidence.rejected", summary)?,
        }
    }
    Ok(StatusCode::NO_CONTENT)
}
