// crates/vmp-server/src/routes/ledger.rs
// ============================================================================
// Module: Ledger Routes
// Description: Read-only windows over ingested invoice and payment rows.
// Purpose: Let a client/vendor/internal principal see the reconciliation
//          feed scoped to what they're authorized to see, nothing more.
// Dependencies: axum, vmp-domain, vmp-contract
// ============================================================================

use axum::extract::Query;
use axum::extract::State;
use axum::Json;
use vmp_contract::envelope::Page;
use vmp_contract::requests::ListLedgerQuery;
use vmp_contract::responses::InvoiceView;
use vmp_contract::responses::PaymentView;

use crate::authz::resolve_filters;
use crate::error::HttpError;
use crate::extract::AuthenticatedPrincipal;
use crate::state::AppState;

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListLedgerParams {
    pub facing: vmp_contract::requests::Facing,
    #[serde(flatten)]
    pub ledger: ListLedgerQuery,
}

pub async fn list_invoices(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Query(query): Query<ListLedgerParams>,
) -> Result<Json<Page<InvoiceView>>, HttpError> {
    let filters = resolve_filters(&state.store, &principal, query.facing)?;
    let rows = state.ingest.list_invoices(&filters)?;

    let paging = query.ledger.page.normalized();
    let total = rows.len();
    let page_rows: Vec<InvoiceView> =
        rows.iter().skip(paging.offset() as usize).take(paging.limit as usize).map(InvoiceView::from).collect();
    Ok(Json(Page::new(page_rows, paging.page, paging.limit, total as u64)))
}

pub async fn list_payments(
    State(state): State<AppState>,
    AuthenticatedPrincipal(principal): AuthenticatedPrincipal,
    Query(query): Query<ListLedgerParams>,
) -> Result<Json<Page<PaymentView>>, HttpError> {
    let filters = resolve_filters(&state.store, &principal, query.facing)?;
    let rows = state.ingest.list_payments(&filters)?;

    let paging = query.ledger.page.normalized();
    let total = rows.len();
    let page_rows: Vec<PaymentView> =
        rows.iter().skip(paging.offset() as usize).take(paging.limit as usize).map(PaymentView::from).collect();
    Ok(Json(Page::new(page_rows, paging.page, paging.limit, total as u64)))
}
