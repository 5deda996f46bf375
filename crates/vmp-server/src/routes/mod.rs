// crates/vmp-server/src/routes/mod.rs
// ============================================================================
// Module: Route Wiring
// Description: Assembles every handler module into one axum::Router.
// Purpose: A single place that maps spec-shaped paths onto handlers, so the
//          wire surface can be read top to bottom in one file.
// Dependencies: axum
// ============================================================================

pub mod cases;
pub mod context;
pub mod evidence;
pub mod identity;
pub mod invites;
pub mod ledger;
pub mod notifications;
mod notify;
pub mod ops;

use axum::routing::get;
use axum::routing::post;
use axum::Router;

use crate::state::AppState;

/// Builds the full application router. Layers (tracing, CORS) are added by
/// the caller in `main.rs`, once around the whole thing rather than per
/// route group.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(identity::login))
        .route("/logout", post(identity::logout))
        .route("/password-reset", post(identity::request_password_reset))
        .route("/password-reset/{token}", post(identity::redeem_password_reset))
        .route("/invites", post(invites::create_invite))
        .route("/invites/{token}/accept", post(identity::accept_invite))
        .route("/my-contexts", get(context::get_my_contexts))
        .route("/cases", get(cases::list_cases).post(cases::create_case))
        .route("/cases/bank-change", post(cases::request_bank_change))
        .route("/cases/{caseId}", get(cases::get_case))
        .route("/cases/{caseId}/approve-bank-change", post(cases::approve_bank_change))
        .route("/cases/{caseId}/messages", post(cases::post_message))
        .route("/cases/{caseId}/checklist/{stepId}/verify", post(cases::verify_step))
        .route("/cases/{caseId}/checklist/{stepId}/reject", post(cases::reject_step))
        .route("/cases/{caseId}/escalate", post(cases::escalate))
        .route("/cases/{caseId}/reassign", post(cases::reassign))
        .route("/cases/{caseId}/approve-onboarding", post(cases::approve_onboarding))
        .route("/cases/{caseId}/close", post(cases::close_case))
        .route("/cases/{caseId}/evidence", post(evidence::upload_evidence))
        .route("/evidence/{evidenceId}/url", get(evidence::get_evidence_url))
        .route("/cases/{caseId}/evidence/{evidenceId}/verify", post(evidence::accept_evidence))
        .route("/cases/{caseId}/evidence/{evidenceId}/reject", post(evidence::reject_evidence))
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/unread-count", get(notifications::unread_count))
        .route("/notifications/read", post(notifications::mark_read))
        .route("/invoices", get(ledger::list_invoices))
        .route("/payments", get(ledger::list_payments))
        .route("/ops/org-tree", get(ops::get_org_tree))
        .route("/ops/dashboard", get(ops::get_scoped_dashboard))
        .route("/ops/case-queue", get(ops::get_ops_case_queue))
        .route("/ops/vendor-directory", get(ops::get_vendor_directory))
        .route("/chain/verify", get(ops::verify_chain))
}
