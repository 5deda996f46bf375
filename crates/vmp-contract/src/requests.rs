// crates/vmp-contract/src/requests.rs
// ============================================================================
// Module: Request DTOs
// Description: camelCase write/query shapes for every mutating endpoint.
// Purpose: Give each axum handler a typed body to deserialize into, instead
//          of pulling fields out of a raw `serde_json::Value`.
// Dependencies: vmp-core, serde
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use vmp_core::domain::CasePriority;
use vmp_core::domain::CaseType;
use vmp_core::domain::Channel;
use vmp_core::domain::OwnerTeam;

// ============================================================================
// SECTION: Identity
// ============================================================================

/// `POST /login` body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST /login` success body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub session_token: String,
    pub user_id: String,
    pub tenant_id: String,
}

/// `POST /invites/{token}/accept` body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptInviteRequest {
    pub vendor_name: String,
    pub password: String,
}

/// `POST /invites/{token}/accept` success body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptInviteResponse {
    pub tenant_id: String,
    pub user_id: String,
    pub session_token: String,
}

/// `POST /password-reset` body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPasswordResetRequest {
    pub email: String,
}

/// `POST /password-reset/{token}` body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemPasswordResetRequest {
    pub new_password: String,
}

// ============================================================================
// SECTION: Invites
// ============================================================================

/// `POST /invites` body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInviteRequest {
    pub email: String,
    #[serde(default)]
    pub vendor_name: Option<String>,
}

/// `POST /invites` success body. The cleartext token is returned exactly
/// once, embedded in `token_url`, and never persisted -- the store only
/// ever holds its hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInviteResponse {
    pub invite_id: String,
    pub token_url: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

// ============================================================================
// SECTION: Cases
// ============================================================================

/// Which side of a relationship a `ListCases`/`GetCase` call is viewing the
/// platform as. Resolved per request rather than stored on the session:
/// every tenant carries both a `clientId` and a `vendorId`, so "which hat
/// am I wearing" is a fact about the request, not about the principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    Client,
    Vendor,
}

/// Query parameter carried by every single-case mutation (`facing` alone,
/// no paging). Separate from [`ListCasesQuery`] so an action endpoint's
/// signature doesn't imply it accepts `status`/`priority`/paging.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacingQuery {
    pub facing: Facing,
}

/// `GET /cases` query parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCasesQuery {
    pub facing: Facing,
    pub status: Option<vmp_core::domain::CaseStatus>,
    pub priority: Option<CasePriority>,
    #[serde(flatten)]
    pub page: crate::envelope::PageRequest,
}

/// `POST /cases` body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCaseRequest {
    pub client_id: String,
    pub vendor_id: String,
    pub case_type: CaseType,
    #[serde(default)]
    pub priority: Option<CasePriority>,
    #[serde(default)]
    pub owner_team: Option<OwnerTeam>,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// `POST /cases/{caseId}/messages` body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMessageRequest {
    pub body: String,
    #[serde(default)]
    pub channel: Channel,
    #[serde(default)]
    pub is_internal_note: bool,
}

/// `POST /evidence/{id}/verify` and `.../reject` body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStepRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

/// `POST /cases/{caseId}/escalate` body. `level` must be 1, 2, or 3; level 3
/// is a break-glass escalation that pins the case `blocked`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscalateCaseRequest {
    pub level: u8,
    pub reason: String,
}

/// `POST /cases/{caseId}/close` body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseCaseRequest {
    pub reason: String,
}

/// `POST /cases/{caseId}/reassign` body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReassignCaseRequest {
    pub owner_team: OwnerTeam,
}

// ============================================================================
// SECTION: Bank detail changes
// ============================================================================

/// `POST /cases/bank-change` body: opens a finance-owned case carrying the
/// vendor's proposed bank details in `metadata` pending approval.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBankChangeRequest {
    pub client_id: String,
    pub vendor_id: String,
    pub proposed_bank_details: serde_json::Value,
}

// ============================================================================
// SECTION: Notifications
// ============================================================================

/// `GET /notifications` query parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListNotificationsQuery {
    #[serde(default)]
    pub unread: bool,
}

/// `POST /notifications/read` body. `ids` omitted means "mark everything
/// for this user as read".
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkNotificationsReadRequest {
    #[serde(default)]
    pub ids: Option<Vec<String>>,
}

// ============================================================================
// SECTION: Invoices / Payments
// ============================================================================

/// `GET /invoices` and `GET /payments` query parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListLedgerQuery {
    #[serde(flatten)]
    pub page: crate::envelope::PageRequest,
}
