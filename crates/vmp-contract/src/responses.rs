// crates/vmp-contract/src/responses.rs
// ============================================================================
// Module: Response DTOs
// Description: camelCase read shapes for every entity exposed over the API.
// Purpose: Decouple the wire format from vmp-core's storage-oriented field
//          naming without duplicating enum definitions -- status/type enums
//          already serialize to the exact tokens the API wants, so only
//          struct field names are translated here.
// Dependencies: vmp-core, serde, chrono
// ============================================================================

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;
use serde::Serialize;
use vmp_core::domain;

/// `Tenant`, as returned by context/tenant lookups.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantView {
    pub tenant_id: String,
    pub client_id: String,
    pub vendor_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub status: domain::TenantStatus,
    pub onboarding_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&domain::Tenant> for TenantView {
    fn from(t: &domain::Tenant) -> Self {
        Self {
            tenant_id: t.tenant_id.clone(),
            client_id: t.client_id.clone(),
            vendor_id: t.vendor_id.clone(),
            name: t.name.clone(),
            email: t.email.clone(),
            phone: t.phone.clone(),
            address: t.address.clone(),
            status: t.status,
            onboarding_status: t.onboarding_status.clone(),
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

/// `Company`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyView {
    pub company_id: String,
    pub tenant_id: String,
    pub group_id: Option<String>,
    pub name: String,
}

impl From<&domain::Company> for CompanyView {
    fn from(c: &domain::Company) -> Self {
        Self {
            company_id: c.company_id.clone(),
            tenant_id: c.tenant_id.clone(),
            group_id: c.group_id.clone(),
            name: c.name.clone(),
        }
    }
}

/// `User`, with `passwordHash`/`externalAuthId` deliberately left off --
/// those never cross the wire.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub user_id: String,
    pub tenant_id: String,
    pub email: String,
    pub role: domain::UserRole,
    pub scope: Option<domain::Scope>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&domain::User> for UserView {
    fn from(u: &domain::User) -> Self {
        Self {
            user_id: u.user_id.clone(),
            tenant_id: u.tenant_id.clone(),
            email: u.email.clone(),
            role: u.role,
            scope: u.scope.clone(),
            active: u.active,
            created_at: u.created_at,
        }
    }
}

/// `Case` summary, as returned in `GET /cases` list rows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseSummaryView {
    pub case_id: String,
    pub client_id: String,
    pub vendor_id: String,
    pub case_type: domain::CaseType,
    pub status: domain::CaseStatus,
    pub priority: domain::CasePriority,
    pub owner_team: domain::OwnerTeam,
    pub escalation_level: u8,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl From<&domain::Case> for CaseSummaryView {
    fn from(c: &domain::Case) -> Self {
        Self {
            case_id: c.case_id.clone(),
            client_id: c.client_id.clone(),
            vendor_id: c.vendor_id.clone(),
            case_type: c.case_type,
            status: c.status,
            priority: c.priority,
            owner_team: c.owner_team,
            escalation_level: c.escalation_level.0,
            title: c.title.clone(),
            created_at: c.created_at,
            updated_at: c.updated_at,
            resolved_at: c.resolved_at,
        }
    }
}

/// `Case` plus embedded messages/evidence/checklist/decisions, as returned
/// by `GET /cases/{caseId}`. Nulls are omitted rather than emitted -- the
/// embedded collections are simply empty when there is nothing to show.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseDetailView {
    #[serde(flatten)]
    pub case: CaseSummaryView,
    pub description: String,
    pub opened_by: String,
    pub metadata: serde_json::Value,
    pub checklist: Vec<ChecklistStepView>,
    pub evidence: Vec<EvidenceView>,
    pub messages: Vec<MessageView>,
    pub decisions: Vec<DecisionLogEntryView>,
}

/// `ChecklistStep`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistStepView {
    pub checklist_step_id: String,
    pub case_id: String,
    pub step_key: String,
    pub sequence: u32,
    pub label: String,
    pub status: domain::ChecklistStepStatus,
    pub requires_evidence: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub completed_by: Option<String>,
}

impl From<&domain::ChecklistStep> for ChecklistStepView {
    fn from(s: &domain::ChecklistStep) -> Self {
        Self {
            checklist_step_id: s.checklist_step_id.clone(),
            case_id: s.case_id.clone(),
            step_key: s.step_key.clone(),
            sequence: s.sequence,
            label: s.label.clone(),
            status: s.status,
            requires_evidence: s.requires_evidence,
            completed_at: s.completed_at,
            completed_by: s.completed_by.clone(),
        }
    }
}

/// `Evidence`. `storageKey` is included for audit/debugging views; the
/// retrieval URL is fetched separately via the signed-URL endpoint rather
/// than embedded here, since it expires.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceView {
    pub evidence_id: String,
    pub case_id: String,
    pub evidence_type: String,
    pub version: u32,
    pub original_filename: String,
    pub content_hash: String,
    pub size_bytes: u64,
    pub content_type: String,
    pub status: domain::EvidenceStatus,
    pub uploaded_by: String,
    pub uploaded_at: DateTime<Utc>,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_note: Option<String>,
}

impl From<&domain::Evidence> for EvidenceView {
    fn from(e: &domain::Evidence) -> Self {
        Self {
            evidence_id: e.evidence_id.clone(),
            case_id: e.case_id.clone(),
            evidence_type: e.evidence_type.clone(),
            version: e.version,
            original_filename: e.original_filename.clone(),
            content_hash: e.content_hash.clone(),
            size_bytes: e.size_bytes,
            content_type: e.content_type.clone(),
            status: e.status,
            uploaded_by: e.uploaded_by.clone(),
            uploaded_at: e.uploaded_at,
            reviewed_by: e.reviewed_by.clone(),
            reviewed_at: e.reviewed_at,
            review_note: e.review_note.clone(),
        }
    }
}

/// `Message`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub message_id: String,
    pub case_id: String,
    pub sender_user_id: String,
    pub sender_context: domain::SenderContext,
    pub channel: domain::Channel,
    pub is_internal_note: bool,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
}

impl From<&domain::Message> for MessageView {
    fn from(m: &domain::Message) -> Self {
        Self {
            message_id: m.message_id.clone(),
            case_id: m.case_id.clone(),
            sender_user_id: m.sender_user_id.clone(),
            sender_context: m.sender_context,
            channel: m.channel,
            is_internal_note: m.is_internal_note,
            body: m.body.clone(),
            created_at: m.created_at,
            edited_at: m.edited_at,
        }
    }
}

/// `DecisionLogEntry`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionLogEntryView {
    pub decision_id: String,
    pub case_id: String,
    pub decision_type: domain::DecisionType,
    pub decided_by: String,
    pub rationale: String,
    pub created_at: DateTime<Utc>,
}

impl From<&domain::DecisionLogEntry> for DecisionLogEntryView {
    fn from(d: &domain::DecisionLogEntry) -> Self {
        Self {
            decision_id: d.decision_id.clone(),
            case_id: d.case_id.clone(),
            decision_type: d.decision_type,
            decided_by: d.decided_by.clone(),
            rationale: d.rationale.clone(),
            created_at: d.created_at,
        }
    }
}

/// `Notification`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationView {
    pub notification_id: String,
    pub case_id: String,
    pub event_key: String,
    pub summary: String,
    pub priority: domain::NotificationPriority,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

impl From<&domain::Notification> for NotificationView {
    fn from(n: &domain::Notification) -> Self {
        Self {
            notification_id: n.notification_id.clone(),
            case_id: n.case_id.clone(),
            event_key: n.event_key.clone(),
            summary: n.summary.clone(),
            priority: n.priority,
            created_at: n.created_at,
            read_at: n.read_at,
        }
    }
}

/// Categorical breakdown for the unread-count endpoint. `payment` and
/// `case` are drawn from `eventKey`'s prefix (`payment_`/`invoice_` vs.
/// everything else); `critical` is drawn from `priority == high` and
/// overlaps both of the other two buckets.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountView {
    pub total: usize,
    pub payment: usize,
    pub case: usize,
    pub critical: usize,
}

/// `Relationship`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipView {
    pub relationship_id: String,
    pub client_id: String,
    pub vendor_id: String,
    pub status: domain::RelationshipStatus,
    pub effective_from: DateTime<Utc>,
    pub effective_to: Option<DateTime<Utc>>,
}

impl From<&domain::Relationship> for RelationshipView {
    fn from(r: &domain::Relationship) -> Self {
        Self {
            relationship_id: r.relationship_id.clone(),
            client_id: r.client_id.clone(),
            vendor_id: r.vendor_id.clone(),
            status: r.status,
            effective_from: r.effective_from,
            effective_to: r.effective_to,
        }
    }
}

/// `Invite`, as returned by `POST /invites` (the token itself is returned
/// once, out of band, never stored or re-shown -- see
/// [`crate::requests::CreateInviteResponse`]).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteView {
    pub invite_id: String,
    pub inviting_tenant_id: String,
    pub invitee_email: String,
    pub status: domain::InviteStatus,
    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
}

impl From<&domain::Invite> for InviteView {
    fn from(i: &domain::Invite) -> Self {
        Self {
            invite_id: i.invite_id.clone(),
            inviting_tenant_id: i.inviting_tenant_id.clone(),
            invitee_email: i.invitee_email.clone(),
            status: i.status,
            expires_at: i.expires_at,
            accepted_at: i.accepted_at,
        }
    }
}

/// `GetMyContexts()`: the tenant's own client/vendor identity plus the
/// relationships it participates in on each side, so the UI can offer
/// "view as client" / "view as vendor" without a server-side session flag.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyContextsView {
    pub tenant: TenantView,
    pub client_relationships: Vec<RelationshipView>,
    pub vendor_relationships: Vec<RelationshipView>,
}

/// A denormalized ingested invoice row (read-only view over the
/// ERP-ingested table).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceView {
    pub vendor_id: String,
    pub client_id: String,
    pub invoice_num: String,
    pub amount_cents: i64,
    pub currency: String,
    pub due_date: NaiveDate,
}

impl From<&domain::IngestInvoiceRow> for InvoiceView {
    fn from(r: &domain::IngestInvoiceRow) -> Self {
        Self {
            vendor_id: r.vendor_id.clone(),
            client_id: r.client_id.clone(),
            invoice_num: r.invoice_num.clone(),
            amount_cents: r.amount_cents,
            currency: r.currency.clone(),
            due_date: r.due_date,
        }
    }
}

/// A denormalized ingested payment row.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentView {
    pub vendor_id: String,
    pub client_id: String,
    pub payment_ref: String,
    pub amount_cents: i64,
    pub currency: String,
    pub paid_at: DateTime<Utc>,
}

impl From<&domain::IngestPaymentRow> for PaymentView {
    fn from(r: &domain::IngestPaymentRow) -> Self {
        Self {
            vendor_id: r.vendor_id.clone(),
            client_id: r.client_id.clone(),
            payment_ref: r.payment_ref.clone(),
            amount_cents: r.amount_cents,
            currency: r.currency.clone(),
            paid_at: r.paid_at,
        }
    }
}

/// `GET /chain/verify` (internal only).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainVerificationView {
    pub valid: bool,
    pub broken_at: Option<u64>,
    pub reason: Option<String>,
}

impl From<vmp_core::audit::ChainVerification> for ChainVerificationView {
    fn from(v: vmp_core::audit::ChainVerification) -> Self {
        match v {
            vmp_core::audit::ChainVerification::Valid => Self { valid: true, broken_at: None, reason: None },
            vmp_core::audit::ChainVerification::Invalid { broken_at, reason } => {
                Self { valid: false, broken_at: Some(broken_at), reason: Some(reason) }
            }
        }
    }
}

// ============================================================================
// SECTION: Ops scoped views (internal only)
// ============================================================================

/// One group node in `GetOrgTree`, with its member companies.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgGroupView {
    pub group_id: String,
    pub companies: Vec<CompanyView>,
}

/// `GetOrgTree`: every group's companies, plus companies with no group.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgTreeView {
    pub groups: Vec<OrgGroupView>,
    pub ungrouped: Vec<CompanyView>,
}

/// `GetScopedDashboard(scopeType, scopeId)`: case counts by status within
/// the requested scope.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopedDashboardView {
    pub total_cases: usize,
    pub open_cases: usize,
    pub waiting_supplier_cases: usize,
    pub waiting_internal_cases: usize,
    pub blocked_cases: usize,
    pub resolved_cases: usize,
}

/// One row of `GetVendorDirectory(scopeType, scopeId)`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorDirectoryEntryView {
    pub vendor_tenant: TenantView,
    pub relationships: Vec<RelationshipView>,
}
