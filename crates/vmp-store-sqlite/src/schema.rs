// crates/vmp-store-sqlite/src/schema.rs
// ============================================================================
// Module: Schema
// Description: SQLite DDL and the one-shot migration that creates it.
// Purpose: Give every table a single, version-controlled source of truth.
// Dependencies: rusqlite
// ============================================================================

use rusqlite::Connection;

use crate::error::SqliteStoreError;

/// Current schema version. Bump alongside any DDL change below.
pub const SCHEMA_VERSION: i64 = 1;

const DDL: &str = r"
CREATE TABLE IF NOT EXISTS schema_meta (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS tenants (
    tenant_id TEXT PRIMARY KEY,
    client_id TEXT NOT NULL UNIQUE,
    vendor_id TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    phone TEXT,
    address TEXT,
    settings TEXT NOT NULL,
    status TEXT NOT NULL,
    onboarding_status TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT
);

CREATE TABLE IF NOT EXISTS companies (
    company_id TEXT PRIMARY KEY,
    tenant_id TEXT NOT NULL REFERENCES tenants(tenant_id),
    group_id TEXT,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT
);
CREATE INDEX IF NOT EXISTS idx_companies_tenant ON companies(tenant_id);
CREATE INDEX IF NOT EXISTS idx_companies_group ON companies(group_id);

CREATE TABLE IF NOT EXISTS users (
    user_id TEXT PRIMARY KEY,
    tenant_id TEXT NOT NULL REFERENCES tenants(tenant_id),
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT,
    external_auth_id TEXT,
    role TEXT NOT NULL,
    scope_json TEXT,
    active INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT
);
CREATE INDEX IF NOT EXISTS idx_users_tenant ON users(tenant_id);

CREATE TABLE IF NOT EXISTS sessions (
    token_hash TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(user_id),
    tenant_id TEXT NOT NULL REFERENCES tenants(tenant_id),
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL,
    revoked_at TEXT
);
CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);

CREATE TABLE IF NOT EXISTS relationships (
    relationship_id TEXT PRIMARY KEY,
    client_id TEXT NOT NULL,
    vendor_id TEXT NOT NULL,
    status TEXT NOT NULL,
    effective_from TEXT NOT NULL,
    effective_to TEXT,
    metadata TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT
);
CREATE INDEX IF NOT EXISTS idx_relationships_client ON relationships(client_id);
CREATE INDEX IF NOT EXISTS idx_relationships_vendor ON relationships(vendor_id);

CREATE TABLE IF NOT EXISTS invites (
    invite_id TEXT PRIMARY KEY,
    inviting_tenant_id TEXT NOT NULL REFERENCES tenants(tenant_id),
    invitee_email TEXT NOT NULL,
    token_hash TEXT NOT NULL UNIQUE,
    status TEXT NOT NULL,
    created_by TEXT NOT NULL,
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL,
    accepted_at TEXT,
    resulting_tenant_id TEXT
);

CREATE TABLE IF NOT EXISTS cases (
    case_id TEXT PRIMARY KEY,
    client_id TEXT NOT NULL,
    vendor_id TEXT NOT NULL,
    case_type TEXT NOT NULL,
    status TEXT NOT NULL,
    priority TEXT NOT NULL,
    owner_team TEXT NOT NULL,
    escalation_level INTEGER NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    opened_by TEXT NOT NULL,
    metadata TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    resolved_at TEXT
);
CREATE INDEX IF NOT EXISTS idx_cases_client ON cases(client_id);
CREATE INDEX IF NOT EXISTS idx_cases_vendor ON cases(vendor_id);
CREATE INDEX IF NOT EXISTS idx_cases_status ON cases(status);

CREATE TABLE IF NOT EXISTS checklist_steps (
    checklist_step_id TEXT PRIMARY KEY,
    case_id TEXT NOT NULL REFERENCES cases(case_id),
    step_key TEXT NOT NULL,
    sequence INTEGER NOT NULL,
    label TEXT NOT NULL,
    status TEXT NOT NULL,
    requires_evidence INTEGER NOT NULL,
    completed_at TEXT,
    completed_by TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE(case_id, step_key)
);
CREATE INDEX IF NOT EXISTS idx_checklist_case ON checklist_steps(case_id);

CREATE TABLE IF NOT EXISTS evidence (
    evidence_id TEXT PRIMARY KEY,
    case_id TEXT NOT NULL REFERENCES cases(case_id),
    evidence_type TEXT NOT NULL,
    version INTEGER NOT NULL,
    original_filename TEXT NOT NULL,
    storage_key TEXT NOT NULL,
    content_hash TEXT NOT NULL,
    size_bytes INTEGER NOT NULL,
    content_type TEXT NOT NULL,
    status TEXT NOT NULL,
    uploaded_by TEXT NOT NULL,
    uploaded_at TEXT NOT NULL,
    reviewed_by TEXT,
    reviewed_at TEXT,
    review_note TEXT,
    UNIQUE(case_id, evidence_type, version)
);
CREATE INDEX IF NOT EXISTS idx_evidence_case ON evidence(case_id);

CREATE TABLE IF NOT EXISTS messages (
    message_id TEXT PRIMARY KEY,
    case_id TEXT NOT NULL REFERENCES cases(case_id),
    sender_user_id TEXT NOT NULL,
    sender_context TEXT NOT NULL,
    channel TEXT NOT NULL,
    is_internal_note INTEGER NOT NULL DEFAULT 0,
    body TEXT NOT NULL,
    classifier_hint TEXT,
    created_at TEXT NOT NULL,
    edited_at TEXT
);
CREATE INDEX IF NOT EXISTS idx_messages_case ON messages(case_id);

CREATE TABLE IF NOT EXISTS decision_log (
    decision_id TEXT PRIMARY KEY,
    case_id TEXT NOT NULL REFERENCES cases(case_id),
    decision_type TEXT NOT NULL,
    decided_by TEXT NOT NULL,
    rationale TEXT NOT NULL,
    checklist_step_id TEXT,
    evidence_id TEXT,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_decision_log_case ON decision_log(case_id);

CREATE TABLE IF NOT EXISTS notifications (
    notification_id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(user_id),
    case_id TEXT NOT NULL,
    event_key TEXT NOT NULL,
    summary TEXT NOT NULL,
    priority TEXT NOT NULL,
    created_at TEXT NOT NULL,
    read_at TEXT
);
CREATE INDEX IF NOT EXISTS idx_notifications_user ON notifications(user_id);

CREATE TABLE IF NOT EXISTS audit_chain (
    sequence_id INTEGER PRIMARY KEY AUTOINCREMENT,
    document_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    payload_hash TEXT NOT NULL,
    metadata TEXT NOT NULL,
    previous_hash TEXT NOT NULL,
    chain_hash TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_audit_chain_document ON audit_chain(document_id);

CREATE TABLE IF NOT EXISTS ingested_invoices (
    vendor_id TEXT NOT NULL,
    client_id TEXT NOT NULL,
    invoice_num TEXT NOT NULL,
    amount_cents INTEGER NOT NULL,
    currency TEXT NOT NULL,
    due_date TEXT NOT NULL,
    raw_payload TEXT NOT NULL,
    ingested_at TEXT NOT NULL,
    PRIMARY KEY (vendor_id, client_id, invoice_num)
);

CREATE TABLE IF NOT EXISTS ingested_payments (
    vendor_id TEXT NOT NULL,
    client_id TEXT NOT NULL,
    payment_ref TEXT NOT NULL,
    amount_cents INTEGER NOT NULL,
    currency TEXT NOT NULL,
    paid_at TEXT NOT NULL,
    raw_payload TEXT NOT NULL,
    ingested_at TEXT NOT NULL,
    PRIMARY KEY (vendor_id, client_id, payment_ref)
);
";

/// Creates every table if absent and records the schema version.
///
/// # Errors
///
/// Returns [`SqliteStoreError`] if any DDL statement fails.
pub fn initialize(conn: &Connection) -> Result<(), SqliteStoreError> {
    conn.execute_batch(DDL)?;
    let recorded: Option<i64> =
        conn.query_row("SELECT version FROM schema_meta LIMIT 1", [], |row| row.get(0)).ok();
    if recorded.is_none() {
        conn.execute("INSERT INTO schema_meta (version) VALUES (?1)", [SCHEMA_VERSION])?;
    }
    Ok(())
}
