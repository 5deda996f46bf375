// crates/vmp-store-sqlite/src/cases.rs
// ============================================================================
// Module: Case Repository
// Description: CRUD and authorization-filtered listing for cases.
// Purpose: Persist the central collaboration unit and enforce row visibility
//          at the one seam every other layer depends on.
// Dependencies: rusqlite, vmp-core, vmp-authz
// ============================================================================

use rusqlite::OptionalExtension;
use rusqlite::params;
use vmp_authz::AuthorizationFilters;
use vmp_core::domain::Case;
use vmp_core::domain::CasePriority;
use vmp_core::domain::CaseStatus;
use vmp_core::domain::CaseType;
use vmp_core::domain::EscalationLevel;
use vmp_core::domain::OwnerTeam;

use crate::error::SqliteStoreError;
use crate::store::Store;

fn case_type_label(case_type: CaseType) -> &'static str {
    match case_type {
        CaseType::General => "general",
        CaseType::Invoice => "invoice",
        CaseType::Payment => "payment",
        CaseType::Onboarding => "onboarding",
        CaseType::Contract => "contract",
        CaseType::Compliance => "compliance",
        CaseType::BankChange => "bank_change",
    }
}

fn parse_case_type(label: &str) -> Result<CaseType, SqliteStoreError> {
    match label {
        "general" => Ok(CaseType::General),
        "invoice" => Ok(CaseType::Invoice),
        "payment" => Ok(CaseType::Payment),
        "onboarding" => Ok(CaseType::Onboarding),
        "contract" => Ok(CaseType::Contract),
        "compliance" => Ok(CaseType::Compliance),
        "bank_change" => Ok(CaseType::BankChange),
        other => Err(SqliteStoreError::Invalid(format!("unknown case type {other}"))),
    }
}

fn case_status_label(status: CaseStatus) -> &'static str {
    match status {
        CaseStatus::Open => "open",
        CaseStatus::WaitingSupplier => "waiting_supplier",
        CaseStatus::WaitingInternal => "waiting_internal",
        CaseStatus::Resolved => "resolved",
        CaseStatus::Blocked => "blocked",
    }
}

fn parse_case_status(label: &str) -> Result<CaseStatus, SqliteStoreError> {
    match label {
        "open" => Ok(CaseStatus::Open),
        "waiting_supplier" => Ok(CaseStatus::WaitingSupplier),
        "waiting_internal" => Ok(CaseStatus::WaitingInternal),
        "resolved" => Ok(CaseStatus::Resolved),
        "blocked" => Ok(CaseStatus::Blocked),
        other => Err(SqliteStoreError::Invalid(format!("unknown case status {other}"))),
    }
}

fn priority_label(priority: CasePriority) -> &'static str {
    match priority {
        CasePriority::Low => "low",
        CasePriority::Normal => "normal",
        CasePriority::High => "high",
        CasePriority::Urgent => "urgent",
    }
}

fn parse_priority(label: &str) -> Result<CasePriority, SqliteStoreError> {
    match label {
        "low" => Ok(CasePriority::Low),
        "normal" => Ok(CasePriority::Normal),
        "high" => Ok(CasePriority::High),
        "urgent" => Ok(CasePriority::Urgent),
        other => Err(SqliteStoreError::Invalid(format!("unknown case priority {other}"))),
    }
}

fn owner_team_label(team: OwnerTeam) -> &'static str {
    match team {
        OwnerTeam::Procurement => "procurement",
        OwnerTeam::Ap => "ap",
        OwnerTeam::Finance => "finance",
    }
}

fn parse_owner_team(label: &str) -> Result<OwnerTeam, SqliteStoreError> {
    match label {
        "procurement" => Ok(OwnerTeam::Procurement),
        "ap" => Ok(OwnerTeam::Ap),
        "finance" => Ok(OwnerTeam::Finance),
        other => Err(SqliteStoreError::Invalid(format!("unknown owner team {other}"))),
    }
}

fn row_to_case(row: &rusqlite::Row<'_>) -> rusqlite::Result<Case> {
    let case_type_label: String = row.get("case_type")?;
    let status_label: String = row.get("status")?;
    let priority_label: String = row.get("priority")?;
    let owner_team_label: String = row.get("owner_team")?;
    let escalation_level: u8 = row.get("escalation_level")?;
    Ok(Case {
        case_id: row.get("case_id")?,
        client_id: row.get("client_id")?,
        vendor_id: row.get("vendor_id")?,
        case_type: parse_case_type(&case_type_label).unwrap_or(CaseType::General),
        status: parse_case_status(&status_label).unwrap_or(CaseStatus::Open),
        priority: parse_priority(&priority_label).unwrap_or(CasePriority::Normal),
        owner_team: parse_owner_team(&owner_team_label).unwrap_or(OwnerTeam::Procurement),
        escalation_level: EscalationLevel(escalation_level),
        title: row.get("title")?,
        description: row.get("description")?,
        opened_by: row.get("opened_by")?,
        metadata: {
            let raw: String = row.get("metadata")?;
            serde_json::from_str(&raw).unwrap_or_else(|_| serde_json::json!({}))
        },
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        resolved_at: row.get("resolved_at")?,
    })
}

impl Store {
    /// Inserts a new case row.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::Conflict`] if `case_id` already exists.
    pub fn insert_case(&self, case: &Case) -> Result<(), SqliteStoreError> {
        self.with_connection(|conn| self.insert_case_with(conn, case))
    }

    /// Same as [`Store::insert_case`], against an already-open connection;
    /// case creation seeds the checklist and appends an audit entry in the
    /// same transaction.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::Conflict`] if `case_id` already exists.
    pub fn insert_case_with(&self, conn: &rusqlite::Connection, case: &Case) -> Result<(), SqliteStoreError> {
        conn.execute(
            "INSERT INTO cases (case_id, client_id, vendor_id, case_type, status, priority, owner_team, escalation_level, title, description, opened_by, metadata, created_at, updated_at, resolved_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15)",
            params![
                case.case_id,
                case.client_id,
                case.vendor_id,
                case_type_label(case.case_type),
                case_status_label(case.status),
                priority_label(case.priority),
                owner_team_label(case.owner_team),
                case.escalation_level.0,
                case.title,
                case.description,
                case.opened_by,
                case.metadata.to_string(),
                case.created_at,
                case.updated_at,
                case.resolved_at,
            ],
        )?;
        Ok(())
    }

    /// Finds a case by ID without an authorization filter applied.
    ///
    /// Callers must separately confirm `filters.allows_case(...)` on the
    /// result before returning it to a principal; this method exists so
    /// repository code needing the raw row (e.g. the case engine, which
    /// already holds a `with_case_lock` guard) does not pay for a second
    /// filtered query.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] on a backend failure.
    pub fn find_case_unfiltered(&self, case_id: &str) -> Result<Option<Case>, SqliteStoreError> {
        self.with_connection(|conn| {
            conn.query_row("SELECT * FROM cases WHERE case_id = ?1", [case_id], row_to_case)
                .optional()
                .map_err(SqliteStoreError::from)
        })
    }

    /// Finds a case by ID, returning `Ok(None)` both when the row is absent
    /// and when `filters` does not permit seeing it. This makes "not found"
    /// and "forbidden" indistinguishable to callers outside the domain
    /// layer, preventing enumeration of case IDs outside a principal's view.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] on a backend failure.
    pub fn find_case(&self, case_id: &str, filters: &AuthorizationFilters) -> Result<Option<Case>, SqliteStoreError> {
        let case = self.find_case_unfiltered(case_id)?;
        Ok(case.filter(|case| filters.allows_case(&case.client_id, &case.vendor_id)))
    }

    /// Lists every case visible under `filters`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] on a backend failure.
    pub fn list_cases_filtered(&self, filters: &AuthorizationFilters) -> Result<Vec<Case>, SqliteStoreError> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare("SELECT * FROM cases ORDER BY created_at DESC")?;
            let rows = stmt.query_map([], row_to_case)?.collect::<Result<Vec<_>, _>>()?;
            Ok(rows
                .into_iter()
                .filter(|case| filters.allows_case(&case.client_id, &case.vendor_id))
                .collect())
        })
    }

    /// Updates a case's derived status and, when transitioning into a
    /// terminal status, its `resolved_at` timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::NotFound`] if no case matches.
    pub fn update_case_status(
        &self,
        conn: &rusqlite::Connection,
        case_id: &str,
        status: CaseStatus,
        updated_at: chrono::DateTime<chrono::Utc>,
        resolved_at: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Result<(), SqliteStoreError> {
        let changed = conn.execute(
            "UPDATE cases SET status = ?1, updated_at = ?2, resolved_at = ?3 WHERE case_id = ?4",
            params![case_status_label(status), updated_at, resolved_at, case_id],
        )?;
        if changed == 0 {
            return Err(SqliteStoreError::NotFound(format!("case {case_id}")));
        }
        Ok(())
    }

    /// Escalates a case to the next tier and bumps `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::NotFound`] if no case matches.
    pub fn escalate_case(
        &self,
        conn: &rusqlite::Connection,
        case_id: &str,
        new_level: EscalationLevel,
        updated_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), SqliteStoreError> {
        let changed = conn.execute(
            "UPDATE cases SET escalation_level = ?1, updated_at = ?2 WHERE case_id = ?3",
            params![new_level.0, updated_at, case_id],
        )?;
        if changed == 0 {
            return Err(SqliteStoreError::NotFound(format!("case {case_id}")));
        }
        Ok(())
    }

    /// Reassigns a case's owning team and bumps `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::NotFound`] if no case matches.
    pub fn reassign_case(
        &self,
        conn: &rusqlite::Connection,
        case_id: &str,
        owner_team: OwnerTeam,
        updated_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), SqliteStoreError> {
        let changed = conn.execute(
            "UPDATE cases SET owner_team = ?1, updated_at = ?2 WHERE case_id = ?3",
            params![owner_team_label(owner_team), updated_at, case_id],
        )?;
        if changed == 0 {
            return Err(SqliteStoreError::NotFound(format!("case {case_id}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        reason = "Test-only assertions."
    )]
    use chrono::Utc;

    use super::*;

    fn sample() -> Case {
        Case {
            case_id: "CASE-1".to_string(),
            client_id: "TC-AAAA1111".to_string(),
            vendor_id: "TV-BBBB2222".to_string(),
            case_type: CaseType::Invoice,
            status: CaseStatus::Open,
            priority: CasePriority::Normal,
            owner_team: OwnerTeam::Ap,
            escalation_level: EscalationLevel::NONE,
            title: "Missing invoice".to_string(),
            description: "Vendor has not submitted an invoice PDF.".to_string(),
            opened_by: "USR-1".to_string(),
            metadata: serde_json::json!({}),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            resolved_at: None,
        }
    }

    #[test]
    fn insert_then_find_unfiltered() {
        let store = Store::open_in_memory().expect("open");
        let case = sample();
        store.insert_case(&case).expect("insert");
        let found = store.find_case_unfiltered(&case.case_id).expect("find").expect("present");
        assert_eq!(found.title, case.title);
    }

    #[test]
    fn find_case_hides_rows_outside_filter_scope() {
        let store = Store::open_in_memory().expect("open");
        let case = sample();
        store.insert_case(&case).expect("insert");

        let allowed = AuthorizationFilters::internal_super("TNT-OPS");
        assert!(store.find_case(&case.case_id, &allowed).expect("find").is_some());

        let denied = AuthorizationFilters::for_internal_scoped(
            "TNT-OPS",
            std::collections::BTreeSet::from(["TC-OTHERXXX".to_string()]),
        );
        assert!(store.find_case(&case.case_id, &denied).expect("find").is_none());
    }

    #[test]
    fn list_cases_filtered_respects_visibility() {
        let store = Store::open_in_memory().expect("open");
        store.insert_case(&sample()).expect("insert");

        let scoped = AuthorizationFilters::for_internal_scoped(
            "TNT-OPS",
            std::collections::BTreeSet::from(["TC-AAAA1111".to_string()]),
        );
        assert_eq!(store.list_cases_filtered(&scoped).expect("list").len(), 1);

        let unrelated = AuthorizationFilters::for_internal_scoped(
            "TNT-OPS",
            std::collections::BTreeSet::from(["TC-ZZZZZZZZ".to_string()]),
        );
        assert!(store.list_cases_filtered(&unrelated).expect("list").is_empty());
    }

    #[test]
    fn update_status_and_escalate() {
        let store = Store::open_in_memory().expect("open");
        let case = sample();
        store.insert_case(&case).expect("insert");

        store
            .with_case_lock(&case.case_id, |conn| {
                store.update_case_status(conn, &case.case_id, CaseStatus::Resolved, Utc::now(), Some(Utc::now()))?;
                store.escalate_case(conn, &case.case_id, EscalationLevel::NONE.escalate(), Utc::now())
            })
            .expect("update");

        let reloaded = store.find_case_unfiltered(&case.case_id).expect("find").expect("present");
        assert_eq!(reloaded.status, CaseStatus::Resolved);
        assert_eq!(reloaded.escalation_level, EscalationLevel::NONE.escalate());
    }
}
