// crates/vmp-domain/src/case_engine.rs
// ============================================================================
// Module: Case Engine
// Description: Case creation, checklist-driven status derivation, decisions,
//              escalation, and vendor-onboarding approval.
// Purpose: The one place a case's status is ever computed and written.
// Dependencies: vmp-core, vmp-authz, vmp-store-sqlite
// ============================================================================

//! ## Overview
//! A case's `status` is never set directly by a caller. Every operation that
//! can change checklist or evidence state instead recomputes status from the
//! resulting snapshot inside the same [`vmp_store_sqlite::Store::with_case_lock`]
//! transaction that wrote the change, per the rule in [`derive_status`].

use std::sync::Arc;

use vmp_authz::AuthorizationFilters;
use vmp_core::Clock;
use vmp_core::domain::Case;
use vmp_core::domain::CasePriority;
use vmp_core::domain::CaseStatus;
use vmp_core::domain::CaseType;
use vmp_core::domain::Channel;
use vmp_core::domain::ChecklistStep;
use vmp_core::domain::ChecklistStepStatus;
use vmp_core::domain::DecisionLogEntry;
use vmp_core::domain::DecisionType;
use vmp_core::domain::EscalationLevel;
use vmp_core::domain::Message;
use vmp_core::domain::OwnerTeam;
use vmp_core::domain::SenderContext;
use vmp_core::new_id;
use vmp_store_sqlite::Store;

use crate::error::DomainError;

/// Derives a case's next status from its current status and checklist
/// snapshot.
///
/// - An empty checklist leaves `current` untouched (general/contract/
///   compliance cases are driven by messages and manual decisions, not
///   checklist completion).
/// - Every step satisfied (complete or skipped) resolves the case.
/// - Any step rejected waits on the supplier, regardless of the rest.
/// - Otherwise, any step in progress (evidence submitted, unverified) waits
///   on internal review.
/// - Otherwise `current` is returned unchanged.
#[must_use]
pub fn derive_status(current: CaseStatus, steps: &[ChecklistStep]) -> CaseStatus {
    if steps.is_empty() {
        return current;
    }
    if steps.iter().all(ChecklistStep::is_satisfied) {
        return CaseStatus::Resolved;
    }
    if steps.iter().any(|step| step.status == ChecklistStepStatus::Rejected) {
        return CaseStatus::WaitingSupplier;
    }
    if steps.iter().any(|step| step.status == ChecklistStepStatus::InProgress) {
        return CaseStatus::WaitingInternal;
    }
    current
}

/// Every case-lifecycle operation, backed by one [`Store`] and a [`Clock`].
pub struct CaseEngine {
    store: Arc<Store>,
    clock: Arc<dyn Clock>,
}

impl CaseEngine {
    #[must_use]
    pub fn new(store: Arc<Store>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Opens a new case, seeding its checklist from the fixed rule table for
    /// `case_type` and appending the opening audit entry, atomically.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] if `title` is empty,
    /// [`DomainError::Store`] on a backend failure.
    pub fn create_case(
        &self,
        client_id: &str,
        vendor_id: &str,
        case_type: CaseType,
        priority: CasePriority,
        owner_team: OwnerTeam,
        title: &str,
        description: &str,
        opened_by: &str,
    ) -> Result<Case, DomainError> {
        if title.trim().is_empty() {
            return Err(DomainError::validation("case title must not be empty"));
        }
        let now = self.clock.now();
        let case = Case {
            case_id: new_id("CASE", Some(title)),
            client_id: client_id.to_string(),
            vendor_id: vendor_id.to_string(),
            case_type,
            status: CaseStatus::Open,
            priority,
            owner_team,
            escalation_level: Default::default(),
            title: title.to_string(),
            description: description.to_string(),
            opened_by: opened_by.to_string(),
            metadata: serde_json::json!({}),
            created_at: now,
            updated_at: now,
            resolved_at: None,
        };
        self.store.with_case_lock(&case.case_id, |conn| {
            self.store.insert_case_with(conn, &case)?;
            self.store.seed_checklist_for_case(conn, &case.case_id, case_type, now)?;
            self.store.append_audit_entry(
                conn,
                &case.case_id,
                opened_by,
                &vmp_core::audit::sha256_hex(case.description.as_bytes()),
                &serde_json::json!({ "action": "CASE_OPENED", "caseType": case_type }),
                now,
            )?;
            Ok(())
        })?;
        Ok(case)
    }

    /// Opens the bank-detail-change short-circuit: a [`CaseType::BankChange`]
    /// case owned by finance, carrying the vendor's proposed bank details in
    /// `metadata` for a reviewer to read before approving. The case's
    /// checklist requires a new bank letter and internal authorization (see
    /// [`vmp_core::checklist_rules::rule_steps_for`]).
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Store`] on a backend failure.
    pub fn request_bank_change(
        &self,
        client_id: &str,
        vendor_id: &str,
        proposed_bank_details: serde_json::Value,
        opened_by: &str,
    ) -> Result<Case, DomainError> {
        let now = self.clock.now();
        let case = Case {
            case_id: new_id("CASE", Some("bank-change")),
            client_id: client_id.to_string(),
            vendor_id: vendor_id.to_string(),
            case_type: CaseType::BankChange,
            status: CaseStatus::Open,
            priority: CasePriority::High,
            owner_team: OwnerTeam::Finance,
            escalation_level: EscalationLevel::NONE,
            title: "Bank detail change request".to_string(),
            description: "Vendor-requested update to payment bank details.".to_string(),
            opened_by: opened_by.to_string(),
            metadata: proposed_bank_details,
            created_at: now,
            updated_at: now,
            resolved_at: None,
        };
        self.store.with_case_lock(&case.case_id, |conn| {
            self.store.insert_case_with(conn, &case)?;
            self.store.seed_checklist_for_case(conn, &case.case_id, CaseType::BankChange, now)?;
            self.store.append_audit_entry(
                conn,
                &case.case_id,
                opened_by,
                &vmp_core::audit::sha256_hex(case.metadata.to_string().as_bytes()),
                &serde_json::json!({ "action": "BANK_CHANGE_REQUESTED" }),
                now,
            )?;
            Ok(())
        })?;
        Ok(case)
    }

    /// Approves a pending bank-detail-change case once its checklist is
    /// satisfied, resolving the case. Applying the new bank details against
    /// the payment backend is an external collaborator's responsibility;
    /// this only records that `metadata` was cleared for application.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Precondition`] if `case.case_type` is not
    /// [`CaseType::BankChange`] or any checklist step is unsatisfied,
    /// [`DomainError::NotFound`] if `case_id` is not visible under `filters`.
    pub fn approve_bank_change(&self, case_id: &str, filters: &AuthorizationFilters, decided_by: &str) -> Result<Case, DomainError> {
        let case = self
            .store
            .find_case(case_id, filters)?
            .ok_or_else(|| DomainError::not_found(format!("case {case_id}")))?;
        if case.case_type != CaseType::BankChange {
            return Err(DomainError::precondition("case is not a bank-detail-change case"));
        }
        let steps = self.store.list_checklist_steps(case_id)?;
        if !steps.iter().all(ChecklistStep::is_satisfied) {
            return Err(DomainError::precondition("bank-change checklist is not complete"));
        }
        let now = self.clock.now();
        self.store.with_case_lock(case_id, |conn| {
            self.store.update_case_status(conn, case_id, CaseStatus::Resolved, now, Some(now))?;
            let decision = DecisionLogEntry {
                decision_id: new_id("DEC", None),
                case_id: case_id.to_string(),
                decision_type: DecisionType::Approve,
                decided_by: decided_by.to_string(),
                rationale: "bank-detail change approved for application".to_string(),
                checklist_step_id: None,
                evidence_id: None,
                created_at: now,
            };
            self.store.insert_decision(conn, &decision)?;
            self.store.append_audit_entry(
                conn,
                case_id,
                decided_by,
                &vmp_core::audit::sha256_hex(case.metadata.to_string().as_bytes()),
                &serde_json::json!({ "action": "BANK_CHANGE_APPROVED" }),
                now,
            )?;
            Ok(())
        })?;
        Ok(Case { status: CaseStatus::Resolved, updated_at: now, resolved_at: Some(now), ..case })
    }

    /// Fetches a case under `filters`, folding "not found" and "forbidden"
    /// into the same `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Store`] on a backend failure.
    pub fn get_case(&self, case_id: &str, filters: &AuthorizationFilters) -> Result<Option<Case>, DomainError> {
        Ok(self.store.find_case(case_id, filters)?)
    }

    /// Lists every case visible under `filters`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Store`] on a backend failure.
    pub fn list_cases(&self, filters: &AuthorizationFilters) -> Result<Vec<Case>, DomainError> {
        Ok(self.store.list_cases_filtered(filters)?)
    }

    /// Transitions one checklist step and recomputes the case's status,
    /// logging a decision and an audit entry in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NotFound`] if `case_id` is not visible under
    /// `filters`, [`DomainError::Store`] on a backend failure.
    #[allow(clippy::too_many_arguments)]
    fn transition_step(
        &self,
        case_id: &str,
        checklist_step_id: &str,
        new_status: ChecklistStepStatus,
        decision_type: DecisionType,
        filters: &AuthorizationFilters,
        decided_by: &str,
        rationale: &str,
    ) -> Result<Case, DomainError> {
        let case = self
            .store
            .find_case(case_id, filters)?
            .ok_or_else(|| DomainError::not_found(format!("case {case_id}")))?;
        let now = self.clock.now();

        self.store.with_case_lock(case_id, |conn| {
            self.store
                .update_checklist_step_status(conn, checklist_step_id, new_status, Some(decided_by), now)?;
            let decision = DecisionLogEntry {
                decision_id: new_id("DEC", None),
                case_id: case_id.to_string(),
                decision_type,
                decided_by: decided_by.to_string(),
                rationale: rationale.to_string(),
                checklist_step_id: Some(checklist_step_id.to_string()),
                evidence_id: None,
                created_at: now,
            };
            self.store.insert_decision(conn, &decision)?;
            self.store.append_audit_entry(
                conn,
                case_id,
                decided_by,
                &vmp_core::audit::sha256_hex(rationale.as_bytes()),
                &serde_json::json!({ "action": "CHECKLIST_STEP_DECIDED", "checklistStepId": checklist_step_id, "decisionType": decision_type }),
                now,
            )?;
            Ok(())
        })?;

        self.recompute_status(&case)
    }

    /// Marks a checklist step complete (an internal reviewer verifying
    /// submitted evidence, or a step that needs no evidence).
    ///
    /// # Errors
    ///
    /// See [`CaseEngine::transition_step`].
    pub fn verify_step(
        &self,
        case_id: &str,
        checklist_step_id: &str,
        filters: &AuthorizationFilters,
        decided_by: &str,
        rationale: &str,
    ) -> Result<Case, DomainError> {
        self.transition_step(
            case_id,
            checklist_step_id,
            ChecklistStepStatus::Complete,
            DecisionType::Approve,
            filters,
            decided_by,
            rationale,
        )
    }

    /// Rejects a checklist step, moving the case to `WaitingSupplier`.
    ///
    /// # Errors
    ///
    /// See [`CaseEngine::transition_step`].
    pub fn reject_step(
        &self,
        case_id: &str,
        checklist_step_id: &str,
        filters: &AuthorizationFilters,
        decided_by: &str,
        rationale: &str,
    ) -> Result<Case, DomainError> {
        self.transition_step(
            case_id,
            checklist_step_id,
            ChecklistStepStatus::Rejected,
            DecisionType::Reject,
            filters,
            decided_by,
            rationale,
        )
    }

    /// Re-reads a case's checklist, derives its new status from
    /// [`derive_status`], and persists the transition if it changed.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Store`] on a backend failure.
    pub fn recompute_status(&self, case: &Case) -> Result<Case, DomainError> {
        let steps = self.store.list_checklist_steps(&case.case_id)?;
        let next_status = derive_status(case.status, &steps);
        if next_status == case.status {
            return Ok(case.clone());
        }
        let now = self.clock.now();
        let resolved_at = (next_status == CaseStatus::Resolved).then_some(now);
        self.store
            .with_case_lock(&case.case_id, |conn| self.store.update_case_status(conn, &case.case_id, next_status, now, resolved_at))?;
        Ok(Case {
            status: next_status,
            updated_at: now,
            resolved_at,
            ..case.clone()
        })
    }

    /// Escalates a case to `level` (1, 2, or 3), reassigning it to the AP
    /// team and appending an internal note recording `rationale`. Below
    /// level 3 the case moves to `WaitingInternal`; at level 3 it is a
    /// break-glass escalation that instead pins the case `blocked` and logs
    /// a dedicated audit entry, outside the normal checklist-driven status
    /// derivation.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] if `level` is not 1, 2, or 3,
    /// [`DomainError::NotFound`] if `case_id` is not visible under `filters`.
    pub fn escalate(
        &self,
        case_id: &str,
        filters: &AuthorizationFilters,
        decided_by: &str,
        level: u8,
        rationale: &str,
    ) -> Result<Case, DomainError> {
        if !(1..=3).contains(&level) {
            return Err(DomainError::validation("escalation level must be 1, 2, or 3"));
        }
        let case = self
            .store
            .find_case(case_id, filters)?
            .ok_or_else(|| DomainError::not_found(format!("case {case_id}")))?;
        let now = self.clock.now();
        let next_level = EscalationLevel(level);
        let is_break_glass = level == EscalationLevel::MAX.0;
        let next_status = if is_break_glass { CaseStatus::Blocked } else { CaseStatus::WaitingInternal };

        self.store.with_case_lock(case_id, |conn| {
            self.store.escalate_case(conn, case_id, next_level, now)?;
            self.store.reassign_case(conn, case_id, OwnerTeam::Ap, now)?;
            self.store.update_case_status(conn, case_id, next_status, now, None)?;
            let note = Message {
                message_id: new_id("MSG", None),
                case_id: case_id.to_string(),
                sender_user_id: decided_by.to_string(),
                sender_context: SenderContext::Internal,
                channel: Channel::Portal,
                is_internal_note: true,
                body: format!("Escalated to level {level}: {rationale}"),
                classifier_hint: None,
                created_at: now,
                edited_at: None,
            };
            self.store.insert_message_with(conn, &note)?;
            let decision = DecisionLogEntry {
                decision_id: new_id("DEC", None),
                case_id: case_id.to_string(),
                decision_type: DecisionType::Escalate,
                decided_by: decided_by.to_string(),
                rationale: rationale.to_string(),
                checklist_step_id: None,
                evidence_id: None,
                created_at: now,
            };
            self.store.insert_decision(conn, &decision)?;
            self.store.append_audit_entry(
                conn,
                case_id,
                decided_by,
                &vmp_core::audit::sha256_hex(rationale.as_bytes()),
                &serde_json::json!({ "action": "CASE_ESCALATED", "level": next_level.0 }),
                now,
            )?;
            if is_break_glass {
                self.store.append_audit_entry(
                    conn,
                    case_id,
                    decided_by,
                    &vmp_core::audit::sha256_hex(rationale.as_bytes()),
                    &serde_json::json!({ "action": "BREAK_GLASS", "caseId": case_id, "escalatedBy": decided_by }),
                    now,
                )?;
            }
            Ok(())
        })?;

        Ok(Case {
            escalation_level: next_level,
            owner_team: OwnerTeam::Ap,
            status: next_status,
            updated_at: now,
            ..case
        })
    }

    /// Approves a vendor-onboarding case: requires every checklist step
    /// satisfied, then resolves the case and activates every user on the
    /// vendor tenant.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Precondition`] if `case.case_type` is not
    /// [`CaseType::Onboarding`] or any checklist step is unsatisfied,
    /// [`DomainError::NotFound`] if `case_id` is not visible under `filters`.
    pub fn approve_onboarding(
        &self,
        case_id: &str,
        filters: &AuthorizationFilters,
        decided_by: &str,
    ) -> Result<Case, DomainError> {
        let case = self
            .store
            .find_case(case_id, filters)?
            .ok_or_else(|| DomainError::not_found(format!("case {case_id}")))?;
        if case.case_type != CaseType::Onboarding {
            return Err(DomainError::precondition("case is not an onboarding case"));
        }
        let steps = self.store.list_checklist_steps(case_id)?;
        if !steps.iter().all(ChecklistStep::is_satisfied) {
            return Err(DomainError::precondition("onboarding checklist is not complete"));
        }
        let vendor_tenant = self
            .store
            .find_tenant_by_vendor_id(&case.vendor_id)?
            .ok_or_else(|| DomainError::not_found(format!("vendor tenant {}", case.vendor_id)))?;
        let owner = self
            .store
            .list_users_for_tenant(&vendor_tenant.tenant_id)?
            .into_iter()
            .find(|user| user.role == vmp_core::domain::UserRole::Owner);

        let now = self.clock.now();
        self.store.with_case_lock(case_id, |conn| {
            self.store.update_case_status(conn, case_id, CaseStatus::Resolved, now, Some(now))?;
            self.store.activate_users_for_tenant(conn, &vendor_tenant.tenant_id, now)?;
            let decision = DecisionLogEntry {
                decision_id: new_id("DEC", None),
                case_id: case_id.to_string(),
                decision_type: DecisionType::Approve,
                decided_by: decided_by.to_string(),
                rationale: "onboarding checklist complete".to_string(),
                checklist_step_id: None,
                evidence_id: None,
                created_at: now,
            };
            self.store.insert_decision(conn, &decision)?;
            self.store.append_audit_entry(
                conn,
                case_id,
                decided_by,
                &vmp_core::audit::sha256_hex(case.vendor_id.as_bytes()),
                &serde_json::json!({ "action": "ONBOARDING_APPROVED", "vendorId": case.vendor_id }),
                now,
            )?;
            if let Some(owner) = &owner {
                let notification = vmp_core::domain::Notification {
                    notification_id: new_id("NTF", None),
                    user_id: owner.user_id.clone(),
                    case_id: case_id.to_string(),
                    event_key: "case.onboarding.approved".to_string(),
                    summary: format!("Your onboarding case {case_id} was approved."),
                    priority: vmp_core::domain::Notification::priority_for(case.priority),
                    created_at: now,
                    read_at: None,
                };
                self.store.insert_notification_with(conn, &notification)?;
            }
            Ok(())
        })?;

        Ok(Case {
            status: CaseStatus::Resolved,
            updated_at: now,
            resolved_at: Some(now),
            ..case
        })
    }

    /// Reassigns a case to a different internal owning team.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NotFound`] if `case_id` is not visible under
    /// `filters`.
    pub fn reassign(&self, case_id: &str, filters: &AuthorizationFilters, owner_team: OwnerTeam, decided_by: &str) -> Result<Case, DomainError> {
        let case = self
            .store
            .find_case(case_id, filters)?
            .ok_or_else(|| DomainError::not_found(format!("case {case_id}")))?;
        let now = self.clock.now();

        self.store.with_case_lock(case_id, |conn| {
            self.store.reassign_case(conn, case_id, owner_team, now)?;
            self.store.append_audit_entry(
                conn,
                case_id,
                decided_by,
                &vmp_core::audit::sha256_hex(format!("{owner_team:?}").as_bytes()),
                &serde_json::json!({ "action": "CASE_REASSIGNED", "ownerTeam": format!("{owner_team:?}") }),
                now,
            )?;
            Ok(())
        })?;

        Ok(Case { owner_team, updated_at: now, ..case })
    }

    /// Manually closes a case as resolved, outside the checklist-driven
    /// status derivation -- for cases a human decides are done even though
    /// `derive_status` would not resolve them on its own (general/contract/
    /// compliance cases with no checklist to complete).
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NotFound`] if `case_id` is not visible under
    /// `filters`.
    pub fn close(&self, case_id: &str, filters: &AuthorizationFilters, decided_by: &str, rationale: &str) -> Result<Case, DomainError> {
        let case = self
            .store
            .find_case(case_id, filters)?
            .ok_or_else(|| DomainError::not_found(format!("case {case_id}")))?;
        let now = self.clock.now();

        self.store.with_case_lock(case_id, |conn| {
            self.store.update_case_status(conn, case_id, CaseStatus::Resolved, now, Some(now))?;
            let decision = DecisionLogEntry {
                decision_id: new_id("DEC", None),
                case_id: case_id.to_string(),
                decision_type: DecisionType::Approve,
                decided_by: decided_by.to_string(),
                rationale: rationale.to_string(),
                checklist_step_id: None,
                evidence_id: None,
                created_at: now,
            };
            self.store.insert_decision(conn, &decision)?;
            self.store.append_audit_entry(
                conn,
                case_id,
                decided_by,
                &vmp_core::audit::sha256_hex(rationale.as_bytes()),
                &serde_json::json!({ "action": "CASE_CLOSED" }),
                now,
            )?;
            Ok(())
        })?;

        Ok(Case { status: CaseStatus::Resolved, updated_at: now, resolved_at: Some(now), ..case })
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
    use vmp_core::clock::FixedClock;
    use vmp_core::domain::ChecklistStep;

    use super::*;

    fn engine() -> CaseEngine {
        let store = Arc::new(Store::open_in_memory().expect("open"));
        let clock = Arc::new(FixedClock::new(chrono::Utc::now()));
        CaseEngine::new(store, clock)
    }

    fn step(status: ChecklistStepStatus) -> ChecklistStep {
        ChecklistStep {
            checklist_step_id: "CKL-1".to_string(),
            case_id: "CASE-1".to_string(),
            step_key: "k".to_string(),
            sequence: 0,
            label: "l".to_string(),
            status,
            requires_evidence: false,
            completed_at: None,
            completed_by: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn empty_checklist_leaves_status_untouched() {
        assert_eq!(derive_status(CaseStatus::Open, &[]), CaseStatus::Open);
    }

    #[test]
    fn all_satisfied_resolves() {
        let steps = vec![step(ChecklistStepStatus::Complete), step(ChecklistStepStatus::Skipped)];
        assert_eq!(derive_status(CaseStatus::Open, &steps), CaseStatus::Resolved);
    }

    #[test]
    fn any_rejected_waits_on_supplier_even_with_other_steps_in_progress() {
        let steps = vec![step(ChecklistStepStatus::Rejected), step(ChecklistStepStatus::InProgress)];
        assert_eq!(derive_status(CaseStatus::Open, &steps), CaseStatus::WaitingSupplier);
    }

    #[test]
    fn in_progress_without_rejection_waits_on_internal() {
        let steps = vec![step(ChecklistStepStatus::Pending), step(ChecklistStepStatus::InProgress)];
        assert_eq!(derive_status(CaseStatus::Open, &steps), CaseStatus::WaitingInternal);
    }

    #[test]
    fn all_pending_leaves_status_untouched() {
        let steps = vec![step(ChecklistStepStatus::Pending)];
        assert_eq!(derive_status(CaseStatus::Open, &steps), CaseStatus::Open);
    }

    #[test]
    fn create_case_seeds_checklist_and_opens() {
        let engine = engine();
        let case = engine
            .create_case(
                "TC-AAAA1111",
                "TV-BBBB2222",
                CaseType::Invoice,
                CasePriority::Normal,
                OwnerTeam::Ap,
                "Missing invoice",
                "Vendor has not submitted an invoice PDF.",
                "USR-1",
            )
            .expect("create");
        assert_eq!(case.status, CaseStatus::Open);

        let filters = AuthorizationFilters::internal_super("TNT-OPS");
        let fetched = engine.get_case(&case.case_id, &filters).expect("get").expect("present");
        assert_eq!(fetched.case_id, case.case_id);
    }

    #[test]
    fn verifying_every_step_resolves_the_case() {
        let engine = engine();
        let case = engine
            .create_case(
                "TC-AAAA1111",
                "TV-BBBB2222",
                CaseType::Payment,
                CasePriority::Normal,
                OwnerTeam::Ap,
                "Payment due",
                "Quarterly payment",
                "USR-1",
            )
            .expect("create");
        let filters = AuthorizationFilters::internal_super("TNT-OPS");
        let steps = engine.store.list_checklist_steps(&case.case_id).expect("list");

        let mut last = case;
        for step in &steps {
            last = engine
                .verify_step(&last.case_id, &step.checklist_step_id, &filters, "USR-2", "verified")
                .expect("verify");
        }
        assert_eq!(last.status, CaseStatus::Resolved);
    }

    #[test]
    fn rejecting_a_step_waits_on_supplier() {
        let engine = engine();
        let case = engine
            .create_case(
                "TC-AAAA1111",
                "TV-BBBB2222",
                CaseType::Payment,
                CasePriority::Normal,
                OwnerTeam::Ap,
                "Payment due",
                "Quarterly payment",
                "USR-1",
            )
            .expect("create");
        let filters = AuthorizationFilters::internal_super("TNT-OPS");
        let steps = engine.store.list_checklist_steps(&case.case_id).expect("list");

        let result = engine
            .reject_step(&case.case_id, &steps[0].checklist_step_id, &filters, "USR-2", "bank details do not match")
            .expect("reject");
        assert_eq!(result.status, CaseStatus::WaitingSupplier);
    }

    fn stuck_case(engine: &CaseEngine) -> Case {
        engine
            .create_case(
                "TC-AAAA1111",
                "TV-BBBB2222",
                CaseType::General,
                CasePriority::Urgent,
                OwnerTeam::Finance,
                "Stuck case",
                "No movement in 5 days",
                "USR-1",
            )
            .expect("create")
    }

    #[test]
    fn escalating_below_level_three_waits_on_internal_and_reassigns_to_ap() {
        let engine = engine();
        let case = stuck_case(&engine);
        let filters = AuthorizationFilters::internal_super("TNT-OPS");

        let escalated = engine.escalate(&case.case_id, &filters, "USR-2", 2, "SLA breach").expect("escalate");
        assert_eq!(escalated.escalation_level.0, 2);
        assert_eq!(escalated.owner_team, OwnerTeam::Ap);
        assert_eq!(escalated.status, CaseStatus::WaitingInternal);

        let decisions = engine.store.list_decisions_for_case(&escalated.case_id).expect("list");
        assert_eq!(decisions.len(), 1);
    }

    #[test]
    fn escalating_to_level_three_blocks_the_case_and_logs_break_glass() {
        let engine = engine();
        let case = stuck_case(&engine);
        let filters = AuthorizationFilters::internal_super("TNT-OPS");

        let escalated = engine.escalate(&case.case_id, &filters, "USR-2", 3, "director must intervene").expect("escalate");
        assert_eq!(escalated.escalation_level, vmp_core::domain::EscalationLevel::MAX);
        assert_eq!(escalated.status, CaseStatus::Blocked);

        let entries = engine.store.list_audit_entries_for_document(&escalated.case_id).expect("list");
        assert!(entries.iter().any(|e| e.metadata.get("action").and_then(|v| v.as_str()) == Some("BREAK_GLASS")));
    }

    #[test]
    fn escalate_appends_an_internal_note() {
        let engine = engine();
        let case = stuck_case(&engine);
        let filters = AuthorizationFilters::internal_super("TNT-OPS");

        engine.escalate(&case.case_id, &filters, "USR-2", 1, "no response from vendor").expect("escalate");

        let thread = engine.store.list_messages_for_case(&case.case_id, &filters).expect("list");
        assert_eq!(thread.len(), 1);
        assert!(thread[0].is_internal_note);
        assert_eq!(thread[0].sender_context, vmp_core::domain::SenderContext::Internal);
    }

    #[test]
    fn escalate_rejects_an_out_of_range_level() {
        let engine = engine();
        let case = stuck_case(&engine);
        let filters = AuthorizationFilters::internal_super("TNT-OPS");

        let err = engine.escalate(&case.case_id, &filters, "USR-2", 0, "bad level").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = engine.escalate(&case.case_id, &filters, "USR-2", 4, "bad level").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn approve_onboarding_requires_complete_checklist() {
        let engine = engine();
        let case = engine
            .create_case(
                "TC-AAAA1111",
                "TV-BBBB2222",
                CaseType::Onboarding,
                CasePriority::Normal,
                OwnerTeam::Procurement,
                "Vendor onboarding",
                "New vendor setup",
                "USR-1",
            )
            .expect("create");
        let filters = AuthorizationFilters::internal_super("TNT-OPS");

        let err = engine.approve_onboarding(&case.case_id, &filters, "USR-2").unwrap_err();
        assert!(matches!(err, DomainError::Precondition(_)));
    }

    #[test]
    fn approve_onboarding_activates_vendor_users_once_complete() {
        let engine = engine();
        engine
            .store
            .insert_tenant(&vmp_core::domain::Tenant {
                tenant_id: "TNT-VENDOR001".to_string(),
                client_id: "TC-UNUSED0000".to_string(),
                vendor_id: "TV-BBBB2222".to_string(),
                name: "New Vendor".to_string(),
                email: "owner@vendor.test".to_string(),
                phone: None,
                address: None,
                settings: serde_json::json!({}),
                status: vmp_core::domain::TenantStatus::Active,
                onboarding_status: "pending".to_string(),
                created_at: chrono::Utc::now(),
                updated_at: chrono::Utc::now(),
                deleted_at: None,
            })
            .expect("insert vendor tenant");
        engine
            .store
            .insert_user(&vmp_core::domain::User {
                user_id: "USR-OWNER0001".to_string(),
                tenant_id: "TNT-VENDOR001".to_string(),
                email: "owner@vendor.test".to_string(),
                password_hash: Some("hash".to_string()),
                external_auth_id: None,
                role: vmp_core::domain::UserRole::Owner,
                scope: None,
                active: false,
                created_at: chrono::Utc::now(),
                updated_at: chrono::Utc::now(),
                deleted_at: None,
            })
            .expect("insert vendor owner");

        let case = engine
            .create_case(
                "TC-AAAA1111",
                "TV-BBBB2222",
                CaseType::Onboarding,
                CasePriority::Normal,
                OwnerTeam::Procurement,
                "Vendor onboarding",
                "New vendor setup",
                "USR-1",
            )
            .expect("create");
        let filters = AuthorizationFilters::internal_super("TNT-OPS");
        let steps = engine.store.list_checklist_steps(&case.case_id).expect("list");
        for step in &steps {
            engine
                .verify_step(&case.case_id, &step.checklist_step_id, &filters, "USR-2", "verified")
                .expect("verify");
        }

        let resolved = engine.approve_onboarding(&case.case_id, &filters, "USR-2").expect("approve");
        assert_eq!(resolved.status, CaseStatus::Resolved);

        let owner = engine.store.find_user_by_id("USR-OWNER0001").expect("find").expect("present");
        assert!(owner.active);
        let notifications = engine.store.list_notifications_for_user("USR-OWNER0001").expect("list");
        assert_eq!(notifications.len(), 1);
    }

    #[test]
    fn request_bank_change_opens_a_finance_owned_case_with_proposed_details() {
        let engine = engine();
        let proposed = serde_json::json!({"accountNumber": "00012345", "sortCode": "12-34-56"});
        let case = engine
            .request_bank_change("TC-AAAA1111", "TV-BBBB2222", proposed.clone(), "USR-1")
            .expect("request");
        assert_eq!(case.case_type, CaseType::BankChange);
        assert_eq!(case.owner_team, OwnerTeam::Finance);
        assert_eq!(case.metadata, proposed);

        let steps = engine.store.list_checklist_steps(&case.case_id).expect("list");
        assert_eq!(steps.len(), 2);
    }

    #[test]
    fn approve_bank_change_requires_complete_checklist() {
        let engine = engine();
        let case = engine
            .request_bank_change("TC-AAAA1111", "TV-BBBB2222", serde_json::json!({}), "USR-1")
            .expect("request");
        let filters = AuthorizationFilters::internal_super("TNT-OPS");

        let err = engine.approve_bank_change(&case.case_id, &filters, "USR-2").unwrap_err();
        assert!(matches!(err, DomainError::Precondition(_)));
    }

    #[test]
    fn approve_bank_change_resolves_once_checklist_is_complete() {
        let engine = engine();
        let case = engine
            .request_bank_change("TC-AAAA1111", "TV-BBBB2222", serde_json::json!({}), "USR-1")
            .expect("request");
        let filters = AuthorizationFilters::internal_super("TNT-OPS");
        let steps = engine.store.list_checklist_steps(&case.case_id).expect("list");
        for step in &steps {
            engine
                .verify_step(&case.case_id, &step.checklist_step_id, &filters, "USR-2", "verified")
                .expect("verify");
        }

        let resolved = engine.approve_bank_change(&case.case_id, &filters, "USR-2").expect("approve");
        assert_eq!(resolved.status, CaseStatus::Resolved);
    }
}
