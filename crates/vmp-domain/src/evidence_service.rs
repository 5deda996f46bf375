// crates/vmp-domain/src/evidence_service.rs
// ============================================================================
// Module: Evidence Service
// Description: Upload, review, and signed-URL retrieval for case evidence.
// Purpose: Wire the storage gateway, evidence lineage, checklist steps, and
//          audit chain together as one atomic operation per upload/review.
// Dependencies: vmp-core, vmp-authz, vmp-storage, vmp-store-sqlite
// ============================================================================

use std::sync::Arc;

use vmp_authz::AuthorizationFilters;
use vmp_core::Clock;
use vmp_core::domain::ChecklistStepStatus;
use vmp_core::domain::Evidence;
use vmp_core::domain::EvidenceStatus;
use vmp_core::domain::evidence::build_storage_key;
use vmp_core::new_id;
use vmp_storage::StorageGateway;
use vmp_storage::clamp_ttl_seconds;
use vmp_store_sqlite::Store;

use crate::case_engine::CaseEngine;
use crate::error::DomainError;

/// Evidence upload, review, and download, backed by one [`Store`], a
/// [`Clock`], a [`StorageGateway`], and the [`CaseEngine`] it reports
/// checklist progress back through.
pub struct EvidenceService {
    store: Arc<Store>,
    clock: Arc<dyn Clock>,
    storage: Arc<dyn StorageGateway>,
    case_engine: Arc<CaseEngine>,
}

impl EvidenceService {
    #[must_use]
    pub fn new(store: Arc<Store>, clock: Arc<dyn Clock>, storage: Arc<dyn StorageGateway>, case_engine: Arc<CaseEngine>) -> Self {
        Self { store, clock, storage, case_engine }
    }

    /// Uploads a new evidence version for a case, advances the matching
    /// checklist step (if any) to `InProgress` pending review, appends an
    /// audit entry, and recomputes case status — all as one logical unit of
    /// work, though the storage `put` itself happens outside the database
    /// transaction since it talks to an external backend.
    ///
    /// When `checklist_step_id` is given, the step is moved to
    /// [`ChecklistStepStatus::InProgress`]; when `None`, evidence lands on
    /// the case with no step association.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NotFound`] if `case_id` is not visible under
    /// `filters`, [`DomainError::Validation`] if `bytes` is empty,
    /// [`DomainError::Storage`] if the upload fails.
    #[allow(clippy::too_many_arguments)]
    pub async fn upload_evidence(
        &self,
        case_id: &str,
        filters: &AuthorizationFilters,
        evidence_type: &str,
        original_filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
        uploaded_by: &str,
        checklist_step_id: Option<&str>,
    ) -> Result<Evidence, DomainError> {
        if bytes.is_empty() {
            return Err(DomainError::validation("uploaded evidence must not be empty"));
        }
        let case = self
            .store
            .find_case(case_id, filters)?
            .ok_or_else(|| DomainError::not_found(format!("case {case_id}")))?;

        let content_hash = vmp_core::audit::sha256_hex(&bytes);
        let size_bytes = bytes.len() as u64;
        let now = self.clock.now();

        let version = self
            .store
            .with_connection(|conn| self.store.next_evidence_version(conn, case_id, evidence_type))?;
        let storage_key = build_storage_key(case_id, evidence_type, version, original_filename);

        self.storage.put(&storage_key, bytes, content_type).await?;

        let evidence = Evidence {
            evidence_id: new_id("EVD", None),
            case_id: case_id.to_string(),
            evidence_type: evidence_type.to_string(),
            version,
            original_filename: original_filename.to_string(),
            storage_key: storage_key.clone(),
            content_hash,
            size_bytes,
            content_type: content_type.to_string(),
            status: EvidenceStatus::Pending,
            uploaded_by: uploaded_by.to_string(),
            uploaded_at: now,
            reviewed_by: None,
            reviewed_at: None,
            review_note: None,
        };

        self.store.with_case_lock(case_id, |conn| {
            self.store.insert_evidence(conn, &evidence)?;
            if let Some(step_id) = checklist_step_id {
                self.store
                    .update_checklist_step_status(conn, step_id, ChecklistStepStatus::InProgress, None, now)?;
            }
            self.store.append_audit_entry(
                conn,
                case_id,
                uploaded_by,
                &evidence.content_hash,
                &serde_json::json!({
                    "action": "EVIDENCE_UPLOADED",
                    "evidenceId": evidence.evidence_id,
                    "evidenceType": evidence_type,
                    "version": version,
                }),
                now,
            )?;
            Ok(())
        })?;

        self.case_engine.recompute_status(&case)?;
        Ok(evidence)
    }

    /// Mints a time-bounded signed URL for one evidence row and logs the
    /// download as an audit entry.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NotFound`] if `evidence_id` does not exist or
    /// its case is not visible under `filters`, [`DomainError::Storage`] if
    /// the gateway fails to mint a URL.
    pub async fn get_evidence_url(
        &self,
        evidence_id: &str,
        filters: &AuthorizationFilters,
        requested_by: &str,
        ttl_seconds: Option<u64>,
    ) -> Result<String, DomainError> {
        let evidence = self
            .store
            .find_evidence(evidence_id)?
            .ok_or_else(|| DomainError::not_found(format!("evidence {evidence_id}")))?;
        self.store
            .find_case(&evidence.case_id, filters)?
            .ok_or_else(|| DomainError::not_found(format!("evidence {evidence_id}")))?;

        let ttl = clamp_ttl_seconds(ttl_seconds);
        let url = self.storage.signed_url(&evidence.storage_key, ttl).await?;

        let now = self.clock.now();
        self.store.with_case_lock(&evidence.case_id, |conn| {
            self.store.append_audit_entry(
                conn,
                &evidence.case_id,
                requested_by,
                &evidence.content_hash,
                &serde_json::json!({ "action": "EVIDENCE_DOWNLOADED", "evidenceId": evidence_id }),
                now,
            )
        })?;

        Ok(url)
    }

    /// Accepts an evidence row, completing its matching checklist step.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NotFound`] if `evidence_id` or `case_id` is not
    /// visible under `filters`.
    pub fn accept_evidence(
        &self,
        case_id: &str,
        evidence_id: &str,
        checklist_step_id: &str,
        filters: &AuthorizationFilters,
        reviewed_by: &str,
    ) -> Result<(), DomainError> {
        self.review_evidence(case_id, evidence_id, Some(checklist_step_id), filters, reviewed_by, EvidenceStatus::Accepted, None)
    }

    /// Rejects an evidence row, requiring a note, and moves its matching
    /// checklist step to [`ChecklistStepStatus::Rejected`].
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] if `review_note` is empty,
    /// [`DomainError::NotFound`] if `evidence_id` or `case_id` is not visible
    /// under `filters`.
    pub fn reject_evidence(
        &self,
        case_id: &str,
        evidence_id: &str,
        checklist_step_id: &str,
        filters: &AuthorizationFilters,
        reviewed_by: &str,
        review_note: &str,
    ) -> Result<(), DomainError> {
        if review_note.trim().is_empty() {
            return Err(DomainError::validation("a rejection requires a review note"));
        }
        self.review_evidence(
            case_id,
            evidence_id,
            Some(checklist_step_id),
            filters,
            reviewed_by,
            EvidenceStatus::Rejected,
            Some(review_note),
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn review_evidence(
        &self,
        case_id: &str,
        evidence_id: &str,
        checklist_step_id: Option<&str>,
        filters: &AuthorizationFilters,
        reviewed_by: &str,
        status: EvidenceStatus,
        review_note: Option<&str>,
    ) -> Result<(), DomainError> {
        let case = self
            .store
            .find_case(case_id, filters)?
            .ok_or_else(|| DomainError::not_found(format!("case {case_id}")))?;
        let now = self.clock.now();
        let step_status = match status {
            EvidenceStatus::Accepted => Some(ChecklistStepStatus::Complete),
            EvidenceStatus::Rejected => Some(ChecklistStepStatus::Rejected),
            EvidenceStatus::Pending => None,
        };

        self.store.with_case_lock(case_id, |conn| {
            self.store.review_evidence(conn, evidence_id, status, reviewed_by, now, review_note)?;
            if let (Some(step_id), Some(step_status)) = (checklist_step_id, step_status) {
                self.store
                    .update_checklist_step_status(conn, step_id, step_status, Some(reviewed_by), now)?;
            }
            self.store.append_audit_entry(
                conn,
                case_id,
                reviewed_by,
                evidence_id,
                &serde_json::json!({ "action": "EVIDENCE_REVIEWED", "evidenceId": evidence_id, "status": status }),
                now,
            )?;
            Ok(())
        })?;

        self.case_engine.recompute_status(&case)?;
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
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use vmp_core::clock::FixedClock;
    use vmp_core::domain::CasePriority;
    use vmp_core::domain::CaseStatus;
    use vmp_core::domain::CaseType;
    use vmp_core::domain::OwnerTeam;
    use vmp_storage::StorageError;

    use super::*;

    #[derive(Default)]
    struct InMemoryStorage {
        objects: Mutex<HashMap<String, Vec<u8>>>,
    }

    #[async_trait]
    impl StorageGateway for InMemoryStorage {
        async fn put(&self, key: &str, bytes: Vec<u8>, _content_type: &str) -> Result<(), StorageError> {
            self.objects.lock().unwrap_or_else(std::sync::PoisonError::into_inner).insert(key.to_string(), bytes);
            Ok(())
        }

        async fn signed_url(&self, key: &str, ttl_seconds: u64) -> Result<String, StorageError> {
            let objects = self.objects.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            if objects.contains_key(key) {
                Ok(format!("https://storage.example.test/{key}?ttl={ttl_seconds}"))
            } else {
                Err(StorageError::NotFound(key.to_string()))
            }
        }
    }

    fn harness() -> (EvidenceService, String, AuthorizationFilters) {
        let store = Arc::new(Store::open_in_memory().expect("open"));
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(chrono::Utc::now()));
        let case_engine = Arc::new(CaseEngine::new(store.clone(), clock.clone()));
        let case = case_engine
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
            .expect("create case");
        let service = EvidenceService::new(store, clock, Arc::new(InMemoryStorage::default()), case_engine);
        (service, case.case_id, AuthorizationFilters::internal_super("TNT-OPS"))
    }

    #[tokio::test]
    async fn uploading_empty_bytes_is_rejected() {
        let (service, case_id, filters) = harness();
        let err = service
            .upload_evidence(&case_id, &filters, "w9", "w9.pdf", "application/pdf", vec![], "USR-2", None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn upload_advances_matching_step_and_accept_resolves_case() {
        let (service, case_id, filters) = harness();
        let steps = service.store.list_checklist_steps(&case_id).expect("list");
        let step_id = steps[0].checklist_step_id.clone();

        let evidence = service
            .upload_evidence(
                &case_id,
                &filters,
                &steps[0].step_key,
                "w9.pdf",
                "application/pdf",
                b"pdf-bytes".to_vec(),
                "USR-2",
                Some(&step_id),
            )
            .await
            .expect("upload");
        assert_eq!(evidence.version, 1);

        let url = service
            .get_evidence_url(&evidence.evidence_id, &filters, "USR-3", None)
            .await
            .expect("signed url");
        assert!(url.contains(&evidence.storage_key));

        for step in &steps[1..] {
            service
                .case_engine
                .verify_step(&case_id, &step.checklist_step_id, &filters, "USR-3", "satisfied by other means")
                .expect("verify");
        }
        service
            .accept_evidence(&case_id, &evidence.evidence_id, &step_id, &filters, "USR-3")
            .expect("accept");

        let case = service.case_engine.get_case(&case_id, &filters).expect("get").expect("present");
        assert_eq!(case.status, CaseStatus::Resolved);
    }

    #[tokio::test]
    async fn rejecting_evidence_requires_a_note() {
        let (service, case_id, filters) = harness();
        let steps = service.store.list_checklist_steps(&case_id).expect("list");
        let step_id = steps[0].checklist_step_id.clone();
        let evidence = service
            .upload_evidence(
                &case_id,
                &filters,
                &steps[0].step_key,
                "w9.pdf",
                "application/pdf",
                b"pdf-bytes".to_vec(),
                "USR-2",
                Some(&step_id),
            )
            .await
            .expect("upload");

        let err = service
            .reject_evidence(&case_id, &evidence.evidence_id, &step_id, &filters, "USR-3", "")
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        service
            .reject_evidence(&case_id, &evidence.evidence_id, &step_id, &filters, "USR-3", "scan is illegible")
            .expect("reject");
        let case = service.case_engine.get_case(&case_id, &filters).expect("get").expect("present");
        assert_eq!(case.status, CaseStatus::WaitingSupplier);
    }
}
