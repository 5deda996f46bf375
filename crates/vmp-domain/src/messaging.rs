// crates/vmp-domain/src/messaging.rs
// ============================================================================
// Module: Messaging
// Description: Case-thread messages, internal-note enforcement, and the
//              best-effort classifier hint attached to a posted message.
// Purpose: Keep internal notes inaccessible to external principals at the
//          write path, not just at read time.
// Dependencies: vmp-core, vmp-authz, vmp-store-sqlite
// ============================================================================

use std::sync::Arc;

use vmp_authz::AuthorizationFilters;
use vmp_core::Clock;
use vmp_core::domain::Case;
use vmp_core::domain::CaseType;
use vmp_core::domain::Channel;
use vmp_core::domain::Message;
use vmp_core::domain::SenderContext;
use vmp_core::new_id;
use vmp_store_sqlite::Store;

use crate::error::DomainError;

/// The hint a classifier attaches when an invoice-type case's message does
/// not carry an invoice-number-shaped token.
pub const MISSING_INVOICE_REFERENCE_HINT: &str = "missing_invoice_reference";

/// User ID attributed to classifier-triggered follow-up messages.
pub const AI_CLASSIFIER_USER_ID: &str = "SYS-AI-CLASSIFIER";

/// Produces an advisory classification hint from a message body.
///
/// A classifier never blocks or alters message delivery; its output is
/// stored alongside the message for internal staff to triage by, and a
/// failure to classify is silently swallowed.
pub trait MessageClassifier: Send + Sync {
    /// Returns a short hint describing the message, or `None` if nothing
    /// recognizable was found. `case_type` lets a classifier tailor its
    /// rule to the kind of case the message was posted against.
    fn classify(&self, case_type: CaseType, body: &str) -> Option<String>;
}

/// Flags an invoice-type case's message when its body lacks a token shaped
/// like an invoice number (`INV` or `INV-`, followed by 3+ digits).
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicInvoiceNumberClassifier;

impl HeuristicInvoiceNumberClassifier {
    /// Scans `body` for a case-insensitive `inv` immediately followed by an
    /// optional `-` and at least three digits.
    fn has_invoice_reference(body: &str) -> bool {
        let lowered = body.to_lowercase();
        let bytes = lowered.as_bytes();
        let mut search_from = 0usize;
        while let Some(offset) = lowered[search_from..].find("inv") {
            let match_start = search_from + offset;
            let mut rest = &bytes[match_start + 3..];
            if rest.first() == Some(&b'-') {
                rest = &rest[1..];
            }
            let digit_count = rest.iter().take_while(|byte| byte.is_ascii_digit()).count();
            if digit_count >= 3 {
                return true;
            }
            search_from = match_start + 3;
            if search_from >= lowered.len() {
                break;
            }
        }
        false
    }
}

impl MessageClassifier for HeuristicInvoiceNumberClassifier {
    fn classify(&self, case_type: CaseType, body: &str) -> Option<String> {
        if case_type == CaseType::Invoice && !Self::has_invoice_reference(body) {
            Some(MISSING_INVOICE_REFERENCE_HINT.to_string())
        } else {
            None
        }
    }
}

/// Case-thread messaging, backed by one [`Store`], a [`Clock`], and a
/// swappable [`MessageClassifier`].
pub struct MessagingService {
    store: Arc<Store>,
    clock: Arc<dyn Clock>,
    classifier: Arc<dyn MessageClassifier>,
}

impl MessagingService {
    #[must_use]
    pub fn new(store: Arc<Store>, clock: Arc<dyn Clock>, classifier: Arc<dyn MessageClassifier>) -> Self {
        Self { store, clock, classifier }
    }

    /// Posts a message to a case.
    ///
    /// A client or vendor principal may only post a non-internal-note
    /// message; attempting `is_internal_note` from a non-internal
    /// `sender_context` is rejected rather than silently downgraded, so a
    /// caller bug surfaces immediately instead of leaking a note the author
    /// believed was private. When the classifier flags a missing invoice
    /// reference, a follow-up message is enqueued asking for it.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NotFound`] if `case_id` is not visible under
    /// `filters`, [`DomainError::Forbidden`] if a non-internal sender
    /// attempts to post an internal note, [`DomainError::Validation`] if
    /// `body` is empty.
    #[allow(clippy::too_many_arguments, reason = "Mirrors the wire request shape one-for-one.")]
    pub fn create_message(
        &self,
        case_id: &str,
        filters: &AuthorizationFilters,
        sender_user_id: &str,
        sender_context: SenderContext,
        channel: Channel,
        is_internal_note: bool,
        body: &str,
    ) -> Result<Message, DomainError> {
        if body.trim().is_empty() {
            return Err(DomainError::validation("message body must not be empty"));
        }
        if is_internal_note && sender_context != SenderContext::Internal {
            return Err(DomainError::forbidden("only internal staff may post an internal note"));
        }
        let case = self
            .store
            .find_case(case_id, filters)?
            .ok_or_else(|| DomainError::not_found(format!("case {case_id}")))?;

        let hint = self.classifier.classify(case.case_type, body);
        let message = Message {
            message_id: new_id("MSG", None),
            case_id: case_id.to_string(),
            sender_user_id: sender_user_id.to_string(),
            sender_context,
            channel,
            is_internal_note,
            body: body.to_string(),
            classifier_hint: hint.clone(),
            created_at: self.clock.now(),
            edited_at: None,
        };
        self.store.insert_message(&message)?;

        if hint.as_deref() == Some(MISSING_INVOICE_REFERENCE_HINT) {
            self.enqueue_missing_reference_follow_up(&case)?;
        }
        Ok(message)
    }

    fn enqueue_missing_reference_follow_up(&self, case: &Case) -> Result<(), DomainError> {
        let follow_up = Message {
            message_id: new_id("MSG", None),
            case_id: case.case_id.clone(),
            sender_user_id: AI_CLASSIFIER_USER_ID.to_string(),
            sender_context: SenderContext::Ai,
            channel: Channel::Portal,
            is_internal_note: false,
            body: "Could you share the invoice reference number for this case (format INV-123 or longer)?".to_string(),
            classifier_hint: None,
            created_at: self.clock.now(),
            edited_at: None,
        };
        self.store.insert_message(&follow_up)?;
        Ok(())
    }

    /// Lists a case's messages visible under `filters`, oldest first.
    /// Internal notes are dropped for callers whose filters do not grant
    /// `can_see_internal_channel`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NotFound`] if `case_id` is not visible under
    /// `filters`.
    pub fn list_messages(&self, case_id: &str, filters: &AuthorizationFilters) -> Result<Vec<Message>, DomainError> {
        self.store
            .find_case(case_id, filters)?
            .ok_or_else(|| DomainError::not_found(format!("case {case_id}")))?;
        Ok(self.store.list_messages_for_case(case_id, filters)?)
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
    use vmp_core::domain::CasePriority;
    use vmp_core::domain::CaseStatus;
    use vmp_core::domain::EscalationLevel;
    use vmp_core::domain::OwnerTeam;

    use super::*;

    fn seeded_service_with_type(case_type: CaseType) -> (MessagingService, String) {
        let store = Arc::new(Store::open_in_memory().expect("open"));
        let case = Case {
            case_id: "CASE-1".to_string(),
            client_id: "TC-AAAA1111".to_string(),
            vendor_id: "TV-BBBB2222".to_string(),
            case_type,
            status: CaseStatus::Open,
            priority: CasePriority::Normal,
            owner_team: OwnerTeam::Ap,
            escalation_level: EscalationLevel::NONE,
            title: "General question".to_string(),
            description: "d".to_string(),
            opened_by: "USR-1".to_string(),
            metadata: serde_json::json!({}),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
            resolved_at: None,
        };
        store.insert_case(&case).expect("insert case");
        let clock = Arc::new(FixedClock::new(chrono::Utc::now()));
        let service = MessagingService::new(store, clock, Arc::new(HeuristicInvoiceNumberClassifier));
        (service, case.case_id)
    }

    fn seeded_service() -> (MessagingService, String) {
        seeded_service_with_type(CaseType::General)
    }

    #[test]
    fn vendor_cannot_post_an_internal_note() {
        let (service, case_id) = seeded_service();
        let filters = AuthorizationFilters::internal_super("TNT-OPS");
        let err = service
            .create_message(&case_id, &filters, "USR-2", SenderContext::Vendor, Channel::Portal, true, "hello")
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[test]
    fn internal_staff_may_post_an_internal_note() {
        let (service, case_id) = seeded_service();
        let filters = AuthorizationFilters::internal_super("TNT-OPS");
        let message = service
            .create_message(&case_id, &filters, "USR-2", SenderContext::Internal, Channel::Portal, true, "reviewing now")
            .expect("create");
        assert!(message.is_internal_note);
    }

    #[test]
    fn invoice_case_without_reference_gets_hint_and_follow_up() {
        let (service, case_id) = seeded_service_with_type(CaseType::Invoice);
        let filters = AuthorizationFilters::internal_super("TNT-OPS");
        let message = service
            .create_message(&case_id, &filters, "USR-2", SenderContext::Vendor, Channel::Portal, false, "Any update on this?")
            .expect("create");
        assert_eq!(message.classifier_hint.as_deref(), Some(MISSING_INVOICE_REFERENCE_HINT));

        let thread = service.list_messages(&case_id, &filters).expect("list");
        assert_eq!(thread.len(), 2);
        assert_eq!(thread[1].sender_context, SenderContext::Ai);
        assert_eq!(thread[1].sender_user_id, AI_CLASSIFIER_USER_ID);
    }

    #[test]
    fn invoice_case_with_reference_gets_no_hint() {
        let (service, case_id) = seeded_service_with_type(CaseType::Invoice);
        let filters = AuthorizationFilters::internal_super("TNT-OPS");
        let message = service
            .create_message(&case_id, &filters, "USR-2", SenderContext::Vendor, Channel::Portal, false, "See INV-48291 attached.")
            .expect("create");
        assert_eq!(message.classifier_hint, None);

        let thread = service.list_messages(&case_id, &filters).expect("list");
        assert_eq!(thread.len(), 1);
    }

    #[test]
    fn non_invoice_case_is_never_classified() {
        let (service, case_id) = seeded_service();
        let filters = AuthorizationFilters::internal_super("TNT-OPS");
        let message = service
            .create_message(&case_id, &filters, "USR-2", SenderContext::Vendor, Channel::Portal, false, "No reference here.")
            .expect("create");
        assert_eq!(message.classifier_hint, None);
    }

    #[test]
    fn empty_body_is_rejected() {
        let (service, case_id) = seeded_service();
        let filters = AuthorizationFilters::internal_super("TNT-OPS");
        let err = service
            .create_message(&case_id, &filters, "USR-2", SenderContext::Vendor, Channel::Portal, false, "   ")
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn list_respects_internal_note_visibility() {
        let (service, case_id) = seeded_service();
        let internal = AuthorizationFilters::internal_super("TNT-OPS");
        service
            .create_message(&case_id, &internal, "USR-1", SenderContext::Internal, Channel::Portal, true, "internal note")
            .expect("create");
        service
            .create_message(&case_id, &internal, "USR-2", SenderContext::Vendor, Channel::Portal, false, "vendor reply")
            .expect("create");

        let tenant = vmp_core::domain::Tenant {
            tenant_id: "TNT-C1".to_string(),
            client_id: "TC-AAAA1111".to_string(),
            vendor_id: "TV-UNUSED000".to_string(),
            name: "Client".to_string(),
            email: "c@example.test".to_string(),
            phone: None,
            address: None,
            settings: serde_json::json!({}),
            status: vmp_core::domain::TenantStatus::Active,
            onboarding_status: "complete".to_string(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
            deleted_at: None,
        };
        let client_filters = AuthorizationFilters::for_client_tenant(&tenant);
        let visible = service.list_messages(&case_id, &client_filters).expect("list");
        assert_eq!(visible.len(), 1);
        assert!(!visible[0].is_internal_note);
    }
}
