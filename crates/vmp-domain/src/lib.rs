// crates/vmp-domain/src/lib.rs
// ============================================================================
// Module: vmp-domain
// Description: Every case/tenant/messaging/evidence/notification/ingest
//              service that sits between vmp-server's handlers and
//              vmp-store-sqlite's repositories.
// Purpose: Own the business rules -- status derivation, authorization
//          checks, audit entries, password/token handling -- so that
//          vmp-server stays a thin transport layer.
// Dependencies: vmp-core, vmp-authz, vmp-storage, vmp-store-sqlite
// ============================================================================

//! ## Overview
//! Each service wraps an `Arc<vmp_store_sqlite::Store>` and an
//! `Arc<dyn vmp_core::Clock>`, and nothing else reaches into the store
//! directly except these services. [`case_engine::CaseEngine`] owns the
//! status-derivation rule; [`evidence_service::EvidenceService`] and
//! [`messaging::MessagingService`] call back into it rather than
//! duplicating that rule.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod case_engine;
pub mod error;
pub mod evidence_service;
pub mod ingest;
pub mod messaging;
pub mod notifications;
pub mod password;
pub mod security;
pub mod session_service;
pub mod tenant_service;
pub mod tokens;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use case_engine::CaseEngine;
pub use error::DomainError;
pub use evidence_service::EvidenceService;
pub use ingest::IngestService;
pub use messaging::HeuristicInvoiceNumberClassifier;
pub use messaging::MessageClassifier;
pub use messaging::MessagingService;
pub use notifications::NotificationService;
pub use notifications::UnreadCounts;
pub use session_service::IssuedSession;
pub use session_service::SessionService;
pub use tenant_service::IssuedInvite;
pub use tenant_service::OnboardedVendor;
pub use tenant_service::TenantService;
