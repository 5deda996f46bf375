// crates/vmp-core/src/domain/mod.rs
// ============================================================================
// Module: Domain Model
// Description: Entity types shared by every Nexus VMP service.
// Purpose: One canonical shape per entity, independent of any persistence
//          or transport representation.
// Dependencies: serde, chrono
// ============================================================================

//! ## Overview
//! These types describe *what* a tenant, case, or evidence row is. They
//! carry no behavior beyond small derivations (e.g. [`Notification::priority_for`])
//! and are shared, unmodified, by `vmp-store-sqlite` (persistence),
//! `vmp-domain` (services), and `vmp-contract` (wire DTOs derive from these).

pub mod case;
pub mod checklist;
pub mod decision_log;
pub mod evidence;
pub mod ingest;
pub mod invite;
pub mod message;
pub mod notification;
pub mod relationship;
pub mod tenant;

pub use case::Case;
pub use case::CasePriority;
pub use case::CaseStatus;
pub use case::CaseType;
pub use case::EscalationLevel;
pub use case::OwnerTeam;
pub use checklist::ChecklistStep;
pub use checklist::ChecklistStepStatus;
pub use decision_log::DecisionLogEntry;
pub use decision_log::DecisionType;
pub use evidence::Evidence;
pub use evidence::EvidenceStatus;
pub use ingest::IngestInvoiceRow;
pub use ingest::IngestPaymentRow;
pub use invite::Invite;
pub use invite::InviteStatus;
pub use message::Channel;
pub use message::Message;
pub use message::SenderContext;
pub use notification::Notification;
pub use notification::NotificationPriority;
pub use relationship::Relationship;
pub use relationship::RelationshipStatus;
pub use tenant::Company;
pub use tenant::Scope;
pub use tenant::Tenant;
pub use tenant::TenantStatus;
pub use tenant::User;
pub use tenant::UserRole;
