// crates/vmp-core/src/lib.rs
// ============================================================================
// Crate: vmp-core
// Description: Pure domain types, identifiers, time, and audit-chain math
//              for the Nexus Vendor Management Platform.
// Purpose: Provide the shared, I/O-free vocabulary every other crate builds on.
// Dependencies: serde, serde_json, serde_jcs, sha2, rand, hex, chrono, thiserror
// ============================================================================

//! ## Overview
//! `vmp-core` defines the case-driven collaboration data model shared by the
//! authorization layer, storage backends, domain services, and the HTTP API.
//! Nothing in this crate performs I/O; every type here is plain data plus
//! deterministic, pure functions (ID minting, checklist rule lookup, audit
//! chain hashing). Security posture: values received from callers are
//! untrusted and are validated at the boundary that accepts them, not here.

pub mod audit;
pub mod checklist_rules;
pub mod clock;
pub mod domain;
pub mod error;
pub mod ids;

pub use audit::AuditChainEntry;
pub use audit::GENESIS_HASH;
pub use clock::Clock;
pub use clock::FixedClock;
pub use clock::SystemClock;
pub use error::ErrorKind;
pub use error::VmpError;
pub use ids::NewTenantIds;
pub use ids::new_id;
pub use ids::new_tenant_ids;
