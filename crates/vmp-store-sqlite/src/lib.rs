// crates/vmp-store-sqlite/src/lib.rs
// ============================================================================
// Module: vmp-store-sqlite
// Description: SQLite-backed persistence for every VMP entity.
// Purpose: Give `vmp-domain` one dependency-injected store, behind the
//          `vmp_authz::SessionStore`/`UserStore` ports plus plain repository
//          methods for everything else.
// Dependencies: rusqlite, vmp-core, vmp-authz
// ============================================================================

//! ## Overview
//! One [`Store`] wraps one mutex-guarded `rusqlite::Connection`. Repository
//! methods live as `impl Store` blocks split across per-entity modules
//! (`tenants`, `users`, `sessions`, `relationships`, `invites`, `cases`,
//! `checklist`, `evidence`, `messages`, `decision_log`, `notifications`,
//! `audit_chain`, `ingest`) rather than one god-module, mirroring how the teacher
//! splits `SqliteRunStateStore`'s methods by the concern they serve.
//!
//! `Store` also implements [`vmp_authz::SessionStore`] and
//! [`vmp_authz::UserStore`] directly, so `vmp-domain`/`vmp-server` can hand
//! one `Arc<Store>` to both a [`vmp_authz::SessionPrincipalResolver`] and
//! every domain service.

pub mod audit_chain;
pub mod cases;
pub mod checklist;
pub mod decision_log;
pub mod error;
pub mod evidence;
pub mod ingest;
pub mod invites;
pub mod messages;
pub mod notifications;
pub mod relationships;
pub mod schema;
pub mod sessions;
pub mod store;
pub mod tenants;
pub mod users;

pub use error::SqliteStoreError;
pub use schema::SCHEMA_VERSION;
pub use store::Store;
