// crates/vmp-authz/src/lib.rs
// ============================================================================
// Crate: vmp-authz
// Description: Principal resolution and row-visibility authorization rules
//              for the Nexus Vendor Management Platform.
// Purpose: Give every other crate one fail-closed seam between a bearer
//          token and the data a request is allowed to touch.
// Dependencies: vmp-core, async-trait, sha2, hex, chrono, thiserror, tracing
// ============================================================================

//! ## Overview
//! `vmp-authz` answers two questions: *who is this request from*
//! ([`PrincipalResolver`]), and *what may they see* ([`AuthorizationFilters`]).
//! Every domain-layer operation in `vmp-domain` takes an `AuthorizationFilters`
//! by value; there is no code path that reaches storage without one.

pub mod error;
pub mod filters;
pub mod principal;
pub mod resolver;

pub use error::AuthzError;
pub use filters::AuthorizationFilters;
pub use filters::Visibility;
pub use principal::Principal;
pub use resolver::PrincipalResolver;
pub use resolver::SessionPrincipalResolver;
pub use resolver::SessionRecord;
pub use resolver::SessionStore;
pub use resolver::UserStore;
pub use resolver::hash_token;
