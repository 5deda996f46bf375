// crates/vmp-contract/src/lib.rs
// ============================================================================
// Module: vmp-contract
// Description: Wire shapes for the Nexus VMP public API.
// Purpose: Give vmp-server one place to convert domain types to and from the
//          camelCase JSON a transport actually sends, so no axum handler
//          serializes a vmp-core struct directly.
// Dependencies: vmp-core, serde, serde_json, chrono
// ============================================================================

//! ## Overview
//! Every type here is a plain data-transfer shape: `#[serde(rename_all =
//! "camelCase")]`, `From<&vmp_core::domain::X>` for the read side, and a
//! small number of hand-written request bodies for the write side. None of
//! these types carry behavior -- that stays in `vmp-domain`.

pub mod envelope;
pub mod requests;
pub mod responses;

pub use envelope::ApiError;
pub use envelope::ErrorBody;
pub use envelope::Page;
