// crates/vmp-storage/src/lib.rs
// ============================================================================
// Crate: vmp-storage
// Description: The evidence blob storage gateway contract and its backends.
// Purpose: Decouple evidence upload/retrieval from any one object-store
//          vendor, so domain code depends only on a trait.
// Dependencies: aws-sdk-s3, aws-config, async-trait, thiserror, tracing
// ============================================================================

//! ## Overview
//! Two implementations ship here: [`S3StorageGateway`] for production and
//! [`InMemoryStorageGateway`] for tests. Both satisfy [`StorageGateway`];
//! `vmp-domain` never knows which one it is holding.

pub mod gateway;
pub mod memory;
pub mod s3;

pub use gateway::DEFAULT_SIGNED_URL_TTL_SECONDS;
pub use gateway::MAX_SIGNED_URL_TTL_SECONDS;
pub use gateway::StorageError;
pub use gateway::StorageGateway;
pub use gateway::clamp_ttl_seconds;
pub use memory::InMemoryStorageGateway;
pub use s3::S3StorageGateway;
