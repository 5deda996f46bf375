// crates/vmp-storage/src/memory.rs
// ============================================================================
// Module: In-Memory Storage Gateway
// Description: A StorageGateway test double backed by a process-local map.
// Purpose: Let vmp-domain and vmp-server integration tests exercise evidence
//          upload/signed-URL flows without a network dependency.
// Dependencies: (none beyond std)
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::gateway::StorageError;
use crate::gateway::StorageGateway;

struct StoredObject {
    bytes: Vec<u8>,
    content_type: String,
}

/// In-process [`StorageGateway`] for tests. Signed URLs are fabricated as
/// `memory://{key}?ttl={ttl_seconds}` and are never actually enforced or
/// checked for expiry; tests that need to assert TTL behavior should assert
/// against the returned query string instead.
#[derive(Default)]
pub struct InMemoryStorageGateway {
    objects: Mutex<BTreeMap<String, StoredObject>>,
}

impl InMemoryStorageGateway {
    /// Builds an empty gateway.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the bytes stored at `key`, for test assertions.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        locked(&self.objects).get(key).map(|obj| obj.bytes.clone())
    }

    /// Returns the content type stored at `key`, for test assertions.
    #[must_use]
    pub fn content_type(&self, key: &str) -> Option<String> {
        locked(&self.objects).get(key).map(|obj| obj.content_type.clone())
    }
}

/// Locks `mutex`, recovering the inner guard if a prior holder panicked
/// rather than propagating a poison error for an in-memory test double.
fn locked<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[async_trait]
impl StorageGateway for InMemoryStorageGateway {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), StorageError> {
        locked(&self.objects).insert(
            key.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn signed_url(&self, key: &str, ttl_seconds: u64) -> Result<String, StorageError> {
        if !locked(&self.objects).contains_key(key) {
            return Err(StorageError::NotFound(key.to_string()));
        }
        Ok(format!("memory://{key}?ttl={ttl_seconds}"))
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
    use super::*;

    #[tokio::test]
    async fn put_then_signed_url_round_trips() {
        let gateway = InMemoryStorageGateway::new();
        gateway.put("evidence/CASE-1/w9/v1/file.pdf", b"hello".to_vec(), "application/pdf").await.expect("put");
        let url = gateway.signed_url("evidence/CASE-1/w9/v1/file.pdf", 3600).await.expect("signed url");
        assert!(url.starts_with("memory://evidence/CASE-1/w9/v1/file.pdf"));
        assert_eq!(gateway.get("evidence/CASE-1/w9/v1/file.pdf"), Some(b"hello".to_vec()));
    }

    #[tokio::test]
    async fn signed_url_for_missing_key_fails() {
        let gateway = InMemoryStorageGateway::new();
        let err = gateway.signed_url("nope", 60).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }
}
