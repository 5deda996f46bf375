// crates/vmp-storage/src/s3.rs
// ============================================================================
// Module: S3 Storage Gateway
// Description: Production StorageGateway backed by Amazon S3.
// Purpose: Put evidence blobs server-side-encrypted and mint presigned GET URLs.
// Dependencies: aws-sdk-s3, aws-config
// ============================================================================

use std::time::Duration;

use aws_sdk_s3::Client;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ServerSideEncryption;
use tracing::instrument;

use crate::gateway::StorageError;
use crate::gateway::StorageGateway;

/// Amazon S3-backed [`StorageGateway`].
///
/// Every upload is written with `SSE-S3` (AES256) server-side encryption;
/// the gateway does not support unencrypted buckets.
pub struct S3StorageGateway {
    client: Client,
    bucket: String,
}

impl S3StorageGateway {
    /// Builds a gateway from an already-configured S3 client and bucket name.
    #[must_use]
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Loads AWS configuration for `region` and builds a gateway for `bucket`.
    pub async fn from_region(region: impl Into<String>, bucket: impl Into<String>) -> Self {
        let shared_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new(region.into()))
            .load()
            .await;
        Self::new(Client::new(&shared_config), bucket)
    }
}

#[async_trait::async_trait]
impl StorageGateway for S3StorageGateway {
    #[instrument(skip(self, bytes), fields(bucket = %self.bucket, key = %key, bytes = bytes.len()))]
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .server_side_encryption(ServerSideEncryption::Aes256)
            .send()
            .await
            .map_err(|err| StorageError::Backend(err.to_string()))?;
        Ok(())
    }

    #[instrument(skip(self), fields(bucket = %self.bucket, key = %key, ttl_seconds))]
    async fn signed_url(&self, key: &str, ttl_seconds: u64) -> Result<String, StorageError> {
        let presign_config = PresigningConfig::expires_in(Duration::from_secs(ttl_seconds))
            .map_err(|err| StorageError::Backend(err.to_string()))?;
        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presign_config)
            .await
            .map_err(|err| StorageError::Backend(err.to_string()))?;
        Ok(presigned.uri().to_string())
    }
}
