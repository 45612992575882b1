//! src/services/storage_service.rs
//!
//! Object storage seam. The upload pipeline only ever *creates* objects, so
//! the seam is a single `put_object` call; `S3ObjectStore` is the production
//! implementation and tests substitute their own.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::{
    Client,
    error::{DisplayErrorContext, SdkError},
    operation::put_object::PutObjectError,
    primitives::ByteStream,
    types::ServerSideEncryption,
};
use base64::{Engine as _, engine::general_purpose};
use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

use crate::{config::AppConfig, models::object::StoredObject};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("put of `{key}` into bucket `{bucket}` failed: {reason}")]
    PutFailed {
        bucket: String,
        key: String,
        reason: String,
    },
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Write-only view of the bucket.
///
/// One attempt per call; callers surface failures instead of retrying.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(&self, object: &StoredObject, body: Bytes) -> StorageResult<()>;
}

/// `ObjectStore` backed by the AWS SDK.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the ambient AWS credential chain and the region /
    /// endpoint in `cfg`. A custom endpoint switches to path-style addressing
    /// so S3-compatible stores work.
    pub async fn from_config(cfg: &AppConfig) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(cfg.aws_region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &cfg.s3_endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self::new(Client::from_conf(builder.build()))
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(&self, object: &StoredObject, body: Bytes) -> StorageResult<()> {
        let content_md5 = content_md5(&body);
        let mut request = self
            .client
            .put_object()
            .bucket(&object.bucket)
            .key(object.key.as_str())
            .content_type(&object.content_type)
            .content_md5(content_md5)
            .cache_control(&object.cache_control)
            .body(ByteStream::from(body));
        if object.server_side_encryption {
            request = request.server_side_encryption(ServerSideEncryption::Aes256);
        }

        let output = request
            .send()
            .await
            .map_err(|err| put_failed(object, &err))?;

        debug!(
            key = %object.key,
            etag = output.e_tag().unwrap_or_default(),
            "object stored"
        );
        Ok(())
    }
}

fn put_failed(object: &StoredObject, err: &SdkError<PutObjectError>) -> StorageError {
    StorageError::PutFailed {
        bucket: object.bucket.clone(),
        key: object.key.to_string(),
        reason: DisplayErrorContext(err).to_string(),
    }
}

/// Base64 MD5 digest sent as `Content-MD5` so the bucket rejects corrupted
/// bodies.
fn content_md5(body: &[u8]) -> String {
    let digest = md5::compute(body);
    general_purpose::STANDARD.encode(digest.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_md5_is_base64_of_raw_digest() {
        // md5("") = d41d8cd98f00b204e9800998ecf8427e
        assert_eq!(content_md5(b""), "1B2M2Y8AsgTpgAmY7PhCfg==");
    }
}
