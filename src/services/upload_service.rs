//! Upload pipeline: authenticate, validate, store, describe.
//!
//! Ingestion (multipart parsing and the size ceiling) happens in the handler;
//! this service takes over once the body is buffered.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use tracing::info;

use super::{
    auth::authenticate,
    key_generator::KeyGenerator,
    storage_service::ObjectStore,
    validator::{is_allowed_extension, normalized_extension},
};
use crate::{
    config::AppConfig,
    errors::AppError,
    models::{
        object::StoredObject,
        upload::{UploadRequest, UploadResponse},
    },
};

#[derive(Clone)]
pub struct UploadService {
    config: Arc<AppConfig>,
    store: Arc<dyn ObjectStore>,
    keys: KeyGenerator,
}

impl UploadService {
    pub fn new(config: Arc<AppConfig>, store: Arc<dyn ObjectStore>) -> Self {
        let keys = KeyGenerator::new(config.key_prefix.clone());
        Self {
            config,
            store,
            keys,
        }
    }

    /// Run one upload to completion.
    ///
    /// The secret is checked before anything about the file, so a caller
    /// without the secret learns nothing about type or size rules. Nothing
    /// reaches the store unless every check passed.
    pub async fn handle(&self, request: UploadRequest) -> Result<UploadResponse, AppError> {
        if !authenticate(
            request.secret.as_deref(),
            self.config.upload_secret.as_deref(),
        ) {
            return Err(AppError::AuthenticationFailed);
        }

        let file = request.file.ok_or(AppError::NoFileProvided)?;

        if !is_allowed_extension(&file.filename, &self.config.allowed_extensions) {
            return Err(AppError::DisallowedFileType {
                extension: normalized_extension(&file.filename),
                allowed: self.config.allowed_extensions.clone(),
            });
        }
        if file.size() as u64 > self.config.max_file_size_bytes {
            return Err(AppError::FileTooLarge {
                max_bytes: self.config.max_file_size_bytes,
            });
        }

        let key = self.keys.generate(&file.filename);
        let object = StoredObject::new(&self.config.bucket, key, file.content_type.clone());
        let size = file.size();

        info!(key = %object.key, size, "uploading file");
        self.store.put_object(&object, file.bytes).await?;

        let url = object.public_url(&self.config.delivery_domain);
        info!(%url, "upload successful");

        Ok(UploadResponse {
            success: true,
            url,
            filename: object.key.file_name().to_string(),
            size,
            uploaded_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::test_config,
        models::upload::UploadedFile,
        services::storage_service::{StorageError, StorageResult},
    };
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingStore {
        puts: Mutex<Vec<StoredObject>>,
        fail: bool,
    }

    #[async_trait]
    impl ObjectStore for RecordingStore {
        async fn put_object(&self, object: &StoredObject, _body: Bytes) -> StorageResult<()> {
            self.puts.lock().unwrap().push(object.clone());
            if self.fail {
                return Err(StorageError::PutFailed {
                    bucket: object.bucket.clone(),
                    key: object.key.to_string(),
                    reason: "service unavailable".into(),
                });
            }
            Ok(())
        }
    }

    fn png(name: &str) -> UploadedFile {
        UploadedFile {
            filename: name.into(),
            content_type: "image/png".into(),
            bytes: Bytes::from_static(b"\x89PNG\r\n\x1a\n"),
        }
    }

    fn service(store: Arc<RecordingStore>) -> UploadService {
        UploadService::new(Arc::new(test_config()), store)
    }

    #[tokio::test]
    async fn stores_with_cache_and_encryption_settings() {
        let store = Arc::new(RecordingStore::default());
        let resp = service(store.clone())
            .handle(UploadRequest {
                file: Some(png("shot.png")),
                secret: Some("test-secret-123".into()),
            })
            .await
            .unwrap();

        let puts = store.puts.lock().unwrap();
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].bucket, "test-bucket");
        assert_eq!(puts[0].content_type, "image/png");
        assert_eq!(puts[0].cache_control, "max-age=31536000");
        assert!(puts[0].server_side_encryption);

        assert!(resp.success);
        assert_eq!(resp.size, 8);
        assert_eq!(
            resp.url,
            format!("https://test.cloudfront.net/{}", puts[0].key)
        );
        assert!(resp.filename.ends_with(".png"));
        assert!(resp.uploaded_at.ends_with('Z'));
    }

    #[tokio::test]
    async fn wrong_secret_beats_bad_file_type() {
        let store = Arc::new(RecordingStore::default());
        let err = service(store.clone())
            .handle(UploadRequest {
                file: Some(png("malware.exe")),
                secret: Some("nope".into()),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::AuthenticationFailed));
        assert!(store.puts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_reported_after_auth() {
        let store = Arc::new(RecordingStore::default());
        let err = service(store)
            .handle(UploadRequest {
                file: None,
                secret: Some("test-secret-123".into()),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NoFileProvided));
    }

    #[tokio::test]
    async fn oversize_file_never_reaches_store() {
        let store = Arc::new(RecordingStore::default());
        let mut cfg = test_config();
        cfg.max_file_size_bytes = 4;
        let err = UploadService::new(Arc::new(cfg), store.clone())
            .handle(UploadRequest {
                file: Some(png("big.png")),
                secret: Some("test-secret-123".into()),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::FileTooLarge { max_bytes: 4 }));
        assert!(store.puts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn store_failure_becomes_upload_failed() {
        let store = Arc::new(RecordingStore {
            fail: true,
            ..Default::default()
        });
        let err = service(store)
            .handle(UploadRequest {
                file: Some(png("shot.png")),
                secret: Some("test-secret-123".into()),
            })
            .await
            .unwrap_err();

        match err {
            AppError::StorageUploadFailed(details) => {
                assert!(details.contains("service unavailable"))
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
