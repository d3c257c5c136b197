use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::{ObjectStore, PutPayload};
use serde::{Deserialize, Serialize};

use dap_crypto::blob_key;
use dap_types::{BackendType, BlobKey};

use crate::context::RequestContext;
use crate::error::{StoreError, StoreResult};
use crate::stats::{Stats, StatsCounter};
use crate::traits::Store;

/// Where the object store keeps its data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectStoreKind {
    /// S3-compatible service (AWS, MinIO, ...).
    #[default]
    S3,
    /// Directory on the local filesystem.
    Local,
    /// Process memory.
    Memory,
}

/// How S3 credentials are obtained.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialType {
    /// Access key id and secret from the config.
    #[default]
    Static,
    /// Ambient credentials (instance profile, web identity, environment).
    Iam,
    /// Any unrecognized value. Treated like `Static`.
    #[serde(other)]
    Unknown,
}

impl From<&str> for CredentialType {
    fn from(s: &str) -> Self {
        match s {
            "static" => Self::Static,
            "iam" => Self::Iam,
            _ => Self::Unknown,
        }
    }
}

/// Configuration of the content-addressed object store backend.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectStoreConfig {
    pub kind: ObjectStoreKind,
    pub bucket: String,
    /// Key prefix inside the bucket.
    pub path: String,
    pub endpoint: String,
    pub region: String,
    pub credential_type: CredentialType,
    pub access_key_id: String,
    pub access_key_secret: String,
    /// Root directory for `kind = "local"`.
    pub root: PathBuf,
    /// Count reads and writes.
    pub profiling: bool,
    /// Mirror availability-network writes here and fall back to it on
    /// availability-network read misses.
    pub backup: bool,
}

impl Default for ObjectStoreConfig {
    fn default() -> Self {
        Self {
            kind: ObjectStoreKind::S3,
            bucket: String::new(),
            path: String::new(),
            endpoint: String::new(),
            region: "us-east-1".into(),
            credential_type: CredentialType::Static,
            access_key_id: String::new(),
            access_key_secret: String::new(),
            root: PathBuf::from("./data"),
            profiling: false,
            backup: false,
        }
    }
}

impl fmt::Debug for ObjectStoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectStoreConfig")
            .field("kind", &self.kind)
            .field("bucket", &self.bucket)
            .field("path", &self.path)
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("credential_type", &self.credential_type)
            .field("root", &self.root)
            .field("profiling", &self.profiling)
            .field("backup", &self.backup)
            .finish_non_exhaustive()
    }
}

impl ObjectStoreConfig {
    /// Check required fields for the selected kind.
    pub fn validate(&self) -> StoreResult<()> {
        if self.kind == ObjectStoreKind::S3 {
            if self.bucket.is_empty() {
                return Err(StoreError::Config("s3 object store requires a bucket".into()));
            }
            if self.endpoint.is_empty() {
                return Err(StoreError::Config("s3 object store requires an endpoint".into()));
            }
        }
        Ok(())
    }
}

/// Content-addressed object store backend.
///
/// Each blob lives at `<path>/<hex(key)>`. Keys are Keccak-256 hashes of the
/// stored bytes, so overwriting a key with identical bytes is harmless.
pub struct ObjectStoreBackend {
    inner: Arc<dyn ObjectStore>,
    prefix: Path,
    stats: StatsCounter,
}

impl ObjectStoreBackend {
    /// Build the backend described by `cfg`.
    pub fn new(cfg: &ObjectStoreConfig) -> StoreResult<Self> {
        cfg.validate()?;
        let inner: Arc<dyn ObjectStore> = match cfg.kind {
            ObjectStoreKind::S3 => {
                let mut builder = AmazonS3Builder::new()
                    .with_bucket_name(&cfg.bucket)
                    .with_endpoint(&cfg.endpoint)
                    .with_region(&cfg.region)
                    .with_allow_http(!cfg.endpoint.starts_with("https://"));
                if cfg.credential_type != CredentialType::Iam {
                    builder = builder
                        .with_access_key_id(&cfg.access_key_id)
                        .with_secret_access_key(&cfg.access_key_secret);
                }
                Arc::new(builder.build().map_err(|e| StoreError::Config(e.to_string()))?)
            }
            ObjectStoreKind::Local => {
                std::fs::create_dir_all(&cfg.root).map_err(|e| {
                    StoreError::Config(format!("cannot create {}: {e}", cfg.root.display()))
                })?;
                let fs = LocalFileSystem::new_with_prefix(&cfg.root)
                    .map_err(|e| StoreError::Config(e.to_string()))?;
                Arc::new(fs)
            }
            ObjectStoreKind::Memory => Arc::new(InMemory::new()),
        };
        tracing::info!(kind = ?cfg.kind, bucket = %cfg.bucket, path = %cfg.path, "object store backend ready");
        Ok(Self::from_store(inner, &cfg.path, cfg.profiling))
    }

    /// Wrap an existing `object_store` client.
    pub fn from_store(inner: Arc<dyn ObjectStore>, prefix: &str, profiling: bool) -> Self {
        Self {
            inner,
            prefix: Path::from(prefix),
            stats: StatsCounter::new(profiling),
        }
    }

    /// An in-memory backend, for tests and local development.
    pub fn in_memory(profiling: bool) -> Self {
        Self::from_store(Arc::new(InMemory::new()), "", profiling)
    }

    fn location(&self, key: &BlobKey) -> Path {
        self.prefix.child(key.to_hex())
    }

    fn map_error(key: &BlobKey, err: object_store::Error) -> StoreError {
        match err {
            object_store::Error::NotFound { .. } => StoreError::NotFound(*key),
            other => StoreError::backend(BackendType::ObjectStore, other),
        }
    }
}

#[async_trait]
impl Store for ObjectStoreBackend {
    async fn get(&self, ctx: &RequestContext, key: &BlobKey) -> StoreResult<Bytes> {
        let location = self.location(key);
        let data = ctx
            .run(async {
                let result = self
                    .inner
                    .get(&location)
                    .await
                    .map_err(|e| Self::map_error(key, e))?;
                result.bytes().await.map_err(|e| Self::map_error(key, e))
            })
            .await?;
        self.stats.record_read();
        Ok(data)
    }

    async fn put(&self, ctx: &RequestContext, key: &BlobKey, value: Bytes) -> StoreResult<()> {
        let location = self.location(key);
        ctx.run(async {
            self.inner
                .put(&location, PutPayload::from(value))
                .await
                .map_err(|e| StoreError::backend(BackendType::ObjectStore, e))
        })
        .await?;
        self.stats.record_entry();
        Ok(())
    }

    fn verify(&self, key: &BlobKey, value: &[u8]) -> StoreResult<()> {
        let computed = blob_key(value);
        if &computed != key {
            return Err(StoreError::Integrity {
                key: *key,
                reason: format!("key does not match value (computed {computed})"),
            });
        }
        Ok(())
    }

    fn stats(&self) -> Stats {
        self.stats.snapshot()
    }

    fn backend_type(&self) -> BackendType {
        BackendType::ObjectStore
    }
}

impl fmt::Debug for ObjectStoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectStoreBackend")
            .field("store", &self.inner.to_string())
            .field("prefix", &self.prefix.as_ref())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put_blob(value: &'static [u8]) -> (BlobKey, Bytes) {
        (blob_key(value), Bytes::from_static(value))
    }

    #[tokio::test]
    async fn put_then_get() {
        let store = ObjectStoreBackend::in_memory(false);
        let ctx = RequestContext::background();
        let (key, value) = put_blob(b"hello world");

        store.put(&ctx, &key, value.clone()).await.unwrap();
        let read = store.get(&ctx, &key).await.unwrap();
        assert_eq!(read, value);
        store.verify(&key, &read).unwrap();
    }

    #[tokio::test]
    async fn missing_key_is_not_found() {
        let store = ObjectStoreBackend::in_memory(false);
        let err = store
            .get(&RequestContext::background(), &blob_key(b"absent"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn identical_overwrite_is_a_no_op() {
        let store = ObjectStoreBackend::in_memory(true);
        let ctx = RequestContext::background();
        let (key, value) = put_blob(b"same bytes");
        store.put(&ctx, &key, value.clone()).await.unwrap();
        store.put(&ctx, &key, value.clone()).await.unwrap();
        assert_eq!(store.get(&ctx, &key).await.unwrap(), value);
        assert_eq!(
            store.stats(),
            Stats {
                entries: 2,
                reads: 1
            }
        );
    }

    #[test]
    fn verify_rejects_mismatch() {
        let store = ObjectStoreBackend::in_memory(false);
        let err = store.verify(&blob_key(b"original"), b"tampered").unwrap_err();
        assert!(err.is_integrity());
    }

    #[tokio::test]
    async fn cancelled_context_skips_io() {
        let store = ObjectStoreBackend::in_memory(true);
        let ctx = RequestContext::background();
        ctx.cancel();
        let (key, value) = put_blob(b"never written");
        let err = store.put(&ctx, &key, value).await.unwrap_err();
        assert!(matches!(err, StoreError::Cancelled));
        assert_eq!(store.stats().entries, 0);
    }

    #[tokio::test]
    async fn local_filesystem_layout() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = ObjectStoreConfig {
            kind: ObjectStoreKind::Local,
            root: dir.path().to_path_buf(),
            path: "proxy".into(),
            ..Default::default()
        };
        let store = ObjectStoreBackend::new(&cfg).unwrap();
        let ctx = RequestContext::background();
        let (key, value) = put_blob(b"on disk");
        store.put(&ctx, &key, value.clone()).await.unwrap();

        let file = dir.path().join("proxy").join(key.to_hex());
        assert_eq!(std::fs::read(file).unwrap(), value.to_vec());
        assert_eq!(store.get(&ctx, &key).await.unwrap(), value);
    }

    #[test]
    fn s3_config_requires_bucket_and_endpoint() {
        let cfg = ObjectStoreConfig::default();
        assert!(matches!(cfg.validate(), Err(StoreError::Config(_))));

        let cfg = ObjectStoreConfig {
            bucket: "blobs".into(),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = ObjectStoreConfig {
            bucket: "blobs".into(),
            endpoint: "http://localhost:9000".into(),
            ..Default::default()
        };
        cfg.validate().unwrap();
    }

    #[test]
    fn s3_backend_builds_without_network() {
        let cfg = ObjectStoreConfig {
            bucket: "blobs".into(),
            endpoint: "http://localhost:9000".into(),
            access_key_id: "minio".into(),
            access_key_secret: "minio123".into(),
            ..Default::default()
        };
        let store = ObjectStoreBackend::new(&cfg).unwrap();
        assert_eq!(store.backend_type(), BackendType::ObjectStore);
    }

    #[test]
    fn credential_type_parsing() {
        assert_eq!(CredentialType::from("static"), CredentialType::Static);
        assert_eq!(CredentialType::from("iam"), CredentialType::Iam);
        assert_eq!(CredentialType::from("kerberos"), CredentialType::Unknown);

        let parsed: CredentialType = serde_json::from_str("\"magic\"").unwrap();
        assert_eq!(parsed, CredentialType::Unknown);
    }

    #[test]
    fn debug_hides_secrets() {
        let cfg = ObjectStoreConfig {
            access_key_secret: "hunter2".into(),
            ..Default::default()
        };
        assert!(!format!("{cfg:?}").contains("hunter2"));
    }
}
