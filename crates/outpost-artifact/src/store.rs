//! Object storage for model archives.
//!
//! Supports local filesystem, in-memory, and S3 backends behind one
//! [`ArtifactStore`] type. Archives live at deterministic keys under
//! `models/` so later stages can re-derive the location from the archive
//! name alone.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use tracing::{debug, info};

use outpost_core::CloudConfig;

use crate::error::{ArtifactError, ArtifactResult};

/// Location of an uploaded object, in `s3://bucket/key` form.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ObjectUri(String);

impl ObjectUri {
    /// Compose a URI from bucket and key.
    #[must_use]
    pub fn new(bucket: &str, key: &str) -> Self {
        Self(format!("s3://{bucket}/{key}"))
    }

    /// Wrap an already-formed URI string.
    #[must_use]
    pub fn from_raw(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// Get the URI as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which object-store backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// S3 (or S3-compatible) remote store.
    #[default]
    S3,
    /// Local filesystem store rooted at the bucket path.
    Local,
    /// In-memory store for tests.
    Memory,
}

/// Store for model archives and compiled artifacts.
pub struct ArtifactStore {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl ArtifactStore {
    /// Create a store from cloud configuration.
    pub fn new(config: &CloudConfig, backend: StorageBackend) -> ArtifactResult<Self> {
        let store: Arc<dyn ObjectStore> = match backend {
            StorageBackend::Memory => Arc::new(object_store::memory::InMemory::new()),
            StorageBackend::Local => {
                let store = object_store::local::LocalFileSystem::new_with_prefix(&config.bucket)
                    .map_err(|e| ArtifactError::StoreCreation(e.to_string()))?;
                Arc::new(store)
            }
            StorageBackend::S3 => {
                use object_store::aws::AmazonS3Builder;
                let mut builder = AmazonS3Builder::new()
                    .with_bucket_name(&config.bucket)
                    .with_region(&config.region);

                if let Some(endpoint) = &config.endpoints.storage_endpoint {
                    builder = builder.with_endpoint(endpoint);
                    if endpoint.starts_with("http://") {
                        builder = builder.with_allow_http(true);
                    }
                }
                if let Some(key_id) = config.credentials.access_key_id() {
                    builder = builder.with_access_key_id(&key_id);
                }
                if let Some(secret) = config.credentials.secret_access_key() {
                    builder = builder.with_secret_access_key(&secret);
                }

                let store = builder
                    .build()
                    .map_err(|e| ArtifactError::StoreCreation(e.to_string()))?;
                Arc::new(store)
            }
        };

        Ok(Self {
            store,
            bucket: config.bucket.clone(),
        })
    }

    /// Create a store with a pre-configured object store, for tests.
    #[must_use]
    pub fn with_store(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
        }
    }

    /// Deterministic key for a model archive.
    #[must_use]
    pub fn model_key(archive_name: &str) -> String {
        format!("models/{archive_name}")
    }

    /// Upload a local file, returning the object URI.
    ///
    /// A missing source file is [`ArtifactError::SourceMissing`]; upload
    /// failures carry the underlying store error. Nothing is swallowed.
    pub async fn upload(&self, src: &Path, key: &str) -> ArtifactResult<ObjectUri> {
        if !src.is_file() {
            return Err(ArtifactError::SourceMissing(src.to_owned()));
        }

        let path = ObjectPath::parse(key).map_err(|e| ArtifactError::InvalidPath(e.to_string()))?;

        let data = tokio::fs::read(src).await?;
        let size = data.len();

        debug!(src = %src.display(), key = %key, size, "uploading archive");

        self.store
            .put(&path, Bytes::from(data).into())
            .await
            .map_err(|e| ArtifactError::Upload {
                key: key.to_owned(),
                source: e,
            })?;

        let uri = ObjectUri::new(&self.bucket, key);
        info!(key = %key, size, uri = %uri, "archive uploaded");

        Ok(uri)
    }

    /// Download an object to a local file.
    pub async fn download(&self, key: &str, dest: &Path) -> ArtifactResult<()> {
        let path = ObjectPath::parse(key).map_err(|e| ArtifactError::InvalidPath(e.to_string()))?;

        let result = self
            .store
            .get(&path)
            .await
            .map_err(|e| ArtifactError::Download {
                key: key.to_owned(),
                source: e,
            })?;

        let bytes = result.bytes().await.map_err(|e| ArtifactError::Download {
            key: key.to_owned(),
            source: e,
        })?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(dest, &bytes).await?;

        info!(key = %key, size = bytes.len(), dest = %dest.display(), "object downloaded");
        Ok(())
    }

    /// Check whether an object exists.
    pub async fn exists(&self, key: &str) -> ArtifactResult<bool> {
        let path = ObjectPath::parse(key).map_err(|e| ArtifactError::InvalidPath(e.to_string()))?;

        match self.store.head(&path).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(ArtifactError::Download {
                key: key.to_owned(),
                source: e,
            }),
        }
    }

    /// List object keys under a prefix.
    pub async fn list(&self, prefix: &str) -> ArtifactResult<Vec<String>> {
        use futures::StreamExt;

        let prefix = ObjectPath::from(prefix);
        let mut keys = Vec::new();
        let mut stream = self.store.list(Some(&prefix));

        while let Some(result) = stream.next().await {
            match result {
                Ok(meta) => keys.push(meta.location.to_string()),
                Err(e) => {
                    return Err(ArtifactError::Download {
                        key: prefix.to_string(),
                        source: e,
                    })
                }
            }
        }

        Ok(keys)
    }

    /// Bucket this store writes to.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

impl fmt::Debug for ArtifactStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactStore")
            .field("bucket", &self.bucket)
            .finish_non_exhaustive()
    }
}
