use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use object_store::local::LocalFileSystem;
use object_store::path::Path as StorePath;
use object_store::ObjectStore;

use crate::application::ports::{FetchError, MediaFetcher};

const FILE_SCHEME: &str = "file://";

/// Serves `file://` media from a root directory, e.g. a mounted upload bucket.
/// Paths are resolved relative to the root and may not escape it.
pub struct LocalMediaFetcher {
    inner: Arc<LocalFileSystem>,
    max_bytes: u64,
}

impl LocalMediaFetcher {
    pub fn new(root: PathBuf, max_bytes: u64) -> Result<Self, FetchError> {
        std::fs::create_dir_all(&root)?;
        let fs = LocalFileSystem::new_with_prefix(root)
            .map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        Ok(Self {
            inner: Arc::new(fs),
            max_bytes,
        })
    }
}

#[async_trait]
impl MediaFetcher for LocalMediaFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        let relative = url
            .strip_prefix(FILE_SCHEME)
            .ok_or_else(|| FetchError::UnsupportedScheme(url.to_string()))?
            .trim_start_matches('/');
        let store_path =
            StorePath::parse(relative).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

        let meta = self.inner.head(&store_path).await.map_err(|e| match e {
            object_store::Error::NotFound { .. } => FetchError::NotFound(url.to_string()),
            other => FetchError::Network(other.to_string()),
        })?;
        if meta.size as u64 > self.max_bytes {
            return Err(FetchError::TooLarge {
                limit: self.max_bytes,
            });
        }

        let result = self
            .inner
            .get(&store_path)
            .await
            .map_err(|e| FetchError::NotFound(e.to_string()))?;

        result
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))
    }
}
