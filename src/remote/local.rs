//! Local directory source
//!
//! A filesystem directory acting as the remote, useful for tests and for
//! workflows where the "remote" is a shared network mount. Fetching is a
//! plain file copy.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::key::CacheKey;

use super::{FetchError, RemoteSource};

/// Remote source backed by a local directory.
///
/// Files are addressed as `<root>/<key>`.
#[derive(Debug, Clone)]
pub struct LocalDirSource {
    root: PathBuf,
}

impl LocalDirSource {
    /// Create a source rooted at `root`.
    ///
    /// The directory is not required to exist yet; a missing root simply
    /// means every key is missing.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The source's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl RemoteSource for LocalDirSource {
    async fn exists(&self, key: &CacheKey) -> Result<bool, FetchError> {
        let path = key.join_under(&self.root);
        match tokio::fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(FetchError::Io(err)),
        }
    }

    async fn fetch(&self, key: &CacheKey, dest: &Path) -> Result<(), FetchError> {
        let source = key.join_under(&self.root);

        let bytes = match tokio::fs::copy(&source, dest).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(FetchError::NotFound(key.to_string()));
            }
            Err(err) => return Err(FetchError::Io(err)),
        };

        debug!(key = %key, source = %source.display(), size = bytes, "Copied file from local source");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("local directory {}", self.root.display())
    }
}
