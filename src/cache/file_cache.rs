//! File cache orchestration
//!
//! The cache resolves a logical key to a local file path, fetching from the
//! remote source on first request and serving later requests from disk.
//! Each `Cache` owns a private index; two instances pointed at the same
//! directory never share state.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::cache::coordinator::FetchCoordinator;
use crate::cache::index::{CacheEntry, CacheIndex};
use crate::error::{CacheError, FetchStage};
use crate::key::CacheKey;
use crate::remote::RemoteSource;

/// Snapshot of cache counters.
#[derive(Debug, Clone, Copy)]
pub struct CacheStats {
    /// Requests served from the index without remote I/O.
    pub hits: u64,
    /// Requests that went to the remote (or failed before it).
    pub misses: u64,
    /// Entries currently in the index.
    pub entries: usize,
}

impl CacheStats {
    /// Hit rate as a percentage, 0.0 when no requests were made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// Local file cache over a pluggable remote source.
///
/// Files are materialized under `cache_dir/<key>`; keys may contain `/`
/// separators, in which case intermediate directories are created as
/// needed. Concurrent `get` calls for the same key collapse into a single
/// fetch; calls for distinct keys proceed in parallel.
pub struct Cache {
    /// Root directory for materialized files.
    cache_dir: PathBuf,
    /// Where authoritative file content comes from.
    remote: Arc<dyn RemoteSource>,
    /// Key-to-entry mapping, private to this instance.
    index: Mutex<CacheIndex>,
    /// Per-key fetch serialization.
    coordinator: FetchCoordinator,
    /// Cache hit counter.
    hits: AtomicU64,
    /// Cache miss counter.
    misses: AtomicU64,
}

impl Cache {
    /// Create a cache that materializes files under `cache_dir`, fetching
    /// misses from `remote`.
    ///
    /// Both parameters are required; there are no implicit defaults. The
    /// cache directory is created if it does not exist. The index starts
    /// empty even if the directory already holds files from an earlier
    /// instance.
    pub fn new(
        cache_dir: impl Into<PathBuf>,
        remote: Arc<dyn RemoteSource>,
    ) -> Result<Self, CacheError> {
        let cache_dir = cache_dir.into();
        std::fs::create_dir_all(&cache_dir)?;

        info!(
            cache_dir = %cache_dir.display(),
            remote = %remote.describe(),
            "File cache initialized"
        );

        Ok(Self {
            cache_dir,
            remote,
            index: Mutex::new(CacheIndex::new()),
            coordinator: FetchCoordinator::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        })
    }

    /// Return the local path for a key, fetching from the remote if needed.
    ///
    /// Idempotent: after a successful first call, later calls return the
    /// same path without contacting the remote. A failed fetch records
    /// nothing, so the next call retries from scratch.
    ///
    /// # Errors
    /// [`CacheError::InvalidKey`] before any I/O for malformed keys,
    /// [`CacheError::RemoteMissing`] when the remote lacks the key, and
    /// [`CacheError::FetchFailed`] when the existence check or the copy
    /// itself fails.
    pub async fn get(&self, key: &str) -> Result<PathBuf, CacheError> {
        let key = CacheKey::new(key)?;

        if let Some(path) = self.check_hit(&key).await {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "Cache HIT");
            return Ok(path);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(key = %key, "Cache MISS, fetching");

        let result = self.fetch_and_publish(&key).await;
        // Reclaim the per-key lock on every exit path, success or failure.
        self.coordinator.release(&key);
        result
    }

    /// Whether this instance's index has an entry for the key.
    ///
    /// Index-only: never probes the remote and never fetches. Returns false
    /// for malformed keys.
    pub fn has(&self, key: &str) -> bool {
        match CacheKey::new(key) {
            Ok(key) => self.index.lock().unwrap().contains(&key),
            Err(_) => false,
        }
    }

    /// Invalidate a single key, deleting its local file.
    ///
    /// Returns `Ok(true)` if an entry was removed, `Ok(false)` if the key
    /// was not cached by this instance.
    pub async fn remove(&self, key: &str) -> Result<bool, CacheError> {
        let key = CacheKey::new(key)?;

        let entry = self.index.lock().unwrap().remove(&key);
        let Some(entry) = entry else {
            return Ok(false);
        };

        match tokio::fs::remove_file(&entry.local_path).await {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(CacheError::Io(err)),
        }

        debug!(key = %key, "Invalidated cached file");
        Ok(true)
    }

    /// Drop every entry this instance fetched, deleting the local files,
    /// and reset the counters.
    ///
    /// Files placed in the same directory by other instances are left
    /// alone.
    pub async fn clear(&self) -> Result<(), CacheError> {
        let drained = self.index.lock().unwrap().drain();
        let count = drained.len();

        for entry in drained {
            match tokio::fs::remove_file(&entry.local_path).await {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => {
                    warn!(
                        path = %entry.local_path.display(),
                        error = %err,
                        "Failed to delete cached file"
                    );
                }
            }
        }

        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        debug!(entries = count, "Cleared cache");
        Ok(())
    }

    /// Current hit/miss/entry counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.index.lock().unwrap().len(),
        }
    }

    /// The directory files are materialized under.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Resolve an index hit, verifying the file is still on disk.
    ///
    /// An entry whose file was deleted behind our back is dropped so the
    /// caller falls through to a fresh fetch instead of handing out a dead
    /// path.
    async fn check_hit(&self, key: &CacheKey) -> Option<PathBuf> {
        let path = {
            let index = self.index.lock().unwrap();
            index.lookup(key)?.local_path.clone()
        };

        if tokio::fs::metadata(&path).await.is_ok() {
            return Some(path);
        }

        warn!(key = %key, path = %path.display(), "Cached file missing on disk, re-fetching");
        self.index.lock().unwrap().remove(key);
        None
    }

    /// Fetch a missing key under the per-key lock and publish it.
    ///
    /// Caller is responsible for `coordinator.release` after this returns.
    async fn fetch_and_publish(&self, key: &CacheKey) -> Result<PathBuf, CacheError> {
        let _guard = self.coordinator.lock(key).await;

        // Another caller may have completed the fetch while we waited.
        let published = {
            let index = self.index.lock().unwrap();
            index.lookup(key).map(|entry| entry.local_path.clone())
        };
        if let Some(path) = published {
            debug!(key = %key, "Fetch completed by concurrent caller");
            return Ok(path);
        }

        match self.remote.exists(key).await {
            Ok(true) => {}
            Ok(false) => {
                return Err(CacheError::RemoteMissing {
                    key: key.to_string(),
                })
            }
            Err(source) => {
                return Err(CacheError::FetchFailed {
                    key: key.to_string(),
                    stage: FetchStage::Probe,
                    source,
                })
            }
        }

        let dest = key.join_under(&self.cache_dir);
        let parent = dest.parent().unwrap_or(&self.cache_dir);
        tokio::fs::create_dir_all(parent).await?;

        // Stage next to the destination and publish with a rename, so no
        // caller ever observes a partially written file and a failed fetch
        // leaves nothing under the published key.
        let staging = tempfile::NamedTempFile::new_in(parent)?;
        if let Err(source) = self.remote.fetch(key, staging.path()).await {
            return Err(CacheError::FetchFailed {
                key: key.to_string(),
                stage: FetchStage::Copy,
                source,
            });
        }
        staging.persist(&dest).map_err(|err| CacheError::Io(err.error))?;

        self.index
            .lock()
            .unwrap()
            .insert(CacheEntry::new(key.clone(), dest.clone()));

        info!(key = %key, path = %dest.display(), "Fetched file into cache");
        Ok(dest)
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("cache_dir", &self.cache_dir)
            .field("remote", &self.remote.describe())
            .field("entries", &self.index.lock().unwrap().len())
            .finish()
    }
}
