//! In-memory cache index
//!
//! Maps logical keys to their materialized local files. Pure data structure,
//! no I/O; concurrency discipline lives in the layer above. Each index is
//! private to one [`Cache`](crate::Cache) instance and dies with it.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::SystemTime;

use crate::key::CacheKey;

/// Record binding a key to its local file and fetch time.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The logical key this entry was fetched for.
    pub key: CacheKey,
    /// Path to the materialized file under the cache directory.
    pub local_path: PathBuf,
    /// When the fetch that created this entry completed.
    pub fetched_at: SystemTime,
}

impl CacheEntry {
    /// Create an entry stamped with the current time.
    pub fn new(key: CacheKey, local_path: PathBuf) -> Self {
        Self {
            key,
            local_path,
            fetched_at: SystemTime::now(),
        }
    }
}

/// In-memory mapping from key to cache entry.
#[derive(Debug, Default)]
pub struct CacheIndex {
    entries: HashMap<CacheKey, CacheEntry>,
}

impl CacheIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the entry for a key.
    pub fn lookup(&self, key: &CacheKey) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// Whether the index has an entry for a key.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert an entry for a key.
    ///
    /// Live entries are never silently replaced; callers remove first when
    /// invalidating.
    pub fn insert(&mut self, entry: CacheEntry) {
        debug_assert!(
            !self.entries.contains_key(&entry.key),
            "entry for {} inserted twice without invalidation",
            entry.key
        );
        self.entries.insert(entry.key.clone(), entry);
    }

    /// Remove the entry for a key, returning it if present.
    pub fn remove(&mut self, key: &CacheKey) -> Option<CacheEntry> {
        self.entries.remove(key)
    }

    /// Drop all entries, returning the removed set.
    pub fn drain(&mut self) -> Vec<CacheEntry> {
        self.entries.drain().map(|(_, entry)| entry).collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
