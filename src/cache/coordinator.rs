//! Per-key fetch coordination
//!
//! Collapses concurrent requests for the same key into a single underlying
//! fetch: the first caller holds the key's lock while it works, the rest
//! wait on it and re-check the index once they acquire it. Requests for
//! distinct keys never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::key::CacheKey;

/// Map of short-lived per-key locks.
///
/// Locks are created on first contention and reclaimed by [`release`]
/// once no caller holds or waits on them, so the map stays bounded by the
/// set of keys currently under contention.
///
/// [`release`]: FetchCoordinator::release
#[derive(Debug, Default)]
pub(crate) struct FetchCoordinator {
    locks: Mutex<HashMap<CacheKey, Arc<AsyncMutex<()>>>>,
}

impl FetchCoordinator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for a key, creating it if absent.
    ///
    /// Blocks the calling task while another fetch for the same key is in
    /// flight. The returned guard must be dropped before [`release`] is
    /// called for the entry to be reclaimed.
    ///
    /// [`release`]: FetchCoordinator::release
    pub(crate) async fn lock(&self, key: &CacheKey) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap();
            Arc::clone(locks.entry(key.clone()).or_default())
        };
        lock.lock_owned().await
    }

    /// Reclaim the key's lock if no caller still references it.
    ///
    /// Safe to call on every exit path, including after a failed fetch; a
    /// lock still held or awaited elsewhere is left in place.
    pub(crate) fn release(&self, key: &CacheKey) {
        let mut locks = self.locks.lock().unwrap();
        if let Some(lock) = locks.get(key) {
            // Only the map itself holds the Arc once all guards are gone.
            if Arc::strong_count(lock) == 1 {
                locks.remove(key);
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn active_locks(&self) -> usize {
        self.locks.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_same_key_serializes() {
        let coordinator = Arc::new(FetchCoordinator::new());
        let key = CacheKey::new("a.txt").unwrap();
        let in_critical = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..10 {
            let coordinator = Arc::clone(&coordinator);
            let key = key.clone();
            let in_critical = Arc::clone(&in_critical);
            let max_seen = Arc::clone(&max_seen);
            handles.push(tokio::spawn(async move {
                let guard = coordinator.lock(&key).await;
                let now = in_critical.fetch_add(1, Ordering::SeqCst) + 1;
                max_seen.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                in_critical.fetch_sub(1, Ordering::SeqCst);
                drop(guard);
                coordinator.release(&key);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
        assert_eq!(coordinator.active_locks(), 0);
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_block() {
        let coordinator = FetchCoordinator::new();
        let key_a = CacheKey::new("a.txt").unwrap();
        let key_b = CacheKey::new("b.txt").unwrap();

        let guard_a = coordinator.lock(&key_a).await;
        // Must not deadlock while a.txt is held.
        let guard_b = coordinator.lock(&key_b).await;

        drop(guard_a);
        drop(guard_b);
        coordinator.release(&key_a);
        coordinator.release(&key_b);
        assert_eq!(coordinator.active_locks(), 0);
    }

    #[tokio::test]
    async fn test_release_keeps_contended_lock() {
        let coordinator = FetchCoordinator::new();
        let key = CacheKey::new("a.txt").unwrap();

        let guard = coordinator.lock(&key).await;
        coordinator.release(&key);
        // Guard still alive, entry must survive.
        assert_eq!(coordinator.active_locks(), 1);

        drop(guard);
        coordinator.release(&key);
        assert_eq!(coordinator.active_locks(), 0);
    }
}
