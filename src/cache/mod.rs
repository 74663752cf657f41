//! Local caching layer
//!
//! Resolves logical keys to local files, fetching from the remote source on
//! first request. One index per cache instance; per-key coordination keeps
//! concurrent fetches for the same key down to one.

mod coordinator;
pub mod file_cache;
pub mod index;

pub use file_cache::{Cache, CacheStats};
pub use index::{CacheEntry, CacheIndex};
