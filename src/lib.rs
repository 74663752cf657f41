//! filecache - local file cache with a pluggable remote source
//!
//! A [`Cache`] transparently fetches files from a [`RemoteSource`] on first
//! request and serves later requests from local storage:
//!
//! ```no_run
//! use std::sync::Arc;
//! use filecache::{Cache, LocalDirSource};
//!
//! # async fn example() -> Result<(), filecache::CacheError> {
//! let remote = Arc::new(LocalDirSource::new("/mnt/shared/data"));
//! let cache = Cache::new("/var/cache/filecache", remote)?;
//!
//! let path = cache.get("genotypes/batch1.csv").await?;
//! // path now points at a complete local copy
//! # Ok(())
//! # }
//! ```
//!
//! Remote backends implement the [`RemoteSource`] trait; a local directory
//! stand-in ([`LocalDirSource`]) and an HTTP endpoint ([`HttpSource`]) are
//! provided.

pub mod cache;
pub mod error;
pub mod key;
pub mod remote;

pub use cache::{Cache, CacheEntry, CacheIndex, CacheStats};
pub use error::{CacheError, FetchStage};
pub use key::CacheKey;
pub use remote::{FetchError, HttpSource, LocalDirSource, RemoteSource};
