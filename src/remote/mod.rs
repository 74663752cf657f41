//! Remote source abstraction
//!
//! A [`RemoteSource`] is wherever the authoritative copy of a file lives: a
//! local directory standing in for cloud storage, or an actual HTTP
//! endpoint. The cache is written against this trait and never against a
//! concrete backend.

pub mod errors;
pub mod http;
pub mod local;

use std::path::Path;

use async_trait::async_trait;

use crate::key::CacheKey;

pub use errors::FetchError;
pub use http::HttpSource;
pub use local::LocalDirSource;

/// Origin of authoritative file content.
///
/// Implementations are stateless beyond their root location and safe to
/// share between cache instances behind an `Arc`.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Check whether the remote has a file for this key.
    ///
    /// Returns `Ok(false)` for a merely-missing file; errors are reserved
    /// for transport or filesystem failures during the check itself.
    async fn exists(&self, key: &CacheKey) -> Result<bool, FetchError>;

    /// Write the full content of the remote file into `dest`.
    ///
    /// `dest` is a staging path chosen by the caller; atomic publication to
    /// the final cache location is the caller's job. Fails with
    /// [`FetchError::NotFound`] if the remote lacks the key.
    async fn fetch(&self, key: &CacheKey, dest: &Path) -> Result<(), FetchError>;

    /// Human-readable description of the source, for logs.
    fn describe(&self) -> String;
}
