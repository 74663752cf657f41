//! Cache error types
//!
//! Typed failures for the cache surface. Each variant names the stage that
//! failed so callers can build targeted retry logic: invalid keys never
//! reach I/O, a missing remote file is not retryable, a failed transfer is.

use crate::remote::FetchError;

/// Which part of a cache miss failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStage {
    /// The remote existence check.
    Probe,
    /// The byte transfer or local publication.
    Copy,
}

impl std::fmt::Display for FetchStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchStage::Probe => f.write_str("existence check"),
            FetchStage::Copy => f.write_str("copy"),
        }
    }
}

/// Errors returned by [`Cache`](crate::Cache) operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The key was rejected before any I/O was attempted.
    #[error("invalid key {key:?}: {reason}")]
    InvalidKey { key: String, reason: &'static str },

    /// The remote reported that it has no file for this key.
    ///
    /// Not retried automatically; retrying will fail again until the file
    /// appears at the remote.
    #[error("remote has no file for key {key:?}")]
    RemoteMissing { key: String },

    /// The fetch failed after the key was accepted.
    ///
    /// Nothing is cached for the key; a later `get` retries from scratch.
    #[error("fetch for key {key:?} failed during {stage}: {source}")]
    FetchFailed {
        key: String,
        stage: FetchStage,
        #[source]
        source: FetchError,
    },

    /// Local filesystem failure outside the fetch itself.
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CacheError {
    /// Whether retrying the same call could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            CacheError::InvalidKey { .. } | CacheError::RemoteMissing { .. } => false,
            CacheError::FetchFailed { source, .. } => source.is_retryable(),
            CacheError::Io(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryability() {
        let missing = CacheError::RemoteMissing {
            key: "a.txt".into(),
        };
        assert!(!missing.is_retryable());

        let failed = CacheError::FetchFailed {
            key: "a.txt".into(),
            stage: FetchStage::Copy,
            source: FetchError::Timeout,
        };
        assert!(failed.is_retryable());
    }

    #[test]
    fn test_stage_appears_in_message() {
        let err = CacheError::FetchFailed {
            key: "a.txt".into(),
            stage: FetchStage::Probe,
            source: FetchError::Timeout,
        };
        assert!(err.to_string().contains("existence check"));
    }
}
