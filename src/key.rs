//! Cache key validation
//!
//! Keys are opaque strings naming a logical file at the remote, optionally
//! containing `/` separators. Validation happens once, before any I/O, so
//! the rest of the crate can join a key onto a directory without worrying
//! about path traversal.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::error::CacheError;

/// A validated logical file name.
///
/// Guaranteed to be a non-empty relative path made of normal components
/// only: no `..`, no leading `/`, no backslashes, no NUL bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Validate a raw key string.
    ///
    /// # Errors
    /// Returns [`CacheError::InvalidKey`] for keys that are empty, absolute,
    /// contain parent-directory components, or otherwise cannot be safely
    /// joined onto a cache directory.
    pub fn new(key: &str) -> Result<Self, CacheError> {
        if key.is_empty() {
            return Err(Self::invalid(key, "key is empty"));
        }
        if key.contains('\0') {
            return Err(Self::invalid(key, "key contains NUL byte"));
        }
        if key.contains('\\') {
            return Err(Self::invalid(key, "key contains backslash"));
        }

        for component in Path::new(key).components() {
            match component {
                Component::Normal(_) => {}
                Component::ParentDir => {
                    return Err(Self::invalid(key, "key contains parent-directory component"));
                }
                Component::CurDir => {
                    return Err(Self::invalid(key, "key contains '.' component"));
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(Self::invalid(key, "key is an absolute path"));
                }
            }
        }

        Ok(Self(key.to_string()))
    }

    /// The key as originally supplied.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve this key to a path under `root`.
    pub fn join_under(&self, root: &Path) -> PathBuf {
        root.join(&self.0)
    }

    fn invalid(key: &str, reason: &'static str) -> CacheError {
        CacheError::InvalidKey {
            key: key.to_string(),
            reason,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_and_nested_keys_accepted() {
        assert!(CacheKey::new("greeting.txt").is_ok());
        assert!(CacheKey::new("genotypes/batch1/sample.csv").is_ok());
    }

    #[test]
    fn test_traversal_rejected() {
        for bad in ["", "../etc/passwd", "a/../b", "/etc/passwd", "./a", "a\\b"] {
            let err = CacheKey::new(bad).unwrap_err();
            assert!(
                matches!(err, CacheError::InvalidKey { .. }),
                "expected InvalidKey for {bad:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn test_join_under_stays_in_root() {
        let key = CacheKey::new("sub/dir/file.txt").unwrap();
        let joined = key.join_under(Path::new("/cache"));
        assert_eq!(joined, PathBuf::from("/cache/sub/dir/file.txt"));
    }
}
