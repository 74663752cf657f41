//! Remote fetch error types
//!
//! Structured errors for remote source operations. HTTP status codes map to
//! specific variants so the cache layer can tell "file not there" apart from
//! "transfer broke" and make retry decisions.

/// Errors produced by a [`RemoteSource`](super::RemoteSource).
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error ({status}): {message}")]
    Http { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("request timeout")]
    Timeout,
}

impl FetchError {
    /// Whether this error is transient enough that a retry could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::NotFound(_) => false,
            FetchError::Io(_) | FetchError::Network(_) | FetchError::Timeout => true,
            FetchError::Http { status, .. } => matches!(status, 408 | 429 | 500..=599),
        }
    }

    /// Create a FetchError from an HTTP status code and response body.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            404 => FetchError::NotFound(body.to_string()),
            408 => FetchError::Timeout,
            _ => FetchError::Http {
                status,
                message: body.to_string(),
            },
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = err.status() {
            FetchError::from_status(status.as_u16(), &err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(
            FetchError::from_status(404, "no such file"),
            FetchError::NotFound(_)
        ));
        assert!(matches!(
            FetchError::from_status(408, ""),
            FetchError::Timeout
        ));
        assert!(matches!(
            FetchError::from_status(503, "unavailable"),
            FetchError::Http { status: 503, .. }
        ));
    }

    #[test]
    fn test_retryability() {
        assert!(!FetchError::NotFound("x".into()).is_retryable());
        assert!(FetchError::Timeout.is_retryable());
        assert!(FetchError::from_status(500, "").is_retryable());
        assert!(!FetchError::from_status(403, "").is_retryable());
    }
}
