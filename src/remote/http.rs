//! HTTP remote source
//!
//! Remote source backed by an HTTP or object-store endpoint. Existence is a
//! HEAD request, fetching is a GET; key segments are URL-encoded so keys
//! with unusual characters address the right object.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::key::CacheKey;

use super::{FetchError, RemoteSource};

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Remote source backed by an HTTP endpoint.
///
/// Files are addressed as `<base_url>/<key>`, with each path segment of the
/// key percent-encoded.
#[derive(Debug, Clone)]
pub struct HttpSource {
    http_client: Client,
    base_url: String,
}

impl HttpSource {
    /// Create a source rooted at `base_url` with a default timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self, FetchError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a source with a custom per-request timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// Build the URL for a key, encoding each path segment.
    fn url_for(&self, key: &CacheKey) -> String {
        let encoded: Vec<String> = key
            .as_str()
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!("{}/{}", self.base_url, encoded.join("/"))
    }
}

#[async_trait]
impl RemoteSource for HttpSource {
    async fn exists(&self, key: &CacheKey) -> Result<bool, FetchError> {
        let url = self.url_for(key);
        debug!(key = %key, url = %url, "Probing remote file");

        let response = self.http_client.head(&url).send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(true)
        } else if status.as_u16() == 404 {
            Ok(false)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(FetchError::from_status(status.as_u16(), &body))
        }
    }

    async fn fetch(&self, key: &CacheKey, dest: &Path) -> Result<(), FetchError> {
        let url = self.url_for(key);
        debug!(key = %key, url = %url, "Downloading remote file");

        let response = self.http_client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::from_status(status.as_u16(), &body));
        }

        let bytes = response.bytes().await?;
        tokio::fs::write(dest, &bytes).await?;

        debug!(key = %key, size = bytes.len(), "Downloaded remote file");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("http endpoint {}", self.base_url)
    }
}
