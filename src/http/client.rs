//! HTTP client wrapper issuing identity-tagged GET requests.
//!
//! The client never retries on its own; callers decide what a failure means
//! (stop paginating, skip an article, skip a download).

use std::time::Duration;

use reqwest::Client;
use reqwest::header::USER_AGENT;
use tracing::{debug, instrument};
use url::Url;

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::error::FetchError;

/// HTTP client for listing pages, article pages, and PDF bodies.
///
/// Create once and clone freely; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a new HTTP client with default timeouts.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    pub fn new() -> Self {
        Self::new_with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a new HTTP client with explicit timeout values.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the supplied
    /// timeout configuration.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new_with_timeouts(connect_timeout_secs: u64, read_timeout_secs: u64) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .gzip(true)
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    /// Issues a GET with `identity` as the User-Agent header.
    ///
    /// The response body is left unread, so callers may either materialize it
    /// ([`fetch_text`](Self::fetch_text)) or stream it with `bytes_stream()`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the URL is invalid, the request fails, or the
    /// server answers with a non-success status.
    #[instrument(skip(self, url, identity), fields(url = %url))]
    pub async fn fetch(&self, url: &str, identity: &str) -> Result<reqwest::Response, FetchError> {
        let parsed = Url::parse(url).map_err(|_| FetchError::invalid_url(url))?;

        let response = self
            .client
            .get(parsed)
            .header(USER_AGENT, identity)
            .send()
            .await
            .map_err(|e| FetchError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "non-success response");
            return Err(FetchError::http_status(url, status.as_u16()));
        }

        Ok(response)
    }

    /// Issues a GET and reads the whole body as text.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`fetch`](Self::fetch), plus a network error
    /// if the body cannot be read.
    pub async fn fetch_text(&self, url: &str, identity: &str) -> Result<String, FetchError> {
        let response = self.fetch(url, identity).await?;
        response
            .text()
            .await
            .map_err(|e| FetchError::network(url, e))
    }
}
