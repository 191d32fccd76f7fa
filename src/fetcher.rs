//! Identity rotation, retry, and pacing bundled around the HTTP client.
//!
//! Every request made by a crawl flow goes through [`RotatingFetcher`], which
//! draws a fresh User-Agent from the shared pool for each attempt.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::instrument;
use url::Url;

use crate::download::PdfDownloader;
use crate::http::{FetchError, HttpClient, RetryPolicy, with_retry};
use crate::model::DownloadTarget;
use crate::pacing::{Entropy, Sleeper, ThreadEntropy, TokioSleeper};
use crate::user_agent::UserAgentPool;

/// Shared request plumbing for the paginator, resolver, and downloader.
#[derive(Debug, Clone)]
pub struct RotatingFetcher {
    client: HttpClient,
    identities: Arc<UserAgentPool>,
    entropy: Arc<dyn Entropy>,
    sleeper: Arc<dyn Sleeper>,
    retry_policy: RetryPolicy,
}

impl RotatingFetcher {
    /// Creates a fetcher using the thread RNG, the Tokio timer, and no retries.
    #[must_use]
    pub fn new(client: HttpClient, identities: Arc<UserAgentPool>) -> Self {
        Self {
            client,
            identities,
            entropy: Arc::new(ThreadEntropy),
            sleeper: Arc::new(TokioSleeper),
            retry_policy: RetryPolicy::default(),
        }
    }

    /// Replaces the randomness source.
    #[must_use]
    pub fn with_entropy(mut self, entropy: Arc<dyn Entropy>) -> Self {
        self.entropy = entropy;
        self
    }

    /// Replaces the sleeper used for backoff and politeness pauses.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Replaces the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Draws a random identity from the pool.
    #[must_use]
    pub fn identity(&self) -> &str {
        self.identities.next_identity(self.entropy.as_ref())
    }

    /// Randomness source shared with pacing.
    #[must_use]
    pub fn entropy(&self) -> &dyn Entropy {
        self.entropy.as_ref()
    }

    /// Sleeper shared with pacing.
    #[must_use]
    pub fn sleeper(&self) -> &dyn Sleeper {
        self.sleeper.as_ref()
    }

    /// Underlying HTTP client.
    #[must_use]
    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    /// Fetches a page as text, rotating identity on every attempt.
    ///
    /// # Errors
    ///
    /// Returns the last [`FetchError`] once the retry policy gives up.
    #[instrument(level = "debug", skip(self, url), fields(url = %url))]
    pub async fn fetch_html(&self, url: &Url) -> Result<String, FetchError> {
        with_retry(
            &self.retry_policy,
            self.entropy(),
            self.sleeper(),
            url.as_str(),
            |_| self.client.fetch_text(url.as_str(), self.identity()),
        )
        .await
    }

    /// Streams a PDF to disk, rotating identity on every attempt.
    ///
    /// # Errors
    ///
    /// Returns the last [`FetchError`] once the retry policy gives up.
    pub async fn fetch_pdf(
        &self,
        downloader: &PdfDownloader,
        target: &DownloadTarget,
        output_dir: &Path,
    ) -> Result<PathBuf, FetchError> {
        with_retry(
            &self.retry_policy,
            self.entropy(),
            self.sleeper(),
            target.pdf_url.as_str(),
            |_| downloader.download(target, self.identity(), output_dir),
        )
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::pacing::{FixedEntropy, RecordingSleeper};

    fn pool() -> Arc<UserAgentPool> {
        Arc::new(UserAgentPool::new(["agent-zero", "agent-one"]).unwrap())
    }

    #[tokio::test]
    async fn test_fetch_html_uses_entropy_selected_identity() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/article"))
            .and(header("user-agent", "agent-one"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>hi</p>"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let fetcher = RotatingFetcher::new(HttpClient::new(), pool())
            .with_entropy(Arc::new(FixedEntropy::new(1, 0.0)));
        let url = Url::parse(&format!("{}/article", mock_server.uri())).unwrap();
        assert_eq!(fetcher.fetch_html(&url).await.unwrap(), "<p>hi</p>");
    }

    #[tokio::test]
    async fn test_fetch_html_retries_transient_status_when_configured() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
            .mount(&mock_server)
            .await;

        let sleeper = Arc::new(RecordingSleeper::new());
        let fetcher = RotatingFetcher::new(HttpClient::new(), pool())
            .with_entropy(Arc::new(FixedEntropy::new(0, 0.0)))
            .with_sleeper(sleeper.clone())
            .with_retry_policy(RetryPolicy::with_max_attempts(2));
        let url = Url::parse(&format!("{}/flaky", mock_server.uri())).unwrap();

        assert_eq!(fetcher.fetch_html(&url).await.unwrap(), "recovered");
        assert_eq!(sleeper.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_html_without_retry_surfaces_first_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&mock_server)
            .await;

        let fetcher = RotatingFetcher::new(HttpClient::new(), pool())
            .with_sleeper(Arc::new(RecordingSleeper::new()));
        let url = Url::parse(&format!("{}/down", mock_server.uri())).unwrap();
        let err = fetcher.fetch_html(&url).await.unwrap_err();
        assert_eq!(err.status(), Some(503));
    }
}
