//! Crawler configuration and fatal configuration errors.

use std::path::PathBuf;

use url::Url;

use crate::http::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS, RetryPolicy};
use crate::pacing::DelayWindow;

/// Default site root.
pub const DEFAULT_BASE_URL: &str = "https://www.biorxiv.org";

/// Default path segment under which category listings live.
pub const DEFAULT_COLLECTION_PATH: &str = "collection";

/// Default politeness window between listing pages in the PDF flow (seconds).
pub const DEFAULT_DOWNLOAD_DELAY_SECS: (u64, u64) = (15, 120);

/// Default politeness window between listing pages in the metadata flow (seconds).
pub const DEFAULT_EXTRACT_DELAY_SECS: (u64, u64) = (5, 10);

/// Default body chunk size for PDF streaming (bytes).
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Errors raised while loading configuration. All of them are fatal.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The identity pool file could not be read.
    #[error("cannot read user agent file {path}: {source}")]
    Unreadable {
        /// Path that was read.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The identity pool file is not valid JSON or lacks the `user_agents` list.
    #[error("malformed user agent file {path}: {source}")]
    Malformed {
        /// Path that was parsed.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The identity pool contains no usable entries.
    #[error("user agent pool is empty")]
    EmptyPool,

    /// A politeness window has its lower bound above its upper bound.
    #[error("invalid {flow} delay window: min {min_secs}s exceeds max {max_secs}s")]
    InvalidDelayWindow {
        /// Which flow the window belongs to.
        flow: &'static str,
        /// Lower bound in seconds.
        min_secs: u64,
        /// Upper bound in seconds.
        max_secs: u64,
    },

    /// The base URL cannot carry path segments (e.g. `mailto:`), or does not parse.
    #[error("invalid base URL {url}")]
    InvalidBaseUrl {
        /// The rejected value.
        url: String,
    },

    /// Streaming chunk size must be non-zero.
    #[error("chunk size must be greater than zero")]
    ZeroChunkSize,

    /// Worker bound outside the accepted range.
    #[error("worker count {workers} outside {min}..={max}")]
    InvalidWorkerCount {
        /// The rejected value.
        workers: usize,
        /// Smallest accepted value.
        min: usize,
        /// Largest accepted value.
        max: usize,
    },
}

/// Tunables shared by both crawl flows.
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Site root used to build listing URLs and resolve relative links.
    pub base_url: Url,
    /// Path segment holding category listings, e.g. `collection`.
    pub collection_path: String,
    /// Pause window between listing pages when downloading PDFs.
    pub download_delay: DelayWindow,
    /// Pause window between listing pages when extracting metadata.
    pub extract_delay: DelayWindow,
    /// Caller-side retry policy for listing, article, and PDF fetches.
    pub retry_policy: RetryPolicy,
    /// HTTP connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// HTTP overall request timeout in seconds.
    pub read_timeout_secs: u64,
    /// Write buffer size used while streaming PDF bodies.
    pub chunk_size: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            collection_path: DEFAULT_COLLECTION_PATH.to_string(),
            download_delay: DelayWindow::from_secs(
                DEFAULT_DOWNLOAD_DELAY_SECS.0,
                DEFAULT_DOWNLOAD_DELAY_SECS.1,
            ),
            extract_delay: DelayWindow::from_secs(
                DEFAULT_EXTRACT_DELAY_SECS.0,
                DEFAULT_EXTRACT_DELAY_SECS.1,
            ),
            retry_policy: RetryPolicy::default(),
            connect_timeout_secs: CONNECT_TIMEOUT_SECS,
            read_timeout_secs: READ_TIMEOUT_SECS,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

#[allow(clippy::expect_used)]
fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("static base URL is valid")
}

impl CrawlerConfig {
    /// Replaces the site root.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if `base_url` does not parse or
    /// cannot be a base for relative links.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        let parsed = Url::parse(base_url).map_err(|_| ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(ConfigError::InvalidBaseUrl {
                url: base_url.to_string(),
            });
        }
        self.base_url = parsed;
        Ok(self)
    }

    /// Checks internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for inverted delay windows or a zero chunk size.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_window("download", self.download_delay)?;
        check_window("extract", self.extract_delay)?;
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        Ok(())
    }

    /// Builds the listing URL for one page of a category.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the base cannot take path segments.
    pub fn listing_url(&self, category: &str, page: u32) -> Result<Url, ConfigError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ConfigError::InvalidBaseUrl {
                url: self.base_url.to_string(),
            })?
            .pop_if_empty()
            .extend([self.collection_path.as_str(), category]);
        url.query_pairs_mut()
            .clear()
            .append_pair("page", &page.to_string());
        Ok(url)
    }

    /// Resolves a possibly relative href against the site root.
    #[must_use]
    pub fn resolve(&self, href: &str) -> Option<Url> {
        self.base_url.join(href.trim()).ok()
    }
}

fn check_window(flow: &'static str, window: DelayWindow) -> Result<(), ConfigError> {
    if window.is_valid() {
        Ok(())
    } else {
        Err(ConfigError::InvalidDelayWindow {
            flow,
            min_secs: window.min().as_secs(),
            max_secs: window.max().as_secs(),
        })
    }
}
