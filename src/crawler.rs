//! The two crawl flows on a shared paginator and fetcher.
//!
//! Both flows walk listing pages one at a time. The download flow handles the
//! articles of a page sequentially; the metadata flow fans them out through an
//! [`ExtractionScheduler`]. Per-article failures are logged and skipped; only
//! [`CrawlError`] aborts a crawl.

use std::path::{Path, PathBuf};
use std::pin::pin;
use std::sync::Arc;

use futures_util::StreamExt;
use tracing::{debug, info, instrument, warn};

use crate::article::ArticleResolver;
use crate::config::{ConfigError, CrawlerConfig};
use crate::download::PdfDownloader;
use crate::extract::{CsvSink, ExtractError, ExtractionScheduler, SinkError};
use crate::fetcher::RotatingFetcher;
use crate::http::HttpClient;
use crate::listing::{ListingPage, Paginator};
use crate::model::CrawlSession;
use crate::pacing::DelayWindow;
use crate::user_agent::UserAgentPool;

/// Errors that abort a crawl. Per-article fetch failures never surface here.
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The PDF output directory could not be created.
    #[error("cannot create output directory {path}: {source}")]
    OutputDir {
        /// Directory path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The CSV output could not be opened.
    #[error(transparent)]
    Sink(#[from] SinkError),

    /// A metadata batch was aborted.
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Outcome of one crawl invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Category crawled.
    pub category: String,
    /// Listing pages that yielded articles.
    pub pages_visited: u32,
    /// Articles downloaded or extracted.
    pub article_count: usize,
    /// Human-readable completion message.
    pub message: String,
}

impl CrawlSummary {
    fn downloaded(session: &CrawlSession) -> Self {
        Self {
            category: session.category.clone(),
            pages_visited: session.current_page,
            article_count: session.article_count,
            message: format!(
                "Downloaded {} article of category '{}'",
                session.article_count, session.category
            ),
        }
    }

    fn extracted(session: &CrawlSession, csv_path: &Path) -> Self {
        Self {
            category: session.category.clone(),
            pages_visited: session.current_page,
            article_count: session.article_count,
            message: format!(
                "Data extraction completed. Output saved to {}",
                csv_path.display()
            ),
        }
    }
}

/// Runs the download and metadata flows against one site.
#[derive(Debug, Clone)]
pub struct Crawler {
    config: Arc<CrawlerConfig>,
    fetcher: RotatingFetcher,
}

impl Crawler {
    /// Builds a crawler with a fresh HTTP client and production randomness.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` fails validation.
    pub fn new(
        config: CrawlerConfig,
        identities: Arc<UserAgentPool>,
    ) -> Result<Self, ConfigError> {
        let client =
            HttpClient::new_with_timeouts(config.connect_timeout_secs, config.read_timeout_secs);
        let fetcher =
            RotatingFetcher::new(client, identities).with_retry_policy(config.retry_policy.clone());
        Self::with_fetcher(config, fetcher)
    }

    /// Builds a crawler around an existing fetcher.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` fails validation.
    pub fn with_fetcher(
        config: CrawlerConfig,
        fetcher: RotatingFetcher,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            fetcher,
        })
    }

    fn paginator(&self, delay: DelayWindow) -> Paginator {
        Paginator::new(self.fetcher.clone(), Arc::clone(&self.config), delay)
    }

    fn resolver(&self) -> ArticleResolver {
        ArticleResolver::new(self.fetcher.clone(), self.config.base_url.clone())
    }

    /// Downloads the PDFs of up to `max_pages` listing pages into `output_dir`.
    ///
    /// Articles without a PDF link, or whose page or PDF cannot be fetched,
    /// are skipped. The summary counts successful downloads only.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::OutputDir`] if the output directory cannot be created.
    #[instrument(skip(self, output_dir), fields(output_dir = %output_dir.display()))]
    pub async fn download_category(
        &self,
        category: &str,
        output_dir: &Path,
        max_pages: u32,
    ) -> Result<CrawlSummary, CrawlError> {
        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|source| CrawlError::OutputDir {
                path: output_dir.to_path_buf(),
                source,
            })?;

        let downloader = PdfDownloader::new(self.fetcher.client().clone(), self.config.chunk_size);
        let resolver = self.resolver();
        let mut session = CrawlSession::new(category, max_pages);
        let paginator = self.paginator(self.config.download_delay);
        let mut pages = pin!(paginator.pages(category, max_pages));

        while let Some(ListingPage { page, links }) = pages.next().await {
            session.enter_page(page);
            let mut downloaded = 0;
            for link in &links {
                let target = match resolver.resolve_pdf(link).await {
                    Ok(Some(target)) => target,
                    Ok(None) => {
                        debug!(title = %link.title, "skipping article without PDF");
                        continue;
                    }
                    Err(error) => {
                        warn!(
                            url = %link.url,
                            error = %error,
                            "skipping article, page fetch failed"
                        );
                        continue;
                    }
                };
                match self.fetcher.fetch_pdf(&downloader, &target, output_dir).await {
                    Ok(_) => downloaded += 1,
                    Err(error) => {
                        warn!(
                            url = %target.pdf_url,
                            error = %error,
                            "skipping article, PDF download failed"
                        );
                    }
                }
            }
            session.record_articles(downloaded);
            info!(page, downloaded, total = session.article_count, "page processed");
        }

        Ok(CrawlSummary::downloaded(&session))
    }

    /// Extracts metadata for up to `max_pages` listing pages into `csv_path`.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError`] for an invalid worker bound or a CSV sink failure.
    #[instrument(skip(self, csv_path), fields(csv = %csv_path.display()))]
    pub async fn extract_category(
        &self,
        category: &str,
        csv_path: &Path,
        max_pages: u32,
        workers: usize,
    ) -> Result<CrawlSummary, CrawlError> {
        let scheduler = ExtractionScheduler::new(self.resolver(), workers)?;
        let sink = Arc::new(CsvSink::open(csv_path)?);
        let mut session = CrawlSession::new(category, max_pages);
        let paginator = self.paginator(self.config.extract_delay);
        let mut pages = pin!(paginator.pages(category, max_pages));

        while let Some(ListingPage { page, links }) = pages.next().await {
            session.enter_page(page);
            let written = scheduler.run_batch(&links, &sink).await?;
            session.record_articles(written);
            info!(
                page,
                written,
                workers = scheduler.workers(),
                total = session.article_count,
                "page processed"
            );
        }

        Ok(CrawlSummary::extracted(&session, csv_path))
    }
}
