//! Bounded fan-out of metadata extraction over one listing page.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use super::ExtractError;
use super::sink::CsvSink;
use crate::article::ArticleResolver;
use crate::config::ConfigError;
use crate::model::ArticleLink;

/// Minimum worker bound.
pub const MIN_WORKERS: usize = 1;

/// Maximum worker bound.
pub const MAX_WORKERS: usize = 10;

/// Default worker bound.
pub const DEFAULT_WORKERS: usize = 10;

/// Resolves article records with at most `workers` fetches in flight.
///
/// Each completed record is appended to the sink as soon as its task finishes,
/// so rows land in completion order. A batch returns only once every task of
/// the page has finished; nothing overlaps across pages.
#[derive(Debug, Clone)]
pub struct ExtractionScheduler {
    resolver: ArticleResolver,
    workers: usize,
}

impl ExtractionScheduler {
    /// Creates a scheduler with a validated worker bound.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidWorkerCount`] outside `1..=10`.
    pub fn new(resolver: ArticleResolver, workers: usize) -> Result<Self, ConfigError> {
        if !(MIN_WORKERS..=MAX_WORKERS).contains(&workers) {
            return Err(ConfigError::InvalidWorkerCount {
                workers,
                min: MIN_WORKERS,
                max: MAX_WORKERS,
            });
        }
        Ok(Self { resolver, workers })
    }

    /// Configured worker bound.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Extracts every link of one page and returns the number of rows written.
    ///
    /// A failed article fetch yields no row and does not affect the others.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError`] if the sink rejects a row; remaining tasks are aborted.
    #[instrument(skip(self, links, sink), fields(links = links.len(), workers = self.workers))]
    pub async fn run_batch(
        &self,
        links: &[ArticleLink],
        sink: &Arc<CsvSink>,
    ) -> Result<usize, ExtractError> {
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut tasks = JoinSet::new();

        for link in links {
            let resolver = self.resolver.clone();
            let sink = Arc::clone(sink);
            let semaphore = Arc::clone(&semaphore);
            let url = link.url.clone();

            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| ExtractError::SemaphoreClosed)?;
                let Some(record) = resolver.resolve_record(&url).await else {
                    return Ok(false);
                };
                sink.append(&record)?;
                debug!(url = %url, title = %record.title, "row written");
                Ok::<bool, ExtractError>(true)
            });
        }

        let mut written = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(true)) => written += 1,
                Ok(Ok(false)) => {}
                Ok(Err(error)) => {
                    tasks.abort_all();
                    return Err(error);
                }
                Err(error) => warn!(error = %error, "extraction task panicked"),
            }
        }

        info!(written, "extraction batch finished");
        Ok(written)
    }
}
