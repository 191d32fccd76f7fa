//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crawler_core::config::{
    DEFAULT_BASE_URL, DEFAULT_DOWNLOAD_DELAY_SECS, DEFAULT_EXTRACT_DELAY_SECS,
};
use crawler_core::http::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS, RetryPolicy};
use crawler_core::pacing::DelayWindow;
use crawler_core::{ConfigError, CrawlerConfig, DEFAULT_USER_AGENT_FILE, DEFAULT_WORKERS};

/// Highest listing page number accepted for `pages`.
pub const MAX_PAGES: u32 = 4226;

/// Crawl a preprint category for PDFs or metadata.
#[derive(Parser, Debug)]
#[command(name = "preprint-crawler")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// JSON file holding the `user_agents` list
    #[arg(long, global = true, default_value = DEFAULT_USER_AGENT_FILE)]
    pub user_agents: PathBuf,

    /// Also append logs (without colors) to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Site root for listing and article pages
    #[arg(long, global = true, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Extra attempts for transient fetch failures (0-10)
    #[arg(short = 'r', long, global = true, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=10))]
    pub max_retries: u8,

    /// Lower bound of the pause between listing pages, in seconds
    #[arg(long, global = true)]
    pub min_delay: Option<u64>,

    /// Upper bound of the pause between listing pages, in seconds
    #[arg(long, global = true)]
    pub max_delay: Option<u64>,

    /// Connect timeout in seconds (1-3600)
    #[arg(long, global = true, default_value_t = CONNECT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub connect_timeout: u64,

    /// Overall request timeout in seconds (1-3600)
    #[arg(long, global = true, default_value_t = READ_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub read_timeout: u64,

    #[command(subcommand)]
    pub command: Command,
}

/// Crawl flows.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download article PDFs into a directory
    Download {
        /// Subject category, e.g. `neuroscience`
        category: String,

        /// Output directory
        #[arg(default_value = "downloaded_pdf_files")]
        output: PathBuf,

        /// Number of listing pages to crawl (1-4226)
        #[arg(default_value_t = 2, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_PAGES)))]
        pages: u32,
    },

    /// Extract article metadata into a CSV file
    Metadata {
        /// Subject category, e.g. `neuroscience`
        category: String,

        /// Output CSV file (appended to)
        #[arg(default_value = "output_metadata.csv")]
        output: PathBuf,

        /// Number of listing pages to crawl (1-4226)
        #[arg(default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_PAGES)))]
        pages: u32,

        /// Concurrent article fetches (1-10)
        #[arg(default_value_t = DEFAULT_WORKERS as u8, value_parser = clap::value_parser!(u8).range(1..=10))]
        workers: u8,
    },
}

impl Args {
    /// Builds the crawler configuration from global options.
    ///
    /// Delay overrides apply to the selected flow; an omitted bound keeps
    /// that flow's default.
    pub fn crawler_config(&self) -> Result<CrawlerConfig, ConfigError> {
        let mut config = CrawlerConfig::default().with_base_url(&self.base_url)?;
        config.retry_policy = RetryPolicy::with_max_attempts(1 + u32::from(self.max_retries));
        config.connect_timeout_secs = self.connect_timeout;
        config.read_timeout_secs = self.read_timeout;

        match self.command {
            Command::Download { .. } => {
                config.download_delay = self.delay_window(DEFAULT_DOWNLOAD_DELAY_SECS);
            }
            Command::Metadata { .. } => {
                config.extract_delay = self.delay_window(DEFAULT_EXTRACT_DELAY_SECS);
            }
        }
        config.validate()?;
        Ok(config)
    }

    fn delay_window(&self, (default_min, default_max): (u64, u64)) -> DelayWindow {
        DelayWindow::from_secs(
            self.min_delay.unwrap_or(default_min),
            self.max_delay.unwrap_or(default_max),
        )
    }
}
