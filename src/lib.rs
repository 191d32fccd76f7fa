//! Preprint Crawler Core Library
//!
//! Crawls a paginated preprint listing site and, for each article, either
//! downloads its PDF or extracts its bibliographic metadata into a CSV file.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`user_agent`] - User-Agent pool loaded once and rotated per request
//! - [`pacing`] - Injectable randomness, sleeping, and politeness windows
//! - [`http`] - HTTP fetcher, typed fetch errors, caller-side retry
//! - [`fetcher`] - Identity rotation and retry wrapped around the client
//! - [`listing`] - Listing paginator yielding article links per page
//! - [`article`] - PDF-link and metadata extraction from article pages
//! - [`download`] - Streaming PDF writer and file name derivation
//! - [`extract`] - Bounded concurrent extraction into a CSV sink
//! - [`crawler`] - The download and metadata flows
//! - [`config`] / [`model`] - Configuration and shared records

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod article;
pub mod config;
pub mod crawler;
pub mod download;
pub mod extract;
pub mod fetcher;
pub mod http;
pub mod listing;
pub mod model;
pub mod pacing;
pub mod user_agent;

// Re-export commonly used types
pub use article::ArticleResolver;
pub use config::{ConfigError, CrawlerConfig};
pub use crawler::{CrawlError, CrawlSummary, Crawler};
pub use download::PdfDownloader;
pub use extract::{CsvSink, DEFAULT_WORKERS, ExtractError, ExtractionScheduler, SinkError};
pub use fetcher::RotatingFetcher;
pub use http::{FetchError, HttpClient, RetryPolicy};
pub use listing::{ListingPage, Paginator};
pub use model::{ArticleLink, ArticleRecord, CrawlSession, DownloadTarget, NOT_AVAILABLE};
pub use user_agent::{DEFAULT_USER_AGENT_FILE, UserAgentPool};
