//! Records passed between the paginator, resolver, and output sinks.

use serde::Serialize;
use url::Url;

use crate::download::pdf_filename;

/// Placeholder written for any metadata field whose source element is absent.
pub const NOT_AVAILABLE: &str = "N/A";

/// CSV header row, in record field order.
pub const CSV_HEADER: [&str; 5] = ["Paper Title", "DOI", "Authors", "Posted", "Copyright"];

/// A link to one article found on a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleLink {
    /// Anchor text, trimmed.
    pub title: String,
    /// Absolute article page URL.
    pub url: Url,
}

/// Bibliographic metadata for one article, in fixed column order.
///
/// Every field is always populated; absent sources become [`NOT_AVAILABLE`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleRecord {
    /// `citation_title` meta content.
    #[serde(rename = "Paper Title")]
    pub title: String,
    /// `citation_doi` meta content.
    #[serde(rename = "DOI")]
    pub identifier: String,
    /// Author names joined with `", "`.
    #[serde(rename = "Authors")]
    pub authors: String,
    /// `citation_publication_date` meta content.
    #[serde(rename = "Posted")]
    pub posted_date: String,
    /// Text of the field following the first "Copyright" label.
    #[serde(rename = "Copyright")]
    pub license_text: String,
}

impl ArticleRecord {
    /// Builds a record, replacing each missing field with [`NOT_AVAILABLE`].
    #[must_use]
    pub fn from_parts(
        title: Option<String>,
        identifier: Option<String>,
        authors: Option<String>,
        posted_date: Option<String>,
        license_text: Option<String>,
    ) -> Self {
        let or_na = |value: Option<String>| value.unwrap_or_else(|| NOT_AVAILABLE.to_string());
        Self {
            title: or_na(title),
            identifier: or_na(identifier),
            authors: or_na(authors),
            posted_date: or_na(posted_date),
            license_text: or_na(license_text),
        }
    }

    /// Fields as a row, in CSV column order.
    #[must_use]
    pub fn as_row(&self) -> [&str; 5] {
        [
            self.title.as_str(),
            self.identifier.as_str(),
            self.authors.as_str(),
            self.posted_date.as_str(),
            self.license_text.as_str(),
        ]
    }
}

/// Where a PDF comes from and the file name it is saved under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    /// Absolute PDF URL.
    pub pdf_url: Url,
    /// Sanitized `<title prefix>.pdf` name; never contains a path separator.
    pub filename: String,
}

impl DownloadTarget {
    /// Derives the file name from the article title.
    #[must_use]
    pub fn new(pdf_url: Url, title: &str) -> Self {
        Self {
            pdf_url,
            filename: pdf_filename(title),
        }
    }
}

/// Progress of one crawl invocation. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSession {
    /// Category being crawled.
    pub category: String,
    /// Last listing page handed to the flow (0 before the first page).
    pub current_page: u32,
    /// Inclusive page limit.
    pub max_pages: u32,
    /// Articles successfully downloaded or extracted so far.
    pub article_count: usize,
}

impl CrawlSession {
    /// Starts a session before the first page.
    #[must_use]
    pub fn new(category: impl Into<String>, max_pages: u32) -> Self {
        Self {
            category: category.into(),
            current_page: 0,
            max_pages,
            article_count: 0,
        }
    }

    /// Marks `page` as the page being processed.
    pub fn enter_page(&mut self, page: u32) {
        self.current_page = page;
    }

    /// Adds successfully handled articles to the running count.
    pub fn record_articles(&mut self, count: usize) {
        self.article_count += count;
    }
}
