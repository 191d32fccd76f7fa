//! Listing paginator: walks a category's listing pages and yields article links.
//!
//! The sequence is lazy and finite. It ends at the inclusive page limit, on the
//! first listing page that cannot be fetched, or on the first page with no
//! article links. A politeness pause separates consecutive page fetches.

use std::sync::{Arc, LazyLock};

use futures_util::stream::{self, Stream};
use scraper::{Html, Selector};
use tracing::{debug, info, warn};

use crate::article::compile_static_selector;
use crate::config::CrawlerConfig;
use crate::fetcher::RotatingFetcher;
use crate::model::ArticleLink;
use crate::pacing::DelayWindow;

static ARTICLE_TITLE_LINK: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector("a.highwire-cite-linked-title"));

/// Article links found on one listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPage {
    /// 1-indexed page number.
    pub page: u32,
    /// Links in document order. Never empty.
    pub links: Vec<ArticleLink>,
}

/// Extracts article links from a listing page.
///
/// Anchors without an `href`, or whose `href` cannot be resolved, are skipped.
#[must_use]
pub fn parse_listing(html: &str, config: &CrawlerConfig) -> Vec<ArticleLink> {
    let document = Html::parse_document(html);
    document
        .select(&ARTICLE_TITLE_LINK)
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?;
            let url = config.resolve(href)?;
            let title = anchor.text().collect::<String>().trim().to_string();
            Some(ArticleLink { title, url })
        })
        .collect()
}

/// Walks listing pages `1..=max_pages` for one category.
#[derive(Debug, Clone)]
pub struct Paginator {
    fetcher: RotatingFetcher,
    config: Arc<CrawlerConfig>,
    delay: DelayWindow,
}

struct Cursor {
    paginator: Paginator,
    category: String,
    max_pages: u32,
    next_page: u32,
}

impl Paginator {
    /// Creates a paginator pausing for a draw from `delay` between pages.
    #[must_use]
    pub fn new(fetcher: RotatingFetcher, config: Arc<CrawlerConfig>, delay: DelayWindow) -> Self {
        Self {
            fetcher,
            config,
            delay,
        }
    }

    /// Returns the lazy page sequence. Each call starts again from page 1.
    pub fn pages(&self, category: &str, max_pages: u32) -> impl Stream<Item = ListingPage> + use<> {
        let cursor = Cursor {
            paginator: self.clone(),
            category: category.to_string(),
            max_pages,
            next_page: 1,
        };
        stream::unfold(cursor, |mut cursor| async move {
            let page = cursor.next_page;
            if page > cursor.max_pages {
                return None;
            }
            if page > 1 {
                cursor
                    .paginator
                    .delay
                    .pause(cursor.paginator.fetcher.entropy(), cursor.paginator.fetcher.sleeper())
                    .await;
            }
            let links = cursor.paginator.fetch_page(&cursor.category, page).await?;
            cursor.next_page = page + 1;
            Some((ListingPage { page, links }, cursor))
        })
    }

    /// Fetches and parses one page. `None` means pagination must stop.
    async fn fetch_page(&self, category: &str, page: u32) -> Option<Vec<ArticleLink>> {
        let url = match self.config.listing_url(category, page) {
            Ok(url) => url,
            Err(error) => {
                warn!(category, page, error = %error, "cannot build listing URL");
                return None;
            }
        };
        debug!(category, page, url = %url, "fetching listing page");

        let html = match self.fetcher.fetch_html(&url).await {
            Ok(html) => html,
            Err(error) => {
                warn!(category, page, error = %error, "listing page fetch failed, stopping");
                return None;
            }
        };

        let links = parse_listing(&html, &self.config);
        if links.is_empty() {
            info!(category, page, "no articles on listing page, stopping");
            return None;
        }
        info!(category, page, links = links.len(), "listing page parsed");
        Some(links)
    }
}
