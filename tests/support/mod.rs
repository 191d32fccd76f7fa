//! Shared fixtures for end-to-end crawl tests.

#![allow(dead_code)]

use std::sync::Arc;

use crawler_core::pacing::{DelayWindow, FixedEntropy, RecordingSleeper};
use crawler_core::{Crawler, CrawlerConfig, HttpClient, RotatingFetcher, UserAgentPool};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CATEGORY: &str = "neuroscience";

/// Minimal PDF-looking payload.
pub const PDF_BYTES: &[u8] = b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj\n%%EOF\n";

/// Listing page with one `highwire-cite-linked-title` anchor per entry.
pub fn listing_html(entries: &[(&str, &str)]) -> String {
    let items: String = entries
        .iter()
        .map(|(href, title)| {
            format!(
                r#"<li class="search-result"><div class="highwire-article-citation">
                   <a class="highwire-cite-linked-title" href="{href}"><span class="highwire-cite-title">{title}</span></a>
                   </div></li>"#
            )
        })
        .collect();
    format!(r#"<html><body><div class="highwire-list"><ul>{items}</ul></div></body></html>"#)
}

/// Article page carrying all five metadata sources and a PDF link.
pub fn article_html(title: &str, doi: &str, pdf_href: &str) -> String {
    format!(
        r#"<html><head>
            <meta name="citation_title" content="{title}">
            <meta name="citation_doi" content="{doi}">
            <meta name="citation_publication_date" content="2024/06/14">
        </head><body>
            <div class="highwire-cite-authors">
                <span class="highwire-citation-author">Ada Lovelace</span>
                <span class="highwire-citation-author"><a>View ORCID Profile</a>Alan Turing</span>
            </div>
            <div class="field"><div class="field-label">Copyright&nbsp;</div>
                <div class="field-items">CC-BY 4.0 International license</div></div>
            <a class="article-dl-pdf-link" href="{pdf_href}">Download PDF</a>
        </body></html>"#
    )
}

/// Serves `body` for `/collection/{CATEGORY}?page={page}`.
pub async fn mount_listing(server: &MockServer, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/collection/{CATEGORY}")))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Serves an HTML body at `route`.
pub async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Serves raw bytes at `route`.
pub async fn mount_bytes(server: &MockServer, route: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .set_body_bytes(body.to_vec()),
        )
        .mount(server)
        .await;
}

/// Serves a status-only response at `route`.
pub async fn mount_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Crawler pointed at `server` that records pauses instead of sleeping.
pub fn crawler(server: &MockServer, sleeper: Arc<RecordingSleeper>) -> Crawler {
    let config = CrawlerConfig {
        download_delay: DelayWindow::from_secs(15, 120),
        extract_delay: DelayWindow::from_secs(5, 10),
        ..CrawlerConfig::default()
    }
    .with_base_url(&server.uri())
    .expect("mock server URI is a valid base");

    let pool = Arc::new(UserAgentPool::new(["test-agent/1.0"]).expect("pool is non-empty"));
    let fetcher = RotatingFetcher::new(HttpClient::new_with_timeouts(5, 10), pool)
        .with_entropy(Arc::new(FixedEntropy::new(0, 0.0)))
        .with_sleeper(sleeper);
    Crawler::with_fetcher(config, fetcher).expect("test config is valid")
}
