//! Article page resolution: the PDF link profile and the metadata profile.
//!
//! Parsing is synchronous and works on the already-fetched HTML text, so the
//! parsed document never lives across an await point.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::fetcher::RotatingFetcher;
use crate::http::FetchError;
use crate::model::{ArticleLink, ArticleRecord, DownloadTarget};

/// Boilerplate appended to author names that carry an ORCID badge.
pub const ORCID_BOILERPLATE: &str = "View ORCID Profile";

/// Compiles a selector at static init; panics on invalid pattern.
pub(crate) fn compile_static_selector(pattern: &str) -> Selector {
    Selector::parse(pattern).unwrap_or_else(|e| panic!("invalid static selector '{pattern}': {e}"))
}

static PDF_LINK: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector("a.article-dl-pdf-link"));
static META_TITLE: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector(r#"meta[name="citation_title"]"#));
static META_DOI: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector(r#"meta[name="citation_doi"]"#));
static META_POSTED: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector(r#"meta[name="citation_publication_date"]"#));
static AUTHORS_CONTAINER: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector("div.highwire-cite-authors"));
static AUTHOR: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector("span.highwire-citation-author"));
static FIELD_LABEL: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector("div.field-label"));
static FIELD_ITEMS: LazyLock<Selector> =
    LazyLock::new(|| compile_static_selector("div.field-items"));

/// Finds the "download PDF" anchor and resolves it against `base`.
///
/// Returns `None` when the page has no such anchor; that is a skip, not an error.
#[must_use]
pub fn find_pdf_link(html: &str, base: &Url) -> Option<Url> {
    let document = Html::parse_document(html);
    let href = document
        .select(&PDF_LINK)
        .next()
        .and_then(|anchor| anchor.value().attr("href"))?;
    base.join(href.trim()).ok()
}

/// Reads the five metadata fields; each missing source degrades to `N/A`.
#[must_use]
pub fn extract_record(html: &str) -> ArticleRecord {
    let document = Html::parse_document(html);
    ArticleRecord::from_parts(
        meta_content(&document, &META_TITLE),
        meta_content(&document, &META_DOI),
        authors(&document),
        meta_content(&document, &META_POSTED),
        license_text(&document),
    )
}

fn meta_content(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .map(str::to_string)
}

fn authors(document: &Html) -> Option<String> {
    let container = document.select(&AUTHORS_CONTAINER).next()?;
    let names: Vec<String> = container
        .select(&AUTHOR)
        .map(|author| {
            let raw = author.text().collect::<Vec<_>>().join(" ");
            raw.replace(ORCID_BOILERPLATE, "")
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|name| !name.is_empty())
        .collect();
    if names.is_empty() {
        return None;
    }
    Some(names.join(", "))
}

fn license_text(document: &Html) -> Option<String> {
    let label = document
        .select(&FIELD_LABEL)
        .find(|label| label.text().collect::<String>().contains("Copyright"))?;
    label
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| FIELD_ITEMS.matches(sibling))
        .map(|items| items.text().collect::<String>().trim().to_string())
}

/// Fetches article pages and applies one of the two extraction profiles.
#[derive(Debug, Clone)]
pub struct ArticleResolver {
    fetcher: RotatingFetcher,
    base_url: Url,
}

impl ArticleResolver {
    /// Creates a resolver that resolves relative links against `base_url`.
    #[must_use]
    pub fn new(fetcher: RotatingFetcher, base_url: Url) -> Self {
        Self { fetcher, base_url }
    }

    /// Resolves the PDF download target for an article.
    ///
    /// `Ok(None)` means the page has no PDF link.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the article page cannot be fetched.
    #[instrument(skip(self, link), fields(url = %link.url))]
    pub async fn resolve_pdf(
        &self,
        link: &ArticleLink,
    ) -> Result<Option<DownloadTarget>, FetchError> {
        let html = self.fetcher.fetch_html(&link.url).await?;
        let Some(pdf_url) = find_pdf_link(&html, &self.base_url) else {
            debug!(title = %link.title, "no PDF link on article page");
            return Ok(None);
        };
        Ok(Some(DownloadTarget::new(pdf_url, &link.title)))
    }

    /// Resolves the metadata record for an article.
    ///
    /// A failed fetch yields `None`; a partially filled record is never produced.
    #[instrument(skip(self, url), fields(url = %url))]
    pub async fn resolve_record(&self, url: &Url) -> Option<ArticleRecord> {
        match self.fetcher.fetch_html(url).await {
            Ok(html) => Some(extract_record(&html)),
            Err(error) => {
                warn!(error = %error, "failed to retrieve article page");
                None
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::NOT_AVAILABLE;

    const FULL_PAGE: &str = r#"
        <html><head>
            <meta name="citation_title" content="Studying time-resolved functional connectivity via communication theory">
            <meta name="citation_doi" content="10.1101/2024.06.12.598720">
            <meta name="citation_publication_date" content="2024/01/01">
        </head><body>
            <div class="highwire-cite-authors">
                <span class="highwire-citation-author"><span class="nlm-given-names">Sir-Lord</span> <span class="nlm-surname">Wiafe</span></span>
                <span class="highwire-citation-author"><a class="orcid">View ORCID Profile</a><span class="nlm-given-names">Nana</span> <span class="nlm-surname">Asante</span></span>
                <span class="highwire-citation-author">Vince Calhoun</span>
            </div>
            <div class="field field-name-license">
                <div class="field-label">Copyright&nbsp;</div>
                <div class="field-items">
                    The copyright holder for this preprint is the author/funder. It is made available under a CC-BY-NC-ND 4.0 International license.
                </div>
            </div>
            <div class="field">
                <div class="field-label">Copyright again</div>
                <div class="field-items">second match must be ignored</div>
            </div>
            <a class="article-dl-pdf-link" href="/content/10.1101/2024.06.12.598720v3.full.pdf">Download PDF</a>
        </body></html>
    "#;

    fn base() -> Url {
        Url::parse("https://www.biorxiv.org").unwrap()
    }

    #[test]
    fn test_extract_record_all_fields() {
        let record = extract_record(FULL_PAGE);
        assert_eq!(
            record.title,
            "Studying time-resolved functional connectivity via communication theory"
        );
        assert_eq!(record.identifier, "10.1101/2024.06.12.598720");
        assert_eq!(record.posted_date, "2024/01/01");
        assert_eq!(
            record.license_text,
            "The copyright holder for this preprint is the author/funder. It is made available under a CC-BY-NC-ND 4.0 International license."
        );
    }

    #[test]
    fn test_authors_strip_orcid_and_keep_order() {
        let record = extract_record(FULL_PAGE);
        assert_eq!(record.authors, "Sir-Lord Wiafe, Nana Asante, Vince Calhoun");
    }

    #[test]
    fn test_authors_blank_after_stripping_are_dropped() {
        let html = r#"
            <div class="highwire-cite-authors">
                <span class="highwire-citation-author"><a>View ORCID Profile</a></span>
                <span class="highwire-citation-author">Ada Lovelace</span>
                <span class="highwire-citation-author">   </span>
            </div>
        "#;
        assert_eq!(extract_record(html).authors, "Ada Lovelace");
    }

    #[test]
    fn test_authors_all_blank_is_sentinel() {
        let html = r#"
            <div class="highwire-cite-authors">
                <span class="highwire-citation-author"></span>
                <span class="highwire-citation-author"><a>View ORCID Profile</a></span>
            </div>
        "#;
        assert_eq!(extract_record(html).authors, NOT_AVAILABLE);
    }

    #[test]
    fn test_each_missing_field_is_sentinel() {
        let record = extract_record("<html><body><p>nothing here</p></body></html>");
        for field in record.as_row() {
            assert_eq!(field, NOT_AVAILABLE);
        }
    }

    #[test]
    fn test_missing_fields_are_independent() {
        let html = r#"<html><head><meta name="citation_doi" content="10.1101/x"></head></html>"#;
        let record = extract_record(html);
        assert_eq!(record.title, NOT_AVAILABLE);
        assert_eq!(record.identifier, "10.1101/x");
        assert_eq!(record.authors, NOT_AVAILABLE);
        assert_eq!(record.posted_date, NOT_AVAILABLE);
        assert_eq!(record.license_text, NOT_AVAILABLE);
    }

    #[test]
    fn test_empty_author_container_is_sentinel() {
        let html = r#"<div class="highwire-cite-authors"></div>"#;
        assert_eq!(extract_record(html).authors, NOT_AVAILABLE);
    }

    #[test]
    fn test_meta_without_content_is_sentinel() {
        let html = r#"<meta name="citation_title">"#;
        assert_eq!(extract_record(html).title, NOT_AVAILABLE);
    }

    #[test]
    fn test_copyright_label_without_items_sibling_is_sentinel() {
        let html = r#"
            <div><div class="field-label">Copyright</div></div>
            <div><div class="field-label">Copyright</div><div class="field-items">later</div></div>
        "#;
        // First matching label wins even when it has no value.
        assert_eq!(extract_record(html).license_text, NOT_AVAILABLE);
    }

    #[test]
    fn test_copyright_items_need_not_be_adjacent() {
        let html = r#"
            <div>
                <div class="field-label">Copyright</div>
                <span>spacer</span>
                <div class="field-items">CC-BY 4.0</div>
            </div>
        "#;
        assert_eq!(extract_record(html).license_text, "CC-BY 4.0");
    }

    #[test]
    fn test_non_copyright_labels_skipped() {
        let html = r#"
            <div><div class="field-label">Funding</div><div class="field-items">NIH</div></div>
            <div><div class="field-label">Copyright</div><div class="field-items">CC0</div></div>
        "#;
        assert_eq!(extract_record(html).license_text, "CC0");
    }

    #[test]
    fn test_find_pdf_link_resolves_relative_href() {
        let url = find_pdf_link(FULL_PAGE, &base()).unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.biorxiv.org/content/10.1101/2024.06.12.598720v3.full.pdf"
        );
    }

    #[test]
    fn test_find_pdf_link_absent() {
        assert!(find_pdf_link("<a href='/x.pdf'>plain link</a>", &base()).is_none());
    }

    #[test]
    fn test_find_pdf_link_without_href() {
        assert!(find_pdf_link(r#"<a class="article-dl-pdf-link">PDF</a>"#, &base()).is_none());
    }
}
