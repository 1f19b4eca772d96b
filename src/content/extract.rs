//! Web page fetching and text extraction.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Node, Selector};

/// Maximum response body size (5 MB)
const MAX_BODY_SIZE: usize = 5 * 1024 * 1024;

/// Extracted page: HTTP status plus the metadata and body text the
/// ingestion pipeline assembles into a source block.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    pub status: u16,
    pub title: String,
    pub description: String,
    pub markdown: String,
}

/// Errors from a single page fetch. Always caught by the ingestor and
/// degraded to an empty contribution for that URL.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Response too large: {size} bytes (max: {max})")]
    TooLarge { size: usize, max: usize },
}

/// Web content extraction service.
#[async_trait]
pub trait PageExtractor: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<PageContent, FetchError>;
}

/// reqwest-backed extractor that turns HTML into plain text.
pub struct HttpExtractor {
    client: Client,
}

impl HttpExtractor {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageExtractor for HttpExtractor {
    async fn fetch(&self, url: &str) -> Result<PageContent, FetchError> {
        let response = self
            .client
            .get(url)
            .header("User-Agent", "anneal/0.1 (content ingestion)")
            .send()
            .await?;

        let status = response.status().as_u16();

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = response.bytes().await?;
        if body.len() > MAX_BODY_SIZE {
            return Err(FetchError::TooLarge {
                size: body.len(),
                max: MAX_BODY_SIZE,
            });
        }

        let body_str = String::from_utf8_lossy(&body);

        let page = if content_type.contains("text/html") || content_type.contains("application/xhtml") {
            let mut page = parse_html(&body_str);
            page.status = status;
            page
        } else {
            PageContent {
                status,
                title: String::new(),
                description: String::new(),
                markdown: body_str.trim().to_string(),
            }
        };

        Ok(page)
    }
}

/// Pull title, meta description, and readable body text out of HTML.
pub fn parse_html(html: &str) -> PageContent {
    let document = Html::parse_document(html);

    // Hard-coded selectors; a failure here is a programming error
    let title_sel = Selector::parse("title").unwrap();
    let desc_sel = Selector::parse("meta[name=\"description\"]").unwrap();
    let body_sel = Selector::parse("body").unwrap();

    let title = document
        .select(&title_sel)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    let description = document
        .select(&desc_sel)
        .next()
        .and_then(|m| m.value().attr("content"))
        .unwrap_or_default()
        .trim()
        .to_string();

    let root = document
        .select(&body_sel)
        .next()
        .unwrap_or_else(|| document.root_element());

    PageContent {
        status: 0,
        title,
        description,
        markdown: readable_text(root),
    }
}

/// Collect the visible text of an element subtree, skipping script,
/// style, and similar non-content tags.
fn readable_text(root: ElementRef) -> String {
    let mut out = String::new();
    collect_text(root, &mut out);
    collapse_runs(&out)
}

fn collect_text(element: ElementRef, out: &mut String) {
    const SKIP_TAGS: [&str; 4] = ["script", "style", "noscript", "svg"];

    if SKIP_TAGS.contains(&element.value().name()) {
        return;
    }

    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let t = text.trim();
                if !t.is_empty() {
                    out.push_str(t);
                    out.push(' ');
                }
            }
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, out);
                }
            }
            _ => {}
        }
    }
}

/// Collapse whitespace runs into single spaces.
fn collapse_runs(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
