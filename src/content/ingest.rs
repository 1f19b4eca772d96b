//! Supplementary content ingestion.
//!
//! Turns free-form user input that may embed URLs into a single merged
//! context string. Ingestion never fails the run: every per-URL problem
//! degrades to an empty contribution for that URL.

use std::sync::Arc;

use log::{debug, warn};

use super::cache::ContentCache;
use super::extract::{PageContent, PageExtractor};
use super::urls::find_urls;
use crate::llm::truncate_to_tokens;

/// Assembles prompt context from raw supplementary input.
pub struct ContentIngestor {
    extractor: Arc<dyn PageExtractor>,
    cache: Arc<ContentCache>,
    /// Token budget per fetched page; None disables truncation
    token_limit: Option<usize>,
}

impl ContentIngestor {
    pub fn new(extractor: Arc<dyn PageExtractor>, cache: Arc<ContentCache>) -> Self {
        Self {
            extractor,
            cache,
            token_limit: None,
        }
    }

    /// Set the per-page token budget.
    pub fn with_token_limit(mut self, limit: Option<usize>) -> Self {
        self.token_limit = limit;
        self
    }

    /// Ingest raw input: fetch (or reuse) each embedded URL's content,
    /// then append the original text with whitespace collapsed.
    pub async fn ingest(&self, raw: &str) -> String {
        let mut merged = String::new();

        for url in find_urls(raw) {
            let content = match self.cache.get(&url) {
                Some(cached) => {
                    debug!("cache hit for {}", url);
                    cached
                }
                None => {
                    let fetched = self.fetch_one(&url).await;
                    self.cache.insert(&url, fetched)
                }
            };

            if !content.is_empty() {
                merged.push_str(&format!("source: {}\n{}\n\n", url, content));
            }
        }

        merged.push_str(&collapse_whitespace(raw));
        merged
    }

    /// Fetch a single URL, degrading every failure to an empty string.
    async fn fetch_one(&self, url: &str) -> String {
        match self.extractor.fetch(url).await {
            Ok(page) if page.status == 200 && !page.markdown.trim().is_empty() => {
                let text = render_page(&page);
                match self.token_limit {
                    Some(limit) => truncate_to_tokens(&text, limit),
                    None => text,
                }
            }
            Ok(page) => {
                warn!("fetch of {} returned status {} with empty content", url, page.status);
                String::new()
            }
            Err(e) => {
                warn!("fetch of {} failed: {}", url, e);
                String::new()
            }
        }
    }
}

/// Render a fetched page as header lines followed by the body.
fn render_page(page: &PageContent) -> String {
    let mut text = String::new();
    if !page.title.is_empty() {
        text.push_str(&format!("title: {}\n", page.title));
    }
    if !page.description.is_empty() {
        text.push_str(&format!("description: {}\n", page.description));
    }
    text.push_str(page.markdown.trim());
    text
}

/// Collapse internal whitespace to single spaces.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::extract::FetchError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock extractor serving a fixed page and counting calls.
    struct MockExtractor {
        page: PageContent,
        calls: AtomicUsize,
        fail: bool,
    }

    impl MockExtractor {
        fn serving(page: PageContent) -> Self {
            Self {
                page,
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                page: PageContent::default(),
                calls: AtomicUsize::new(0),
                fail: true,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PageExtractor for MockExtractor {
        async fn fetch(&self, _url: &str) -> Result<PageContent, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(FetchError::TooLarge { size: 1, max: 0 })
            } else {
                Ok(self.page.clone())
            }
        }
    }

    fn ok_page() -> PageContent {
        PageContent {
            status: 200,
            title: "Paris".to_string(),
            description: "Capital of France".to_string(),
            markdown: "Paris is the capital and largest city of France.".to_string(),
        }
    }

    fn ingestor(extractor: Arc<MockExtractor>) -> ContentIngestor {
        ContentIngestor::new(extractor, Arc::new(ContentCache::new()))
    }

    #[tokio::test]
    async fn test_ingest_plain_text_collapses_whitespace() {
        let extractor = Arc::new(MockExtractor::serving(ok_page()));
        let ingestor = ingestor(Arc::clone(&extractor));

        let merged = ingestor.ingest("多行\n  輸入   文字").await;
        assert_eq!(merged, "多行 輸入 文字");
        assert_eq!(extractor.calls(), 0);
    }

    #[tokio::test]
    async fn test_ingest_builds_source_block() {
        let extractor = Arc::new(MockExtractor::serving(ok_page()));
        let ingestor = ingestor(Arc::clone(&extractor));

        let merged = ingestor.ingest("參考 https://example.com/paris 的內容").await;
        assert!(merged.starts_with("source: https://example.com/paris\n"));
        assert!(merged.contains("title: Paris"));
        assert!(merged.contains("description: Capital of France"));
        assert!(merged.contains("largest city of France"));
        assert!(merged.ends_with("參考 https://example.com/paris 的內容"));
    }

    #[tokio::test]
    async fn test_ingest_idempotent_and_fetches_once() {
        let extractor = Arc::new(MockExtractor::serving(ok_page()));
        let ingestor = ingestor(Arc::clone(&extractor));

        let input = "see https://example.com/paris";
        let first = ingestor.ingest(input).await;
        let second = ingestor.ingest(input).await;

        assert_eq!(first, second);
        assert_eq!(extractor.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_degrades_and_is_not_retried() {
        let extractor = Arc::new(MockExtractor::failing());
        let ingestor = ingestor(Arc::clone(&extractor));

        let input = "see https://bad.example.com/page";
        let merged = ingestor.ingest(input).await;
        assert_eq!(merged, "see https://bad.example.com/page");

        // Known-bad URL must not be fetched again this process
        ingestor.ingest(input).await;
        assert_eq!(extractor.calls(), 1);
    }

    #[tokio::test]
    async fn test_non_200_degrades_to_empty() {
        let page = PageContent {
            status: 404,
            markdown: "Not Found".to_string(),
            ..Default::default()
        };
        let extractor = Arc::new(MockExtractor::serving(page));
        let ingestor = ingestor(Arc::clone(&extractor));

        let merged = ingestor.ingest("see https://example.com/missing").await;
        assert_eq!(merged, "see https://example.com/missing");
    }

    #[tokio::test]
    async fn test_token_limit_truncates_keeping_prefix() {
        let page = PageContent {
            status: 200,
            title: String::new(),
            description: String::new(),
            markdown: "word ".repeat(1000),
        };
        let extractor = Arc::new(MockExtractor::serving(page));
        let ingestor = ContentIngestor::new(extractor, Arc::new(ContentCache::new()))
            .with_token_limit(Some(10));

        let merged = ingestor.ingest("see https://example.com/long").await;
        let block = merged
            .strip_prefix("source: https://example.com/long\n")
            .unwrap();
        let content_len = block.find("\n\n").unwrap();
        assert!(content_len <= 40, "content was {} bytes", content_len);
        assert!(block.starts_with("word "));
    }

    #[tokio::test]
    async fn test_binary_urls_never_fetched() {
        let extractor = Arc::new(MockExtractor::serving(ok_page()));
        let ingestor = ingestor(Arc::clone(&extractor));

        ingestor.ingest("see https://example.com/slides.pdf").await;
        assert_eq!(extractor.calls(), 0);
    }
}
