//! Supplementary content pipeline - URL discovery, fetch, cache, merge.
//!
//! This module provides:
//! - URL extraction and non-text extension filtering
//! - A bounded process-wide content cache shared across runs
//! - The PageExtractor trait and reqwest/scraper implementation
//! - The ContentIngestor that assembles merged prompt context

pub mod cache;
pub mod extract;
pub mod ingest;
pub mod urls;

pub use cache::{ContentCache, DEFAULT_CAPACITY};
pub use extract::{FetchError, HttpExtractor, PageContent, PageExtractor, parse_html};
pub use ingest::ContentIngestor;
pub use urls::{MAX_URLS, find_urls, has_skipped_extension};
