//! URL discovery and filtering for supplementary input.

use regex::Regex;

/// At most this many URLs are considered per input.
pub const MAX_URLS: usize = 3;

/// Path extensions that are never fetched (binary or non-text formats).
const SKIPPED_EXTENSIONS: [&str; 16] = [
    ".jpg", ".jpeg", ".png", ".gif", ".webp", ".svg", ".pdf", ".doc", ".docx", ".xls", ".xlsx",
    ".ppt", ".pptx", ".zip", ".tar", ".gz",
];

/// Extract fetchable URLs from free text: the first MAX_URLS matches,
/// minus any with a skipped extension.
pub fn find_urls(text: &str) -> Vec<String> {
    // Hard-coded pattern; a failure here is a programming error
    let re = Regex::new(r#"https?://[^\s<>"'\)\]]+"#).unwrap();

    re.find_iter(text)
        .take(MAX_URLS)
        .map(|m| m.as_str().trim_end_matches(['.', ',', '，', '。']).to_string())
        .filter(|url| !has_skipped_extension(url))
        .collect()
}

/// Check whether the URL's path ends in a known non-text extension.
pub fn has_skipped_extension(url: &str) -> bool {
    // Extensions are judged on the path, not the query string
    let path = url
        .split(['?', '#'])
        .next()
        .unwrap_or(url)
        .to_ascii_lowercase();

    SKIPPED_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}
