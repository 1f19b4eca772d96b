//! Process-wide cache of extracted page content.
//!
//! Shared by concurrent runs. Entries are write-once per URL: the first
//! result (including a failed fetch, stored as an empty string) is
//! retained until evicted by capacity pressure.

use std::collections::{HashMap, VecDeque};
use std::sync::{PoisonError, RwLock};

/// Default number of URLs retained.
pub const DEFAULT_CAPACITY: usize = 64;

struct CacheInner {
    entries: HashMap<String, String>,
    order: VecDeque<String>,
}

/// Bounded URL -> extracted-text cache.
pub struct ContentCache {
    inner: RwLock<CacheInner>,
    capacity: usize,
}

impl ContentCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a cache that holds at most `capacity` URLs.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(CacheInner {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
            capacity: capacity.max(1),
        }
    }

    /// Look up a URL. A cached failure returns `Some("")`.
    pub fn get(&self, url: &str) -> Option<String> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.entries.get(url).cloned()
    }

    /// Insert a URL's content unless one is already present, evicting
    /// the oldest entry when over capacity. Returns the stored value,
    /// so racing writers converge on the first one in.
    pub fn insert(&self, url: &str, content: String) -> String {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(existing) = inner.entries.get(url) {
            return existing.clone();
        }

        while inner.entries.len() >= self.capacity {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.entries.remove(&oldest);
                }
                None => break,
            }
        }

        inner.entries.insert(url.to_string(), content.clone());
        inner.order.push_back(url.to_string());
        content
    }

    pub fn contains(&self, url: &str) -> bool {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.entries.contains_key(url)
    }

    pub fn len(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ContentCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_miss() {
        let cache = ContentCache::new();
        assert!(cache.get("https://example.com").is_none());
    }

    #[test]
    fn test_insert_and_get() {
        let cache = ContentCache::new();
        cache.insert("https://example.com", "page text".to_string());
        assert_eq!(cache.get("https://example.com").as_deref(), Some("page text"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_first_writer_wins() {
        let cache = ContentCache::new();
        let stored = cache.insert("https://example.com", "first".to_string());
        assert_eq!(stored, "first");

        let stored = cache.insert("https://example.com", "second".to_string());
        assert_eq!(stored, "first");
        assert_eq!(cache.get("https://example.com").as_deref(), Some("first"));
    }

    #[test]
    fn test_failed_fetch_cached_as_empty() {
        let cache = ContentCache::new();
        cache.insert("https://bad.example.com", String::new());
        assert_eq!(cache.get("https://bad.example.com").as_deref(), Some(""));
    }

    #[test]
    fn test_eviction_drops_oldest() {
        let cache = ContentCache::with_capacity(2);
        cache.insert("https://a.example.com", "a".to_string());
        cache.insert("https://b.example.com", "b".to_string());
        cache.insert("https://c.example.com", "c".to_string());

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains("https://a.example.com"));
        assert!(cache.contains("https://b.example.com"));
        assert!(cache.contains("https://c.example.com"));
    }

    #[test]
    fn test_concurrent_access() {
        use std::sync::Arc;
        use std::thread;

        let cache = Arc::new(ContentCache::new());
        let mut handles = Vec::new();

        for i in 0..8 {
            let cache = Arc::clone(&cache);
            handles.push(thread::spawn(move || {
                let url = format!("https://example.com/{}", i % 2);
                cache.insert(&url, format!("content-{}", i));
                cache.get(&url)
            }));
        }

        for handle in handles {
            assert!(handle.join().unwrap().is_some());
        }
        assert_eq!(cache.len(), 2);
    }
}
