//! Conditional-request cache.

use std::collections::HashMap;
use std::num::NonZeroUsize;

use hashlink::LinkedHashMap;
use serde_json::Value;

/// A cached GET response, keyed by its fully resolved URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// `etag` response header, sent back as `if-none-match`
    pub etag: Option<String>,
    /// `last-modified` response header, sent back as `if-modified-since`
    pub last_modified: Option<String>,
    /// Decoded response body
    pub payload: Option<Value>,
    /// Next page link of the response
    pub next_page: Option<String>,
}

/// Storage for [`CacheEntry`] values.
///
/// The API client serializes access behind a mutex, so implementations
/// need no interior synchronization. Eviction is the implementation's
/// business.
pub trait Cache: Send {
    /// Looks up the entry for `url`.
    fn get(&mut self, url: &str) -> Option<CacheEntry>;

    /// Stores `entry` for `url`, replacing any previous one.
    fn insert(&mut self, url: String, entry: CacheEntry);
}

/// Unbounded in-memory cache.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: HashMap<String, CacheEntry>,
}

impl MemoryCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached URLs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Cache for MemoryCache {
    fn get(&mut self, url: &str) -> Option<CacheEntry> {
        self.entries.get(url).cloned()
    }

    fn insert(&mut self, url: String, entry: CacheEntry) {
        self.entries.insert(url, entry);
    }
}

/// Bounded cache evicting the least recently used URL.
///
/// Both lookups and inserts count as a use.
#[derive(Debug)]
pub struct LruCache {
    capacity: NonZeroUsize,
    // Front is least recently used.
    entries: LinkedHashMap<String, CacheEntry>,
}

impl LruCache {
    /// Creates a cache holding at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            capacity,
            entries: LinkedHashMap::new(),
        }
    }

    /// Maximum number of entries.
    #[must_use]
    pub const fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }

    /// Number of cached URLs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if `url` is cached, without counting as a use.
    #[must_use]
    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains_key(url)
    }
}

impl Cache for LruCache {
    fn get(&mut self, url: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(url)?;
        self.entries.insert(url.to_string(), entry.clone());
        Some(entry)
    }

    fn insert(&mut self, url: String, entry: CacheEntry) {
        self.entries.remove(&url);
        self.entries.insert(url, entry);
        while self.entries.len() > self.capacity.get() {
            if let Some((evicted, _)) = self.entries.pop_front() {
                tracing::debug!(url = %evicted, "Evicted cache entry");
            }
        }
    }
}
