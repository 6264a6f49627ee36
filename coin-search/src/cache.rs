//! In-memory cache of verified result sets.
//!
//! Stores the full verified set for a (query, engines, count) triple
//! *before* shuffling and truncation, so a cache hit is reshuffled like a
//! fresh run. Backed by [`moka`] with a TTL; owned by one aggregator rather
//! than shared process-wide.

use std::time::Duration;

use moka::future::Cache;

use crate::types::{SearchEngine, SearchResult};

/// Maximum number of cached result sets.
const MAX_CACHE_ENTRIES: u64 = 100;

/// Composite cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Lowercased, whitespace-collapsed query.
    query: String,
    /// Engines in sorted order.
    engines: Vec<SearchEngine>,
    /// Hits requested per engine.
    count: usize,
}

impl CacheKey {
    /// Build a key that ignores query case/spacing and engine order.
    pub fn new(query: &str, engines: &[SearchEngine], count: usize) -> Self {
        let query = crate::text::clean_text(query).to_lowercase();
        let mut engines = engines.to_vec();
        engines.sort_by_key(|engine| engine.name());
        engines.dedup();
        Self {
            query,
            engines,
            count,
        }
    }
}

/// TTL cache of verified, unshuffled result sets.
#[derive(Clone)]
pub struct ResultCache {
    inner: Cache<CacheKey, Vec<SearchResult>>,
}

impl ResultCache {
    /// Create a cache with the given TTL. Returns `None` for a zero TTL.
    pub fn new(ttl_seconds: u64) -> Option<Self> {
        if ttl_seconds == 0 {
            return None;
        }
        let inner = Cache::builder()
            .max_capacity(MAX_CACHE_ENTRIES)
            .time_to_live(Duration::from_secs(ttl_seconds))
            .build();
        Some(Self { inner })
    }

    /// Cached verified set for `key`, if present and fresh.
    pub async fn get(&self, key: &CacheKey) -> Option<Vec<SearchResult>> {
        self.inner.get(key).await
    }

    /// Store a verified set.
    pub async fn insert(&self, key: CacheKey, results: Vec<SearchResult>) {
        self.inner.insert(key, results).await;
    }
}

impl std::fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache")
            .field("entries", &self.inner.entry_count())
            .finish()
    }
}
