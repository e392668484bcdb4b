//! Per-index LRU cache for autocomplete results
use crate::catalog::EntityKind;
use crate::index::EntityRef;
use crate::scoring::MatchKind;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Cache key for autocomplete results
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub scope: EntityKind,
    pub query: String,
    pub limit: usize,
    pub fuzzy_cap: usize,
}

/// One ranked hit as stored in the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachedHit {
    pub entity: EntityRef,
    pub kind: MatchKind,
    pub via_brand: bool,
}

/// Autocomplete result cache. Lives inside a single index, so a swap drops it
/// together with the data it was computed from.
pub struct AutocompleteCache {
    results: Option<Mutex<LruCache<CacheKey, Vec<CachedHit>>>>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl AutocompleteCache {
    /// A capacity of 0 disables caching.
    pub fn new(capacity: usize) -> Self {
        Self {
            results: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<Vec<CachedHit>> {
        let results = self.results.as_ref()?;
        let found = results.lock().get(key).cloned();
        let counter = if found.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    pub fn insert(&self, key: CacheKey, hits: Vec<CachedHit>) {
        if let Some(results) = &self.results {
            results.lock().put(key, hits);
        }
    }

    pub fn get_stats(&self) -> CacheStats {
        CacheStats {
            entries: self.results.as_ref().map_or(0, |r| r.lock().len()),
            capacity: self.capacity,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for AutocompleteCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutocompleteCache")
            .field("capacity", &self.capacity)
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .finish()
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
}
