//! File metadata cache
//!
//! TTL cache of single-file metadata lookups using Moka, keyed by file id.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::sync::Cache;
use tracing::{debug, trace};

use crate::drive::FileMeta;

/// Default time-to-live for file metadata
pub const DEFAULT_META_TTL: Duration = Duration::from_secs(600);

/// Cache hit/miss counters
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub entries: u64,
}

pub struct MetadataCache {
    meta_cache: Cache<String, FileMeta>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MetadataCache {
    /// Create a new metadata cache with the default TTL
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_META_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        let meta_cache = Cache::builder()
            .time_to_live(ttl)
            .max_capacity(10_000)
            .name("file_meta_cache")
            .build();

        Self {
            meta_cache,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Get metadata from cache, updating hit/miss counters
    pub fn get(&self, file_id: &str) -> Option<FileMeta> {
        match self.meta_cache.get(file_id) {
            Some(meta) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                trace!(file_id = file_id, "Cache HIT for file metadata");
                Some(meta)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                trace!(file_id = file_id, "Cache MISS for file metadata");
                None
            }
        }
    }

    pub fn insert(&self, meta: FileMeta) {
        debug!(file_id = %meta.id, "Cached file metadata");
        self.meta_cache.insert(meta.id.clone(), meta);
    }

    /// Clear the cache and reset counters
    pub fn clear(&self) {
        self.meta_cache.invalidate_all();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        debug!("Cleared file metadata cache");
    }

    pub fn stats(&self) -> MetaCacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        MetaCacheStats {
            hits,
            misses,
            hit_rate,
            entries: self.meta_cache.entry_count(),
        }
    }
}

impl Default for MetadataCache {
    fn default() -> Self {
        Self::new()
    }
}
