//! Recursive listing cache
//!
//! Holds the flat result of the most recent tree walk, for one root folder at
//! a time. Storing a different root replaces the slot outright.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::library::FlatFileEntry;

/// Default time-to-live for a walk result
pub const DEFAULT_LISTING_TTL: Duration = Duration::from_secs(600);

/// The single cached walk result
#[derive(Debug, Clone)]
struct CachedListing {
    folder_id: String,
    items: Arc<Vec<FlatFileEntry>>,
    fetched_at: Instant,
}

/// What the slot currently holds
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingCacheState {
    pub folder_id: String,
    pub items: usize,
    pub age_secs: u64,
    pub fresh: bool,
}

/// Single-slot TTL cache keyed by root folder id
pub struct ListingCache {
    ttl: Duration,
    slot: RwLock<Option<CachedListing>>,
}

impl ListingCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: RwLock::new(None),
        }
    }

    /// Items for `folder_id` if the slot holds that root and is younger than the TTL
    pub async fn get(&self, folder_id: &str, now: Instant) -> Option<Arc<Vec<FlatFileEntry>>> {
        let slot = self.slot.read().await;
        match slot.as_ref() {
            Some(cached)
                if cached.folder_id == folder_id
                    && now.saturating_duration_since(cached.fetched_at) < self.ttl =>
            {
                trace!(folder_id = folder_id, items = cached.items.len(), "Listing cache HIT");
                Some(Arc::clone(&cached.items))
            }
            Some(cached) if cached.folder_id == folder_id => {
                debug!(folder_id = folder_id, "Listing cache EXPIRED");
                None
            }
            _ => {
                debug!(folder_id = folder_id, "Listing cache MISS");
                None
            }
        }
    }

    /// Replace the slot with a fresh walk result
    pub async fn put(
        &self,
        folder_id: &str,
        items: Vec<FlatFileEntry>,
        fetched_at: Instant,
    ) -> Arc<Vec<FlatFileEntry>> {
        let items = Arc::new(items);
        let mut slot = self.slot.write().await;
        *slot = Some(CachedListing {
            folder_id: folder_id.to_string(),
            items: Arc::clone(&items),
            fetched_at,
        });
        debug!(folder_id = folder_id, items = items.len(), "Cached folder walk");
        items
    }

    /// Drop whatever is cached
    pub async fn invalidate(&self) {
        *self.slot.write().await = None;
        debug!("Invalidated listing cache");
    }

    pub async fn state(&self, now: Instant) -> Option<ListingCacheState> {
        let slot = self.slot.read().await;
        slot.as_ref().map(|cached| {
            let age = now.saturating_duration_since(cached.fetched_at);
            ListingCacheState {
                folder_id: cached.folder_id.clone(),
                items: cached.items.len(),
                age_secs: age.as_secs(),
                fresh: age < self.ttl,
            }
        })
    }
}

impl Default for ListingCache {
    fn default() -> Self {
        Self::new(DEFAULT_LISTING_TTL)
    }
}
