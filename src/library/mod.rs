//! Document library over a Drive folder tree
//!
//! [`DriveLibrary`] is the surface the daemon serves: cached recursive
//! listings with search and paging, single-folder browsing and file metadata.

pub mod browse;
pub mod paginate;
pub mod path;
pub mod walker;

use std::cmp::Ordering;
use std::sync::Arc;

use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::cache::{ListingCache, ListingCacheState, MetaCacheStats, MetadataCache};
use crate::config::{DriveConfig, DEFAULT_ROOT_FOLDER_ID};
use crate::drive::types::PDF_MIME_TYPE;
use crate::drive::{DriveError, ErrorEntry, FileMeta, ListingBackend};

pub use browse::{BrowseItem, BrowseListing, BrowseRequest};
pub use paginate::{filter_and_paginate, PageResult};
pub use walker::{FlatFileEntry, TreeWalker};

/// Page size used when a search request names none
pub const DEFAULT_SEARCH_PAGE_SIZE: u32 = 12;

/// Name ordering shared by walks and browse listings: case-insensitive,
/// byte order as a tiebreak
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Tunables for [`DriveLibrary`]
#[derive(Debug, Clone)]
pub struct LibrarySettings {
    pub root_folder_id: String,
    pub target_mime_types: Vec<String>,
    pub cache_ttl: std::time::Duration,
    pub browse_page_size: u32,
    pub max_folders: usize,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            root_folder_id: DEFAULT_ROOT_FOLDER_ID.to_string(),
            target_mime_types: vec![PDF_MIME_TYPE.to_string()],
            cache_ttl: crate::cache::listing::DEFAULT_LISTING_TTL,
            browse_page_size: 30,
            max_folders: 10_000,
        }
    }
}

impl From<&DriveConfig> for LibrarySettings {
    fn from(config: &DriveConfig) -> Self {
        Self {
            root_folder_id: config.root_folder_id.clone(),
            target_mime_types: config.target_mime_types.clone(),
            cache_ttl: config.cache_ttl,
            browse_page_size: config.browse_page_size,
            max_folders: config.max_folders,
        }
    }
}

/// Snapshot of caches and backend health
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryStatus {
    pub root_folder_id: String,
    pub listing_cache: Option<ListingCacheState>,
    pub metadata_cache: MetaCacheStats,
    pub health: &'static str,
    pub recent_errors: Vec<ErrorEntry>,
}

pub struct DriveLibrary {
    backend: Arc<dyn ListingBackend>,
    settings: LibrarySettings,
    listings: ListingCache,
    metadata: MetadataCache,
}

impl DriveLibrary {
    pub fn new(backend: Arc<dyn ListingBackend>, settings: LibrarySettings) -> Self {
        let listings = ListingCache::new(settings.cache_ttl);
        let metadata = MetadataCache::with_ttl(settings.cache_ttl);
        Self {
            backend,
            settings,
            listings,
            metadata,
        }
    }

    pub fn default_root(&self) -> &str {
        &self.settings.root_folder_id
    }

    /// Every target file under `root_folder_id`, sorted by name.
    ///
    /// Served from the cache while it holds this root and is fresh; otherwise
    /// the tree is walked again and the cache replaced. Concurrent misses for
    /// the same root each walk the tree independently.
    pub async fn list_all_recursively(
        &self,
        root_folder_id: &str,
    ) -> Result<Arc<Vec<FlatFileEntry>>, DriveError> {
        if let Some(items) = self.listings.get(root_folder_id, Instant::now()).await {
            return Ok(items);
        }

        let walker = TreeWalker::new(
            self.backend.as_ref(),
            &self.settings.target_mime_types,
            self.settings.max_folders,
        );
        let items = walker.walk(root_folder_id).await?;

        Ok(self.listings.put(root_folder_id, items, Instant::now()).await)
    }

    /// Search and page the recursive listing of `root_folder_id`
    /// (the configured root when None)
    pub async fn search(
        &self,
        root_folder_id: Option<&str>,
        query: Option<&str>,
        page: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<PageResult, DriveError> {
        let root = root_folder_id
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(self.settings.root_folder_id.as_str());
        let all = self.list_all_recursively(root).await?;
        Ok(filter_and_paginate(
            &all,
            query,
            page.unwrap_or(1),
            page_size.unwrap_or(DEFAULT_SEARCH_PAGE_SIZE),
        ))
    }

    /// One page of a folder's direct children
    pub async fn list_drive_children(
        &self,
        request: &BrowseRequest,
    ) -> Result<BrowseListing, DriveError> {
        browse::list_folder_children(
            self.backend.as_ref(),
            &self.settings.target_mime_types,
            self.settings.browse_page_size,
            request,
        )
        .await
    }

    /// Metadata for one file, cached per id
    pub async fn file_meta(&self, file_id: &str) -> Result<FileMeta, DriveError> {
        let file_id = file_id.trim();
        if file_id.is_empty() {
            return Err(DriveError::config("file id is required"));
        }
        if let Some(meta) = self.metadata.get(file_id) {
            return Ok(meta);
        }

        let meta = self.backend.file_meta(file_id).await?;
        self.metadata.insert(meta.clone());
        Ok(meta)
    }

    /// Forget all cached listings and metadata
    pub async fn invalidate(&self) {
        self.listings.invalidate().await;
        self.metadata.clear();
        info!("Library caches invalidated");
    }

    pub async fn status(&self) -> LibraryStatus {
        let status = LibraryStatus {
            root_folder_id: self.settings.root_folder_id.clone(),
            listing_cache: self.listings.state(Instant::now()).await,
            metadata_cache: self.metadata.stats(),
            health: self.backend.health_status(),
            recent_errors: self.backend.recent_errors(),
        };
        debug!(health = status.health, "Library status requested");
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeDrive;
    use std::time::Duration;

    fn library(drive: Arc<FakeDrive>) -> DriveLibrary {
        DriveLibrary::new(
            drive,
            LibrarySettings {
                root_folder_id: "root".to_string(),
                ..Default::default()
            },
        )
    }

    fn two_roots() -> Arc<FakeDrive> {
        Arc::new(
            FakeDrive::new()
                .pdf("x1", "X.pdf", "x")
                .pdf("y1", "Y1.pdf", "y")
                .pdf("y2", "Y2.pdf", "y")
                .folder("sutras", "Sutras", "root")
                .pdf("kalpa", "Kalpa.pdf", "sutras")
                .pdf("readme", "Readme.pdf", "root"),
        )
    }

    #[test]
    fn test_compare_names() {
        assert_eq!(compare_names("apple", "Banana"), Ordering::Less);
        assert_eq!(compare_names("B", "b"), Ordering::Less);
        assert_eq!(compare_names("same", "same"), Ordering::Equal);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cached_within_ttl_then_rewalked() {
        let drive = two_roots();
        let lib = library(Arc::clone(&drive));

        let first = lib.list_all_recursively("x").await.unwrap();
        let second = lib.list_all_recursively("x").await.unwrap();
        assert_eq!(drive.list_calls(), 1);
        assert_eq!(first, second);

        tokio::time::advance(Duration::from_secs(599)).await;
        lib.list_all_recursively("x").await.unwrap();
        assert_eq!(drive.list_calls(), 1);

        tokio::time::advance(Duration::from_secs(1)).await;
        lib.list_all_recursively("x").await.unwrap();
        assert_eq!(drive.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_switching_roots_evicts_previous() {
        let drive = two_roots();
        let lib = library(Arc::clone(&drive));

        let x = lib.list_all_recursively("x").await.unwrap();
        let y = lib.list_all_recursively("y").await.unwrap();
        let x_again = lib.list_all_recursively("x").await.unwrap();

        assert_eq!(drive.list_calls(), 3);
        assert_eq!(x.len(), 1);
        assert_eq!(y.len(), 2);
        assert_eq!(x_again[0].name, "X.pdf");
    }

    #[tokio::test]
    async fn test_failed_walk_leaves_cache_untouched() {
        let drive = Arc::new(
            FakeDrive::new()
                .pdf("x1", "X.pdf", "x")
                .fail_on("bad", 500),
        );
        let lib = library(Arc::clone(&drive));

        lib.list_all_recursively("x").await.unwrap();
        assert!(lib.list_all_recursively("bad").await.is_err());

        let state = lib.status().await.listing_cache.unwrap();
        assert_eq!(state.folder_id, "x");
        lib.list_all_recursively("x").await.unwrap();
        assert_eq!(drive.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_search_defaults_to_configured_root() {
        let drive = two_roots();
        let lib = library(Arc::clone(&drive));

        let result = lib.search(None, None, None, None).await.unwrap();
        assert_eq!(result.total, 2);
        assert_eq!(result.page, 1);
        assert_eq!(result.page_size, DEFAULT_SEARCH_PAGE_SIZE);
        assert_eq!(result.items[0].name, "Kalpa.pdf");
        assert_eq!(result.items[0].path, "Sutras");
        assert_eq!(result.items[1].path, "");

        let filtered = lib
            .search(Some("root"), Some("sutras"), Some(1), Some(12))
            .await
            .unwrap();
        assert_eq!(filtered.total, 1);
        // both searches came from one walk (root + sutras pages)
        assert_eq!(drive.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_file_meta_is_cached() {
        let drive = two_roots();
        let lib = library(Arc::clone(&drive));

        let meta = lib.file_meta("kalpa").await.unwrap();
        assert_eq!(meta.name, "Kalpa.pdf");
        lib.file_meta("kalpa").await.unwrap();
        assert_eq!(drive.meta_calls(), 1);

        lib.invalidate().await;
        lib.file_meta("kalpa").await.unwrap();
        assert_eq!(drive.meta_calls(), 2);
    }

    #[tokio::test]
    async fn test_file_meta_errors() {
        let drive = two_roots();
        let lib = library(Arc::clone(&drive));

        assert!(matches!(lib.file_meta("  ").await, Err(DriveError::Config(_))));
        assert!(matches!(
            lib.file_meta("missing").await,
            Err(DriveError::Upstream { status: 404, .. })
        ));
        assert_eq!(drive.meta_calls(), 1);
    }

    #[tokio::test]
    async fn test_browse_uses_configured_page_size() {
        let drive = two_roots();
        let lib = DriveLibrary::new(
            Arc::clone(&drive) as Arc<dyn ListingBackend>,
            LibrarySettings {
                browse_page_size: 7,
                ..Default::default()
            },
        );

        let listing = lib
            .list_drive_children(&BrowseRequest {
                folder_id: "root".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(listing.items.len(), 2);
        assert!(listing.items[0].is_folder);
        assert_eq!(drive.last_request().unwrap().page_size, 7);
    }

    #[tokio::test]
    async fn test_status_reports_cache() {
        let drive = two_roots();
        let lib = library(Arc::clone(&drive));
        assert!(lib.status().await.listing_cache.is_none());

        lib.list_all_recursively("root").await.unwrap();
        let status = lib.status().await;
        let state = status.listing_cache.unwrap();
        assert_eq!(state.folder_id, "root");
        assert_eq!(state.items, 2);
        assert!(state.fresh);
        assert_eq!(status.health, "healthy");
    }
}
