//! Listing backend seam
//!
//! The walker, browser and caches only talk to the storage provider through
//! this trait. [`DriveClient`](super::DriveClient) is the production
//! implementation.

use async_trait::async_trait;

use super::client::ErrorEntry;
use super::errors::DriveError;
use super::query::PageRequest;
use super::types::{FileListPage, FileMeta};

#[async_trait]
pub trait ListingBackend: Send + Sync {
    /// Fetch exactly one page of a children listing
    async fn list_page(&self, request: &PageRequest) -> Result<FileListPage, DriveError>;

    /// Fetch metadata for a single object
    async fn file_meta(&self, file_id: &str) -> Result<FileMeta, DriveError>;

    /// Connection health string ("healthy", "degraded", "unhealthy")
    fn health_status(&self) -> &'static str {
        "healthy"
    }

    /// Most recent failures, oldest first
    fn recent_errors(&self) -> Vec<ErrorEntry> {
        Vec::new()
    }
}
