//! Single-folder browsing
//!
//! Lists the immediate children of one folder for interactive navigation.
//! Pagination is the backend's own cursor; nothing is accumulated or cached.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::compare_names;
use crate::drive::query::{ChildQuery, DriveScope, PageRequest, BROWSE_FIELDS, MAX_PAGE_SIZE};
use crate::drive::{DriveError, ListingBackend, RemoteFile};

/// Parameters for one browse call
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseRequest {
    pub folder_id: String,
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub page_token: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
}

/// One child in a browse listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseItem {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    pub is_folder: bool,
}

impl From<RemoteFile> for BrowseItem {
    fn from(file: RemoteFile) -> Self {
        let is_folder = file.is_folder();
        Self {
            id: file.id,
            name: file.name,
            mime_type: file.mime_type,
            modified_time: file.modified_time,
            size: file.size,
            is_folder,
        }
    }
}

/// A folder's children, folders first then by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseListing {
    pub items: Vec<BrowseItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// List one page of a folder's direct children across all drives
pub async fn list_folder_children(
    backend: &dyn ListingBackend,
    target_mime_types: &[String],
    default_page_size: u32,
    request: &BrowseRequest,
) -> Result<BrowseListing, DriveError> {
    let folder_id = request.folder_id.trim();
    if folder_id.is_empty() {
        return Err(DriveError::config("folderId is required"));
    }

    let page_request = PageRequest {
        query: ChildQuery::children_of(folder_id, target_mime_types)
            .with_name_contains(request.query.as_deref()),
        page_size: request
            .page_size
            .unwrap_or(default_page_size)
            .clamp(1, MAX_PAGE_SIZE),
        page_token: request.page_token.clone().filter(|t| !t.is_empty()),
        scope: DriveScope::AllDrives,
        fields: BROWSE_FIELDS,
    };

    let page = backend.list_page(&page_request).await?;

    let mut items: Vec<BrowseItem> = page.files.into_iter().map(BrowseItem::from).collect();
    items.sort_by(|a, b| {
        b.is_folder
            .cmp(&a.is_folder)
            .then_with(|| compare_names(&a.name, &b.name))
    });

    debug!(
        folder_id = folder_id,
        count = items.len(),
        has_more = page.next_page_token.is_some(),
        "Listed folder children"
    );

    Ok(BrowseListing {
        items,
        next_page_token: page.next_page_token.filter(|t| !t.is_empty()),
    })
}
