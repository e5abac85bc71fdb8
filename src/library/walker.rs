//! Recursive folder walker
//!
//! Breadth-first traversal of a Drive folder tree, collecting every target
//! file into a flat list with its path relative to the traversal root.

use std::collections::{HashSet, VecDeque};

use serde::Serialize;
use tracing::{debug, info};

use super::compare_names;
use super::path::{resolve_path, FolderMap};
use crate::drive::query::{ChildQuery, DriveScope, PageRequest, MAX_PAGE_SIZE, TRAVERSAL_FIELDS};
use crate::drive::{DriveError, ListingBackend, RemoteFile};

/// One target file found by a traversal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatFileEntry {
    pub id: String,
    pub name: String,
    /// Folder names below the root, slash-joined ("" for root-level files)
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// Walks one folder tree through a [`ListingBackend`]
pub struct TreeWalker<'a> {
    backend: &'a dyn ListingBackend,
    target_mime_types: &'a [String],
    max_folders: usize,
}

impl<'a> TreeWalker<'a> {
    pub fn new(
        backend: &'a dyn ListingBackend,
        target_mime_types: &'a [String],
        max_folders: usize,
    ) -> Self {
        Self {
            backend,
            target_mime_types,
            max_folders,
        }
    }

    fn is_target(&self, file: &RemoteFile) -> bool {
        !file.is_folder() && self.target_mime_types.iter().any(|m| *m == file.mime_type)
    }

    /// Collect every target file below `root_folder_id`, sorted by name.
    ///
    /// Folders are listed one at a time in discovery order, so a file's
    /// ancestors are always registered before the file is seen. Any failed
    /// page aborts the whole walk, as does a page cursor that comes back a
    /// second time for the same folder.
    pub async fn walk(&self, root_folder_id: &str) -> Result<Vec<FlatFileEntry>, DriveError> {
        if root_folder_id.trim().is_empty() {
            return Err(DriveError::config("root folder id is required"));
        }

        let mut folders = FolderMap::with_root(root_folder_id);
        let mut queue: VecDeque<String> = VecDeque::from([root_folder_id.to_string()]);
        let mut collected: Vec<FlatFileEntry> = Vec::new();
        let mut pages: usize = 0;

        info!(root = root_folder_id, "Walking Drive folder tree");

        while let Some(folder_id) = queue.pop_front() {
            let mut page_token: Option<String> = None;
            let mut seen_tokens: HashSet<String> = HashSet::new();

            loop {
                let request = PageRequest {
                    query: ChildQuery::children_of(&folder_id, self.target_mime_types),
                    page_size: MAX_PAGE_SIZE,
                    page_token: page_token.take(),
                    scope: DriveScope::Default,
                    fields: TRAVERSAL_FIELDS,
                };
                let page = self.backend.list_page(&request).await?;
                pages += 1;

                for file in page.files {
                    if file.is_folder() {
                        if folders.register(&file.id, &file.name, file.first_parent()) {
                            if folders.folder_count() > self.max_folders {
                                return Err(DriveError::TraversalLimit {
                                    limit: self.max_folders,
                                });
                            }
                            queue.push_back(file.id);
                        } else {
                            debug!(folder_id = %file.id, "Folder already visited, skipping");
                        }
                    } else if self.is_target(&file) {
                        let path = resolve_path(file.first_parent(), &folders);
                        collected.push(FlatFileEntry {
                            id: file.id,
                            name: file.name,
                            path,
                            thumbnail_link: file.thumbnail_link,
                            modified_time: file.modified_time,
                            size: file.size,
                        });
                    }
                }

                match page.next_page_token.filter(|t| !t.is_empty()) {
                    Some(next) => {
                        if !seen_tokens.insert(next.clone()) {
                            return Err(DriveError::CursorLoop { folder_id });
                        }
                        page_token = Some(next);
                    }
                    None => break,
                }
            }
        }

        collected.sort_by(|a, b| compare_names(&a.name, &b.name));

        info!(
            root = root_folder_id,
            folders = folders.folder_count(),
            files = collected.len(),
            pages = pages,
            "Drive folder walk complete"
        );
        Ok(collected)
    }
}
