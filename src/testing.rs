//! In-memory Drive used by unit tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::drive::types::{FOLDER_MIME_TYPE, PDF_MIME_TYPE};
use crate::drive::query::PageRequest;
use crate::drive::{DriveError, FileListPage, FileMeta, ListingBackend, RemoteFile};

pub const IMAGE_MIME_TYPE: &str = "image/png";

/// Folder tree served page by page, with call accounting
pub struct FakeDrive {
    /// Children keyed by the folder they are listed under, in insertion order
    children: HashMap<String, Vec<RemoteFile>>,
    page_size: usize,
    failures: HashMap<String, u16>,
    list_calls: AtomicUsize,
    meta_calls: AtomicUsize,
    requests: Mutex<Vec<PageRequest>>,
}

impl FakeDrive {
    pub fn new() -> Self {
        Self {
            children: HashMap::new(),
            page_size: usize::MAX,
            failures: HashMap::new(),
            list_calls: AtomicUsize::new(0),
            meta_calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Serve at most `size` children per page regardless of the request
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = size;
        self
    }

    pub fn folder(self, id: &str, name: &str, parent: &str) -> Self {
        self.file(id, name, FOLDER_MIME_TYPE, parent)
    }

    pub fn pdf(self, id: &str, name: &str, parent: &str) -> Self {
        self.file(id, name, PDF_MIME_TYPE, parent)
    }

    pub fn file(mut self, id: &str, name: &str, mime_type: &str, parent: &str) -> Self {
        let is_folder = mime_type == FOLDER_MIME_TYPE;
        self.children
            .entry(parent.to_string())
            .or_default()
            .push(RemoteFile {
                id: id.to_string(),
                name: name.to_string(),
                mime_type: mime_type.to_string(),
                parents: vec![parent.to_string()],
                thumbnail_link: (!is_folder).then(|| format!("https://thumbs.example/{}", id)),
                modified_time: Some("2024-05-01T12:00:00.000Z".to_string()),
                size: (!is_folder).then_some(1024),
            });
        self
    }

    /// Make listings of `folder_id` (or metadata for that id) fail with `status`
    pub fn fail_on(mut self, id: &str, status: u16) -> Self {
        self.failures.insert(id.to_string(), status);
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn meta_calls(&self) -> usize {
        self.meta_calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<PageRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    pub fn tokens_seen(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter_map(|r| r.page_token.clone())
            .collect()
    }

    fn matches(request: &PageRequest, file: &RemoteFile) -> bool {
        let kind_ok = file.is_folder()
            || request
                .query
                .mime_types()
                .iter()
                .any(|m| *m == file.mime_type);
        let name_ok = request.query.name_contains().map_or(true, |term| {
            file.name.to_lowercase().contains(&term.to_lowercase())
        });
        kind_ok && name_ok
    }
}

#[async_trait]
impl ListingBackend for FakeDrive {
    async fn list_page(&self, request: &PageRequest) -> Result<FileListPage, DriveError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let parent = request.query.parent();
        if let Some(status) = self.failures.get(parent) {
            return Err(DriveError::from_status(*status, "injected failure"));
        }

        let matching: Vec<RemoteFile> = self
            .children
            .get(parent)
            .map(|files| {
                files
                    .iter()
                    .filter(|f| Self::matches(request, f))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        let offset = match &request.page_token {
            Some(token) => token
                .rsplit(':')
                .next()
                .and_then(|n| n.parse::<usize>().ok())
                .unwrap_or(0),
            None => 0,
        };
        let per_page = self.page_size.min(request.page_size as usize).max(1);
        let end = offset.saturating_add(per_page).min(matching.len());
        let files = matching.get(offset..end).unwrap_or_default().to_vec();
        let next_page_token = (end < matching.len()).then(|| format!("{}:{}", parent, end));

        Ok(FileListPage {
            files,
            next_page_token,
        })
    }

    async fn file_meta(&self, file_id: &str) -> Result<FileMeta, DriveError> {
        self.meta_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.failures.get(file_id) {
            return Err(DriveError::from_status(*status, "injected failure"));
        }

        self.children
            .values()
            .flatten()
            .find(|f| f.id == file_id)
            .map(|f| FileMeta {
                id: f.id.clone(),
                name: f.name.clone(),
                mime_type: f.mime_type.clone(),
                thumbnail_link: f.thumbnail_link.clone(),
                modified_time: f.modified_time.clone(),
                size: f.size,
                web_view_link: Some(format!("https://drive.example/file/{}/view", f.id)),
                icon_link: None,
            })
            .ok_or_else(|| DriveError::from_status(404, "File not found"))
    }
}
