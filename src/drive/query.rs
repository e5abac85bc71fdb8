//! Drive query builder
//!
//! Renders "children of folder X" listings into the Drive `q` expression
//! language and describes everything else a single page request needs.

use super::types::FOLDER_MIME_TYPE;

/// Field mask for bulk traversal pages
pub const TRAVERSAL_FIELDS: &str =
    "files(id,name,mimeType,parents,thumbnailLink,modifiedTime,size),nextPageToken";

/// Field mask for interactive browse pages
pub const BROWSE_FIELDS: &str = "nextPageToken,files(id,name,mimeType,modifiedTime,size)";

/// Field mask for single-file metadata lookups
pub const META_FIELDS: &str = "id,name,mimeType,thumbnailLink,modifiedTime,size,webViewLink,iconLink";

/// Upper bound Drive accepts for `pageSize`
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Escape a value for interpolation inside a single-quoted query literal
pub fn escape_query_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Which drives a listing may reach
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveScope {
    /// The caller's own drive only
    Default,
    /// Shared drives as well
    AllDrives,
}

impl DriveScope {
    pub fn all_drives(self) -> bool {
        matches!(self, DriveScope::AllDrives)
    }
}

/// Direct children of one folder: subfolders plus the target content types
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildQuery {
    parent: String,
    mime_types: Vec<String>,
    name_contains: Option<String>,
}

impl ChildQuery {
    /// Children of `parent` matching folders and the given target types
    pub fn children_of(parent: &str, target_mime_types: &[String]) -> Self {
        Self {
            parent: parent.to_string(),
            mime_types: target_mime_types.to_vec(),
            name_contains: None,
        }
    }

    /// Restrict to names containing `term` as given; blank terms are ignored
    pub fn with_name_contains(mut self, term: Option<&str>) -> Self {
        self.name_contains = term.filter(|t| !t.trim().is_empty()).map(String::from);
        self
    }

    pub fn parent(&self) -> &str {
        &self.parent
    }

    #[cfg(test)]
    pub fn mime_types(&self) -> &[String] {
        &self.mime_types
    }

    #[cfg(test)]
    pub fn name_contains(&self) -> Option<&str> {
        self.name_contains.as_deref()
    }

    /// Render to the Drive query language
    pub fn render(&self) -> String {
        let mut kinds = vec![format!("mimeType='{}'", FOLDER_MIME_TYPE)];
        kinds.extend(
            self.mime_types
                .iter()
                .filter(|m| m.as_str() != FOLDER_MIME_TYPE)
                .map(|m| format!("mimeType='{}'", escape_query_literal(m))),
        );

        let mut q = format!(
            "'{}' in parents and trashed=false and ({})",
            escape_query_literal(&self.parent),
            kinds.join(" or ")
        );
        if let Some(term) = &self.name_contains {
            q.push_str(&format!(" and name contains '{}'", escape_query_literal(term)));
        }
        q
    }
}

/// Everything needed to fetch one listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub query: ChildQuery,
    pub page_size: u32,
    pub page_token: Option<String>,
    pub scope: DriveScope,
    pub fields: &'static str,
}

impl PageRequest {
    /// Query-string pairs for `GET /files`, credential excluded
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let all_drives = self.scope.all_drives().to_string();
        let mut params = vec![
            ("q", self.query.render()),
            ("pageSize", self.page_size.clamp(1, MAX_PAGE_SIZE).to_string()),
            ("fields", self.fields.to_string()),
            ("supportsAllDrives", all_drives.clone()),
            ("includeItemsFromAllDrives", all_drives),
        ];
        if let Some(token) = self.page_token.as_deref().filter(|t| !t.is_empty()) {
            params.push(("pageToken", token.to_string()));
        }
        params
    }
}
