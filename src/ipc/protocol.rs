//! IPC protocol definitions
//!
//! Newline-delimited JSON exchanged with UI clients over a Unix domain socket.

use serde::{Deserialize, Serialize};

use crate::drive::FileMeta;
use crate::library::{BrowseItem, BrowseRequest, FlatFileEntry, LibraryStatus};

/// Protocol version for future compatibility
pub const PROTOCOL_VERSION: u32 = 1;

/// Commands sent by clients
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
    /// Search the recursive listing of a root folder
    #[serde(rename_all = "camelCase")]
    ListFiles {
        #[serde(default)]
        folder_id: Option<String>,
        #[serde(default)]
        query: Option<String>,
        #[serde(default)]
        page: Option<u32>,
        #[serde(default)]
        page_size: Option<u32>,
    },
    /// List one folder's direct children
    Browse(BrowseRequest),
    /// Metadata for one file
    FileMeta { id: String },
    /// Drop cached listings and metadata
    InvalidateCache,
    /// Get daemon status
    GetStatus,
}

/// Responses sent back to clients
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Response {
    #[serde(rename_all = "camelCase")]
    Success { message: Option<String> },
    #[serde(rename_all = "camelCase")]
    Error { error: String },
    #[serde(rename_all = "camelCase")]
    Files {
        total: usize,
        page: u32,
        page_size: u32,
        items: Vec<FlatFileEntry>,
    },
    #[serde(rename_all = "camelCase")]
    Listing {
        items: Vec<BrowseItem>,
        #[serde(skip_serializing_if = "Option::is_none")]
        next_page_token: Option<String>,
    },
    Meta { file: FileMeta },
    Status {
        version: u32,
        healthy: bool,
        #[serde(flatten)]
        library: LibraryStatus,
    },
}

/// Parse a JSON command from bytes
pub fn parse_command(data: &[u8]) -> Result<Command, serde_json::Error> {
    serde_json::from_slice(data)
}

/// Serialize a response to JSON bytes
pub fn serialize_response(response: &Response) -> Result<Vec<u8>, serde_json::Error> {
    let mut json = serde_json::to_vec(response)?;
    json.push(b'\n'); // Add newline delimiter
    Ok(json)
}
