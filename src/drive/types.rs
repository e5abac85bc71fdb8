//! Drive API types
//!
//! Wire records returned by the Drive `files` endpoints.

use serde::{Deserialize, Deserializer, Serialize};

/// Mime type Drive reserves for folders
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Default target content type
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Deserialize a byte size that might be encoded as a string, a number or null.
/// Drive reports `size` as a decimal string and omits it for folders and
/// native documents. Values that do not parse are treated as absent.
fn deserialize_flexible_size<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de;

    struct FlexibleSizeVisitor;

    impl<'de> de::Visitor<'de> for FlexibleSizeVisitor {
        type Value = Option<u64>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a u64, a string containing a u64, or null")
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Option<u64>, E> {
            Ok(Some(value))
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Option<u64>, E> {
            Ok(u64::try_from(value).ok())
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Option<u64>, E> {
            Ok(value.trim().parse::<u64>().ok())
        }

        fn visit_none<E: de::Error>(self) -> Result<Option<u64>, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Option<u64>, E> {
            Ok(None)
        }
    }

    deserializer.deserialize_any(FlexibleSizeVisitor)
}

/// One storage object as reported by a listing page
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    /// Parent folder ids; only the first one is used
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default)]
    pub thumbnail_link: Option<String>,
    #[serde(default)]
    pub modified_time: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flexible_size")]
    pub size: Option<u64>,
}

impl RemoteFile {
    /// Check if this object is a folder
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME_TYPE
    }

    /// The parent this object is filed under
    pub fn first_parent(&self) -> Option<&str> {
        self.parents.first().map(String::as_str)
    }
}

/// One page of a `files.list` response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileListPage {
    #[serde(default)]
    pub files: Vec<RemoteFile>,
    /// Cursor for the next page (None if this was the last one)
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Metadata for a single object, as served to viewers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMeta {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_flexible_size",
        skip_serializing_if = "Option::is_none"
    )]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_view_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_link: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_pdf_entry() {
        let json = r#"{
            "id": "1abc",
            "name": "Kalpa.pdf",
            "mimeType": "application/pdf",
            "parents": ["folder-1"],
            "thumbnailLink": "https://lh3.example/thumb",
            "modifiedTime": "2024-03-01T10:00:00.000Z",
            "size": "204800"
        }"#;
        let file: RemoteFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.name, "Kalpa.pdf");
        assert_eq!(file.size, Some(204800));
        assert_eq!(file.first_parent(), Some("folder-1"));
        assert!(!file.is_folder());
    }

    #[test]
    fn test_deserialize_folder_without_optional_fields() {
        let json = r#"{
            "id": "f1",
            "name": "Sutras",
            "mimeType": "application/vnd.google-apps.folder"
        }"#;
        let file: RemoteFile = serde_json::from_str(json).unwrap();
        assert!(file.is_folder());
        assert!(file.parents.is_empty());
        assert_eq!(file.first_parent(), None);
        assert_eq!(file.size, None);
        assert_eq!(file.thumbnail_link, None);
    }

    #[test]
    fn test_deserialize_size_variants() {
        let numeric: RemoteFile = serde_json::from_str(
            r#"{"id":"a","name":"a.pdf","mimeType":"application/pdf","size":42}"#,
        )
        .unwrap();
        assert_eq!(numeric.size, Some(42));

        let garbage: RemoteFile = serde_json::from_str(
            r#"{"id":"b","name":"b.pdf","mimeType":"application/pdf","size":"n/a"}"#,
        )
        .unwrap();
        assert_eq!(garbage.size, None);

        let null: RemoteFile = serde_json::from_str(
            r#"{"id":"c","name":"c.pdf","mimeType":"application/pdf","size":null}"#,
        )
        .unwrap();
        assert_eq!(null.size, None);
    }

    #[test]
    fn test_deserialize_list_page() {
        let json = r#"{
            "files": [
                {"id": "f1", "name": "Sutras", "mimeType": "application/vnd.google-apps.folder", "parents": ["root"]},
                {"id": "p1", "name": "Readme.pdf", "mimeType": "application/pdf", "parents": ["root"], "size": "10"}
            ],
            "nextPageToken": "tok-2",
            "kind": "drive#fileList",
            "incompleteSearch": false
        }"#;
        let page: FileListPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.files.len(), 2);
        assert!(page.files[0].is_folder());
        assert_eq!(page.next_page_token.as_deref(), Some("tok-2"));
    }

    #[test]
    fn test_deserialize_empty_page() {
        let page: FileListPage = serde_json::from_str("{}").unwrap();
        assert!(page.files.is_empty());
        assert_eq!(page.next_page_token, None);
    }

    #[test]
    fn test_meta_serializes_camel_case_without_nulls() {
        let meta = FileMeta {
            id: "p1".into(),
            name: "Readme.pdf".into(),
            mime_type: PDF_MIME_TYPE.into(),
            thumbnail_link: None,
            modified_time: Some("2024-01-01T00:00:00Z".into()),
            size: Some(10),
            web_view_link: None,
            icon_link: None,
        };
        let json = serde_json::to_string(&meta).unwrap();
        assert!(json.contains("\"mimeType\""));
        assert!(json.contains("\"modifiedTime\""));
        assert!(!json.contains("thumbnailLink"));
    }
}
