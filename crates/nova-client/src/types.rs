//! Common types for the client SDK

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A directory owned by the calling application
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Directory {
    /// Directory ID
    pub id: u64,
    /// Directory name
    pub name: String,
    /// Whether files in the directory are publicly reachable
    pub is_public: bool,
    /// Owner ID
    pub owner_id: u64,
    /// Files, when the service includes them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<FileRecord>>,
    /// Number of files (sent as a string by the service)
    pub files_count: String,
}

/// A stored file
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// File ID
    pub id: String,
    /// Owning application ID
    pub app_id: u64,
    /// Parent directory ID
    pub dir_id: String,
    /// Name the file is stored under
    pub file_name: String,
    /// Name the file was uploaded with
    pub original_name: String,
    /// MIME type
    pub mime_type: Option<String>,
    /// Tags
    pub tags: Option<Vec<String>>,
    /// Size in bytes
    pub file_size: u64,
    /// Storage path
    pub path: Option<String>,
    /// Public URL
    pub url: Option<String>,
    /// Server-generated variants (thumbnails etc.)
    #[serde(default)]
    pub processed_files: Vec<ProcessedFile>,
    /// Upload timestamp (ISO 8601)
    pub uploaded_at: String,
}

/// A server-generated variant of a [`FileRecord`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProcessedFile {
    /// Variant label, e.g. a thumbnail size
    pub variant: String,
    /// Name the variant is stored under
    pub file_name: String,
    /// Size in bytes
    pub file_size: u64,
    /// Storage path
    pub path: Option<String>,
    /// Public URL
    pub url: Option<String>,
}

/// A file to upload
#[derive(Clone, Debug)]
pub struct UploadFile {
    /// Multipart field name
    pub field_name: String,
    /// File name sent to the service
    pub original_name: String,
    /// File contents
    pub buffer: Bytes,
    /// MIME type
    pub mime_type: String,
}

impl UploadFile {
    /// Create a new upload file
    pub fn new(
        field_name: impl Into<String>,
        original_name: impl Into<String>,
        buffer: impl Into<Bytes>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            original_name: original_name.into(),
            buffer: buffer.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// Options for an upload
#[derive(Clone, Debug, Default)]
pub struct UploadOptions {
    /// Destination directory name
    pub namespace: String,
    /// Keep the original file name instead of a generated one
    pub preserve_name: Option<bool>,
    /// Tags applied to every uploaded file
    pub tags: Option<Vec<String>>,
}

impl UploadOptions {
    /// Create options for the given namespace
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    /// Set the preserve-name flag
    pub fn with_preserve_name(mut self, preserve: bool) -> Self {
        self.preserve_name = Some(preserve);
        self
    }

    /// Set tags
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }
}

/// Filters for listing directories
#[derive(Clone, Debug, Default)]
pub struct DirectoryFilters {
    /// Only the directory with this ID
    pub id: Option<u64>,
    /// Only directories with this name (omitted when empty)
    pub name: Option<String>,
    /// Only public or only private directories
    pub is_public: Option<bool>,
}

impl DirectoryFilters {
    /// Create an empty filter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by directory ID
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    /// Filter by directory name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Filter by visibility
    pub fn with_public(mut self, is_public: bool) -> Self {
        self.is_public = Some(is_public);
        self
    }
}

/// Response envelope wrapping every payload returned by the service
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiResponse<T = Value> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

/// Structured error details supplied by the service
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    /// Field-level errors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Map<String, Value>>,
    /// Free-form metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,
}

impl ApiError {
    /// Details naming a single offending field of an operation
    pub fn for_field(resource: &str, field: &str, value: Value) -> Self {
        let mut fields = Map::new();
        fields.insert(field.to_string(), value);
        Self {
            resource: Some(resource.to_string()),
            fields: Some(fields),
            ..Default::default()
        }
    }

    /// Check if no detail was supplied at all
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_directory_with_files() {
        let value = json!({
            "id": 3,
            "name": "avatars",
            "is_public": true,
            "owner_id": 11,
            "files_count": "1",
            "files": [{
                "id": "f-1",
                "app_id": 11,
                "dir_id": "3",
                "file_name": "a1b2.png",
                "original_name": "me.png",
                "mime_type": "image/png",
                "tags": null,
                "file_size": 2048,
                "path": null,
                "url": "https://cdn.example/a1b2.png",
                "processed_files": [{
                    "variant": "128x128",
                    "file_name": "a1b2_128.png",
                    "file_size": 512,
                    "path": null,
                    "url": null
                }],
                "uploaded_at": "2024-05-01T10:00:00.000Z"
            }]
        });

        let directory: Directory = serde_json::from_value(value).unwrap();
        assert_eq!(directory.files_count, "1");
        let files = directory.files.unwrap();
        assert_eq!(files[0].processed_files[0].variant, "128x128");
        assert!(files[0].tags.is_none());
    }

    #[test]
    fn test_directory_without_files_field() {
        let directory: Directory = serde_json::from_value(json!({
            "id": 1, "name": "docs", "is_public": false, "owner_id": 2, "files_count": "0"
        }))
        .unwrap();
        assert!(directory.files.is_none());
    }

    #[test]
    fn test_api_error_ignores_unknown_keys() {
        let error: ApiError = serde_json::from_value(json!({ "code": "E1", "trace": "x" })).unwrap();
        assert_eq!(error.code.as_deref(), Some("E1"));
        assert!(!error.is_empty());
        assert!(ApiError::default().is_empty());
    }

    #[test]
    fn test_parse_error_envelope() {
        let response: ApiResponse = serde_json::from_value(json!({
            "success": false,
            "message": "Directory not found",
            "error": { "code": "NOT_FOUND", "fields": { "id": "9" } }
        }))
        .unwrap();

        assert!(!response.success);
        assert!(response.data.is_none());
        assert_eq!(response.error.unwrap().fields.unwrap()["id"], "9");
    }

    #[test]
    fn test_upload_options_builder() {
        let options = UploadOptions::new("photos")
            .with_preserve_name(true)
            .with_tags(["a", "b"]);
        assert_eq!(options.namespace, "photos");
        assert_eq!(options.preserve_name, Some(true));
        assert_eq!(options.tags.unwrap(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_directory_filters_builder() {
        let filters = DirectoryFilters::new()
            .with_id(4)
            .with_name("docs")
            .with_public(false);
        assert_eq!(filters.id, Some(4));
        assert_eq!(filters.name.as_deref(), Some("docs"));
        assert_eq!(filters.is_public, Some(false));
    }
}
