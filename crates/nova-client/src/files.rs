//! File management operations

use crate::{types::FileRecord, NovaClient, NovaError, Result};
use bytes::{Bytes, BytesMut};
use futures::{stream::BoxStream, StreamExt, TryStreamExt};
use reqwest::{header, Method};
use serde_json::json;
use std::fmt;
use tracing::instrument;

const FILE_ROUTE: &str = "/manager/file";

/// Content type reported when the service sends none
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
/// Content disposition reported when the service sends none
pub const DEFAULT_CONTENT_DISPOSITION: &str = "attachment; filename=file.bin";

/// A file download in progress.
///
/// The body is not buffered by the SDK; drain it with [`FileDownload::into_stream`]
/// or [`FileDownload::into_bytes`], or drop it to abort the transfer.
pub struct FileDownload {
    /// `Content-Type` of the body
    pub content_type: String,
    /// `Content-Disposition` of the body
    pub content_disposition: String,
    stream: BoxStream<'static, Result<Bytes>>,
}

impl FileDownload {
    /// File name announced in the content disposition, if any
    pub fn file_name(&self) -> Option<&str> {
        self.content_disposition
            .split(';')
            .filter_map(|part| part.trim().strip_prefix("filename="))
            .map(|name| name.trim_matches('"'))
            .find(|name| !name.is_empty())
    }

    /// Take the live byte stream
    pub fn into_stream(self) -> BoxStream<'static, Result<Bytes>> {
        self.stream
    }

    /// Read the whole body into memory
    pub async fn into_bytes(self) -> Result<Bytes> {
        let buffer = self
            .stream
            .try_fold(BytesMut::new(), |mut buffer, chunk| async move {
                buffer.extend_from_slice(&chunk);
                Ok(buffer)
            })
            .await?;
        Ok(buffer.freeze())
    }
}

impl fmt::Debug for FileDownload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileDownload")
            .field("content_type", &self.content_type)
            .field("content_disposition", &self.content_disposition)
            .finish_non_exhaustive()
    }
}

fn file_route(file_id: &str) -> String {
    format!("{}/{}", FILE_ROUTE, urlencoding::encode(file_id))
}

fn require_file_id(resource: &str, file_id: &str) -> Result<()> {
    if file_id.trim().is_empty() {
        return Err(NovaError::validation(
            resource,
            "File id is required",
            "file_id",
            json!(file_id),
        ));
    }
    Ok(())
}

fn header_or(headers: &header::HeaderMap, name: header::HeaderName, default: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(default)
        .to_string()
}

impl NovaClient {
    // ==================== File Operations ====================

    /// Download a file, or one of its variants
    #[instrument(skip(self))]
    pub async fn get_file(&self, file_id: &str, variant: Option<&str>) -> Result<FileDownload> {
        require_file_id("get_file", file_id)?;

        let mut request = self.request(Method::GET, &file_route(file_id));
        if let Some(variant) = variant {
            request = request.query(&[("v", variant)]);
        }

        let response = self.dispatch(request).await?;

        let headers = response.headers();
        let content_type = header_or(headers, header::CONTENT_TYPE, DEFAULT_CONTENT_TYPE);
        let content_disposition =
            header_or(headers, header::CONTENT_DISPOSITION, DEFAULT_CONTENT_DISPOSITION);

        Ok(FileDownload {
            content_type,
            content_disposition,
            stream: response.bytes_stream().map_err(NovaError::from).boxed(),
        })
    }

    /// Get a file's metadata
    #[instrument(skip(self))]
    pub async fn get_metadata(&self, file_id: &str) -> Result<FileRecord> {
        require_file_id("get_metadata", file_id)?;

        let route = format!("{}/metadata", file_route(file_id));
        self.execute(self.request(Method::GET, &route))
            .await?
            .take_field("file", "get_metadata", &route)
    }

    /// Delete a file
    #[instrument(skip(self))]
    pub async fn delete_file(&self, file_id: &str) -> Result<()> {
        require_file_id("delete_file", file_id)?;

        self.dispatch(self.request(Method::DELETE, &file_route(file_id)))
            .await?;
        Ok(())
    }
}
