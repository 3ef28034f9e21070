//! Multipart file upload

use crate::{
    types::{FileRecord, UploadFile, UploadOptions},
    NovaClient, NovaError, Result,
};
use reqwest::{
    multipart::{Form, Part},
    Method,
};
use serde_json::json;
use tracing::{debug, instrument};

const UPLOAD_ROUTE: &str = "/upload";

impl UploadOptions {
    /// Text fields sent alongside the file parts.
    ///
    /// `namespace` always; `preserve_name` when set; `tags` trimmed and
    /// comma-joined when the list is non-empty.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("namespace", self.namespace.clone())];
        if let Some(preserve) = self.preserve_name {
            fields.push(("preserve_name", preserve.to_string()));
        }
        if let Some(tags) = self.tags.as_ref().filter(|tags| !tags.is_empty()) {
            let joined = tags.iter().map(|tag| tag.trim()).collect::<Vec<_>>().join(",");
            fields.push(("tags", joined));
        }
        fields
    }
}

fn validate_upload(files: &[UploadFile], options: &UploadOptions) -> Result<()> {
    if files.is_empty() {
        return Err(NovaError::validation(
            "upload_files",
            "Files array is required",
            "files",
            json!([]),
        ));
    }
    if options.namespace.trim().is_empty() {
        return Err(NovaError::validation(
            "upload_files",
            "Namespace is required in upload options",
            "namespace",
            json!(options.namespace),
        ));
    }
    Ok(())
}

fn build_form(files: &[UploadFile], options: &UploadOptions) -> Result<Form> {
    let mut form = Form::new();
    for (name, value) in options.form_fields() {
        form = form.text(name, value);
    }

    for file in files {
        let part = Part::stream_with_length(file.buffer.clone(), file.buffer.len() as u64)
            .file_name(file.original_name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| {
                NovaError::validation(
                    "upload_files",
                    format!("Invalid MIME type for {}", file.original_name),
                    "mime_type",
                    json!(file.mime_type),
                )
                .with_source(e)
            })?;
        form = form.part(file.field_name.clone(), part);
    }

    Ok(form)
}

impl NovaClient {
    // ==================== Upload Operations ====================

    /// Upload one or more files into a namespace
    #[instrument(skip(self, files), fields(count = files.len()))]
    pub async fn upload_files(
        &self,
        files: &[UploadFile],
        options: &UploadOptions,
    ) -> Result<Vec<FileRecord>> {
        validate_upload(files, options)?;

        let total: usize = files.iter().map(|f| f.buffer.len()).sum();
        debug!(bytes = total, namespace = %options.namespace, "Uploading files");

        let form = build_form(files, options)?;
        let request = self.request(Method::POST, UPLOAD_ROUTE).multipart(form);

        self.execute(request)
            .await?
            .take_field("files", "upload_files", UPLOAD_ROUTE)
    }
}
