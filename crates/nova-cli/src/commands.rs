//! Subcommand handlers

use crate::Command;
use anyhow::Context;
use futures::StreamExt;
use nova_client::{DirectoryFilters, NovaClient, UploadFile, UploadOptions};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::info;

/// Run a subcommand, returning the JSON to print (if any)
pub(crate) async fn run(client: &NovaClient, command: Command) -> anyhow::Result<Option<Value>> {
    let output = match command {
        Command::Mkdir { name, public } => {
            let directory = client.create_directory(&name, public).await?;
            info!("Created directory {} ({})", directory.name, directory.id);
            Some(serde_json::to_value(directory)?)
        }
        Command::Ls { id, name, public } => {
            let filters = DirectoryFilters { id, name, is_public: public };
            let directories = client.get_directories(Some(filters)).await?;
            Some(serde_json::to_value(directories)?)
        }
        Command::Rmdir { id } => {
            client.delete_directory(id).await?;
            info!("Deleted directory {}", id);
            None
        }
        Command::Get { file_id, variant, output } => {
            let written = download(client, &file_id, variant.as_deref(), output).await?;
            Some(json!({ "file_id": file_id, "path": written.0, "bytes": written.1 }))
        }
        Command::Stat { file_id } => {
            let file = client.get_metadata(&file_id).await?;
            Some(serde_json::to_value(file)?)
        }
        Command::Rm { file_id } => {
            client.delete_file(&file_id).await?;
            info!("Deleted file {}", file_id);
            None
        }
        Command::Upload { paths, namespace, preserve_name, tags, field } => {
            let mut files = Vec::with_capacity(paths.len());
            for path in &paths {
                files.push(load_upload_file(path, &field).await?);
            }

            let mut options = UploadOptions::new(namespace);
            if preserve_name {
                options = options.with_preserve_name(true);
            }
            if !tags.is_empty() {
                options = options.with_tags(tags);
            }

            let uploaded = client.upload_files(&files, &options).await?;
            info!("Uploaded {} file(s)", uploaded.len());
            Some(serde_json::to_value(uploaded)?)
        }
    };
    Ok(output)
}

/// Stream a download to disk, returning the path written and the byte count
async fn download(
    client: &NovaClient,
    file_id: &str,
    variant: Option<&str>,
    output: Option<PathBuf>,
) -> anyhow::Result<(PathBuf, u64)> {
    let download = client.get_file(file_id, variant).await?;
    let path = output.unwrap_or_else(|| {
        download
            .file_name()
            .map(|name| PathBuf::from(sanitize_file_name(name)))
            .unwrap_or_else(|| PathBuf::from(sanitize_file_name(file_id)))
    });

    let mut file = tokio::fs::File::create(&path)
        .await
        .with_context(|| format!("Failed to create {}", path.display()))?;

    let mut written = 0u64;
    let mut stream = download.into_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;

    info!("Saved {} bytes to {}", written, path.display());
    Ok((path, written))
}

/// Read a local file into an [`UploadFile`], guessing its MIME type from the extension
async fn load_upload_file(path: &Path, field: &str) -> anyhow::Result<UploadFile> {
    let buffer = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let original_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Not a file path: {}", path.display()))?;
    let mime_type = mime_guess::from_path(path).first_or_octet_stream();

    Ok(UploadFile::new(field, original_name, buffer, mime_type.essence_str()))
}

/// Keep only the final path component of a name supplied by the service
fn sanitize_file_name(name: &str) -> String {
    let name = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match name {
        "" | "." | ".." => "download.bin".to_string(),
        name => name.to_string(),
    }
}
