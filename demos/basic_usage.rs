//! Basic usage example for the Nova storage SDK
//!
//! This example demonstrates:
//! - Creating a directory
//! - Uploading files
//! - Reading metadata and downloading
//! - Deleting files
//!
//! Run with: NOVA_URL=... NOVA_TOKEN=... cargo run --example basic_usage

use bytes::Bytes;
use nova_client::{NovaClient, UploadFile, UploadOptions};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Reads NOVA_URL, NOVA_TOKEN and NOVA_ENV
    let client = NovaClient::from_env()?;

    println!("Creating directory 'demo'...");
    match client.create_directory("demo", false).await {
        Ok(directory) => println!("   created #{}", directory.id),
        Err(e) => println!("   {} (status {})", e, e.status_code()),
    }

    println!("\nUploading 'hello.txt'...");
    let file = UploadFile::new(
        "file",
        "hello.txt",
        Bytes::from_static(b"Hello from the Nova SDK!"),
        "text/plain",
    );
    let uploaded = client
        .upload_files(&[file], &UploadOptions::new("demo").with_tags(["example", " demo "]))
        .await?;
    let stored = &uploaded[0];
    println!("   stored as {} ({} bytes)", stored.file_name, stored.file_size);

    println!("\nFetching metadata...");
    let metadata = client.get_metadata(&stored.id).await?;
    println!("   {}", serde_json::to_string_pretty(&metadata)?);

    println!("\nDownloading...");
    let download = client.get_file(&stored.id, None).await?;
    println!("   content-type: {}", download.content_type);
    let data = download.into_bytes().await?;
    println!("   content: {}", String::from_utf8_lossy(&data));

    println!("\nDeleting...");
    client.delete_file(&stored.id).await?;

    for directory in client.get_directories(None).await? {
        println!("   - {} ({} files)", directory.name, directory.files_count);
    }

    Ok(())
}
