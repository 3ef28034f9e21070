//! # Nova Client SDK
//!
//! A typed client for the Nova file storage service.
//!
//! ## Features
//!
//! - **Directories**: create, list (with filters) and delete
//! - **Files**: streamed download (including processed variants), metadata, delete
//! - **Upload**: multipart upload of one or more files into a namespace
//! - **One error type**: every failure is a [`NovaError`] with a status code and details
//!
//! ## Example
//!
//! ```rust,ignore
//! use nova_client::{NovaClient, Config, UploadFile, UploadOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = NovaClient::new(Config::new("https://files.example.com/api", "my-token"))?;
//!
//!     // Create a directory
//!     client.create_directory("avatars", true).await?;
//!
//!     // Upload a file into it
//!     let file = UploadFile::new("file", "me.png", std::fs::read("me.png")?, "image/png");
//!     let uploaded = client
//!         .upload_files(&[file], &UploadOptions::new("avatars").with_tags(["profile"]))
//!         .await?;
//!
//!     // Download it again
//!     let data = client.get_file(&uploaded[0].id, None).await?.into_bytes().await?;
//!     println!("{} bytes", data.len());
//!
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod directories;
mod error;
mod files;
mod types;
mod upload;

pub mod envelope;

pub use client::NovaClient;
pub use config::{Config, API_PREFIX, MODE_ENV, TOKEN_ENV, URL_ENV};
pub use error::{
    ErrorExposure, NovaError, Result, SerializedError, DEFAULT_STATUS_CODE,
    INVALID_RESPONSE_STATUS_CODE, LOCAL_ERROR_STATUS_CODE,
};
pub use files::{FileDownload, DEFAULT_CONTENT_DISPOSITION, DEFAULT_CONTENT_TYPE};
pub use types::*;
