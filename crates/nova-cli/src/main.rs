//! Nova CLI - command-line client for Nova file storage

mod commands;

use clap::{Parser, Subcommand};
use nova_client::{Config, ErrorExposure, NovaClient, NovaError};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "nova")]
#[command(about = "Manage directories and files on a Nova storage service")]
#[command(version)]
struct Args {
    /// Service URL (the /api prefix is appended)
    #[arg(long, env = "NOVA_URL")]
    url: String,

    /// Authorization token
    #[arg(long, env = "NOVA_TOKEN", hide_env_values = true)]
    token: String,

    /// Runtime mode; `development` includes diagnostics in error output
    #[arg(long, default_value = "production", env = "NOVA_ENV")]
    mode: String,

    /// Enable debug logging
    #[arg(short, long, env = "NOVA_DEBUG")]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a directory
    Mkdir {
        name: String,
        /// Make the directory public
        #[arg(long)]
        public: bool,
    },
    /// List directories
    Ls {
        #[arg(long)]
        id: Option<u64>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        public: Option<bool>,
    },
    /// Delete a directory
    Rmdir { id: u64 },
    /// Download a file (or one of its variants)
    Get {
        file_id: String,
        /// Variant label, e.g. a thumbnail size
        #[arg(short, long)]
        variant: Option<String>,
        /// Output path; defaults to the name announced by the service
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show file metadata
    Stat { file_id: String },
    /// Delete a file
    Rm { file_id: String },
    /// Upload files into a namespace
    Upload {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Destination directory name
        #[arg(short, long)]
        namespace: String,
        /// Keep the original file names
        #[arg(long)]
        preserve_name: bool,
        /// Tag to apply (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
        /// Multipart field name for the file parts
        #[arg(long, default_value = "file")]
        field: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Parse arguments
    let args = Args::parse();

    // Setup logging
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| format!("nova_client={},nova_cli={}", log_level, log_level).into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let exposure = ErrorExposure::from_mode(&args.mode);
    if exposure == ErrorExposure::Development {
        tracing::warn!("Development mode - error output includes internal diagnostics");
    }

    let config = Config::for_service(&args.url, args.token).with_error_exposure(exposure);
    tracing::debug!("Using API at {}", config.base_url());

    let result = match NovaClient::new(config) {
        Ok(client) => commands::run(&client, args.command).await,
        Err(err) => Err(err.into()),
    };

    match result {
        Ok(output) => {
            if let Some(output) = output {
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            Ok(())
        }
        Err(err) => {
            if let Some(nova) = err.downcast_ref::<NovaError>() {
                tracing::error!(status = nova.status_code(), "{}", nova);
                eprintln!("{}", serde_json::to_string_pretty(&nova.serialize_error(exposure))?);
            }
            Err(err)
        }
    }
}
