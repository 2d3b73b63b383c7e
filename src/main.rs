//! msgraph-client - Microsoft Graph confidential-client example
//!
//! Acquires an application token with the client-credentials grant, lists the
//! directory's users and optionally sends a test mail.

#![deny(clippy::all)]

mod app;
mod auth;
mod cli;
mod config;
mod error;
mod graph;
mod secrets;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::Cli;
use secrets::KeePassStore;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file (if present) before anything else
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.logging);

    info!("Starting msgraph-client v{}", env!("CARGO_PKG_VERSION"));

    let store = KeePassStore::new(cli.secrets_db.clone(), cli.secret_db_key.clone());
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match app::run(&cli, &store, &mut out).await {
        Ok(()) => Ok(()),
        Err(e) if e.is_config() => {
            error!("Failed to load configuration: {}", e);
            eprintln!("Invalid config {}: {}", cli.config.display(), e);
            std::process::exit(1);
        }
        Err(e) => Err(e).context("msgraph-client failed"),
    }
}

/// Initialize tracing/logging.
///
/// Logs go to stderr; stdout is reserved for program output.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
