//! LoveSync CLI - a terminal front end for the LoveSync couple app.
//!
//! Logs in against the LoveSync API, keeps the session token on disk (or in
//! the OS keychain) and answers whether a page may be opened with the current
//! session.

mod app;
mod terminal;

use std::io;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lovesync_core::Config;

use app::{usage_error, App, Command};

/// Log file name prefix inside the cache directory
const LOG_FILE_PREFIX: &str = "lovesync.log";

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr and to a daily rolling file in the cache directory.
/// The returned guard must stay alive for the file writer to flush.
fn init_tracing(log_dir: &Path) -> WorkerGuard {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("{}", usage_error(&message));
            std::process::exit(2);
        }
    };

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {}", e);
        Config::default()
    });
    let cache_dir = config.cache_dir().unwrap_or_else(|_| PathBuf::from("./cache"));
    if let Err(e) = std::fs::create_dir_all(&cache_dir) {
        eprintln!("Failed to create cache directory {}: {}", cache_dir.display(), e);
    }

    let _log_guard = init_tracing(&cache_dir);
    info!(?command, "LoveSync CLI starting");

    let mut app = App::new(config, cache_dir)?;
    let result = app.run(command).await;
    if let Err(ref e) = result {
        warn!(error = %e, "Command failed");
    }
    result
}
