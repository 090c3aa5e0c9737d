//! Logger module
//!
//! Provides logging utilities for the server including:
//! - Startup and asset-root discovery logging
//! - Per-request and access logging
//! - Error, warning and fatal logging
//!
//! Everything goes through `tracing`; `init` installs the subscriber.

mod format;

pub use format::AccessLogEntry;

use hyper::{Method, Uri};
use std::net::SocketAddr;
use std::path::Path;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::StartupError;

/// Initialize the global subscriber
///
/// `RUST_LOG` takes precedence over the configured level.
/// Should be called once at application startup.
pub fn init(level: &str) -> Result<(), StartupError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| StartupError::Logging(format!("invalid level '{level}': {e}")))?,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| StartupError::Logging(e.to_string()))
}

pub fn log_working_directory() {
    match std::env::current_dir() {
        Ok(dir) => tracing::info!("Current working directory: {}", dir.display()),
        Err(e) => tracing::warn!("Cannot determine working directory: {e}"),
    }
}

pub fn log_candidate_missing(path: &Path) {
    tracing::info!("Asset directory not found: {}", path.display());
}

pub fn log_candidate_found(path: &Path) {
    tracing::info!("Contents of {}:", path.display());
}

pub fn log_candidate_entry(name: &str, size: u64) {
    tracing::debug!("  {name} ({size} bytes)");
}

pub fn log_asset_root(path: &Path) {
    tracing::info!("Serving single-page app from {}", path.display());
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!("======================================");
    tracing::info!("Server starting on port {}", addr.port());
    tracing::info!("Listening on: http://{addr}");
    tracing::info!("Index document: {}", config.assets.index_file);
    if let Some(workers) = config.server.workers {
        tracing::info!("Worker threads: {workers}");
    }
    if let Some(max) = config.performance.max_connections {
        tracing::info!("Max connections: {max}");
    }
    if let Some(ref format) = config.logging.access_log_format {
        tracing::info!("Access log format: {format}");
    }
    tracing::info!("======================================");
}

/// Stage order as assembled at startup, outermost first
pub fn log_pipeline(stages: &[&str]) {
    tracing::debug!("Request pipeline: {} -> router", stages.join(" -> "));
}

/// One line per inbound request, before any routing
pub fn log_request(remote_addr: &SocketAddr, method: &Method, uri: &Uri) {
    tracing::info!("{remote_addr} {method} {uri}");
}

/// Formatted access log entry, written after the response is built
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: "access", "{}", entry.format(format));
}

pub fn log_connection_error(err: &impl std::fmt::Display) {
    tracing::debug!("Failed to serve connection: {err}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

pub fn log_shutdown_requested(signal: &str) {
    tracing::info!("{signal} received, shutting down");
}

pub fn log_shutdown_complete(drained: bool) {
    if drained {
        tracing::info!("All connections closed, bye");
    } else {
        tracing::warn!("Shutdown grace period elapsed with connections still open");
    }
}

/// Last words before a non-zero exit.
///
/// Falls back to stderr when the subscriber was never installed, for
/// example when the configuration itself failed to load.
pub fn log_fatal(err: &StartupError) {
    if tracing::dispatcher::has_been_set() {
        tracing::error!("Fatal: {err}");
    } else {
        eprintln!("[FATAL] {err}");
    }
}
