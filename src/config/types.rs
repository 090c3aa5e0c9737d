// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub assets: AssetsConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
}

/// Listener configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Tokio worker threads, one per core when unset
    #[serde(default)]
    pub workers: Option<usize>,
}

/// Asset root discovery
#[derive(Debug, Deserialize, Clone)]
pub struct AssetsConfig {
    /// Directories probed in order; the first existing one is served
    pub candidates: Vec<PathBuf>,
    /// Document served for `/` and for every unmatched path
    pub index_file: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    /// Access log format (combined, common, json, or custom pattern).
    /// No access log line is written when unset.
    #[serde(default)]
    pub access_log_format: Option<String>,
}

/// Connection handling limits, all durations in seconds
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub connection_timeout: u64,
    pub shutdown_grace: u64,
    #[serde(default)]
    pub max_connections: Option<u64>,
}
