// Configuration module entry point
// Loads layered configuration and holds the per-process application state

mod state;
mod types;

use std::collections::HashMap;
use std::net::SocketAddr;

use crate::error::StartupError;

// Re-export public types
pub use state::AppState;
pub use types::{AssetsConfig, Config, LoggingConfig, PerformanceConfig, ServerConfig};

/// Default config file name (without extension), overridable with `SPA_CONFIG`
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Candidate asset roots, probed in order: development build, production
/// bundle, then a plain static directory.
const DEFAULT_CANDIDATES: [&str; 3] = [
    "../fullstack-open-part11-pokedex/dist",
    "./pokedex-dist",
    "./static",
];

impl Config {
    /// Load configuration from the process environment.
    ///
    /// Layers, lowest priority first: defaults, optional config file,
    /// `SPA_*` environment variables, then `PORT`.
    pub fn load_from(config_path: &str) -> Result<Self, StartupError> {
        let port = std::env::var("PORT").ok();
        Self::load_with(config_path, None, port.as_deref())
    }

    /// Load configuration with an explicit environment.
    ///
    /// `env` replaces the process environment for the `SPA_*` layer when set.
    pub fn load_with(
        config_path: &str,
        env: Option<HashMap<String, String>>,
        port: Option<&str>,
    ) -> Result<Self, StartupError> {
        let port = parse_port(port)?;

        let settings = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("assets.candidates", DEFAULT_CANDIDATES.to_vec())?
            .set_default("assets.index_file", "index.html")?
            .set_default("logging.level", "info")?
            .set_default("performance.connection_timeout", 60)?
            .set_default("performance.shutdown_grace", 10)?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("SPA")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("assets.candidates")
                    .try_parsing(true)
                    .source(env),
            )
            .set_override_option("server.port", port.map(i64::from))?
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, StartupError> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse()
            .map_err(|_| StartupError::InvalidAddress(addr.clone()))
    }
}

/// Interpret the `PORT` variable. Unset and empty both mean "use the default".
fn parse_port(raw: Option<&str>) -> Result<Option<u16>, StartupError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<u16>()
            .map(Some)
            .map_err(|source| StartupError::InvalidPort {
                value: value.to_string(),
                source,
            }),
    }
}
