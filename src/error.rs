//! Startup error types
//!
//! Everything in here is fatal: the process logs the error and exits
//! non-zero before (or instead of) serving requests. Per-request failures
//! never surface as a `StartupError`.

use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid PORT value '{value}': {source}")]
    InvalidPort {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("invalid listen address '{0}'")]
    InvalidAddress(String),

    #[error("no asset root found, tried: {}", display_candidates(.candidates))]
    NoAssetRoot { candidates: Vec<PathBuf> },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

fn display_candidates(candidates: &[PathBuf]) -> String {
    if candidates.is_empty() {
        return "(no candidates configured)".to_string();
    }
    candidates
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_asset_root_lists_candidates() {
        let err = StartupError::NoAssetRoot {
            candidates: vec![PathBuf::from("./dist"), PathBuf::from("./static")],
        };
        assert_eq!(
            err.to_string(),
            "no asset root found, tried: ./dist, ./static"
        );
    }

    #[test]
    fn test_no_asset_root_empty() {
        let err = StartupError::NoAssetRoot { candidates: vec![] };
        assert!(err.to_string().contains("no candidates configured"));
    }
}
