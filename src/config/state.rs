// Application state module
// Everything a connection task needs, shared read-only across tasks

use std::sync::atomic::AtomicUsize;

use super::types::Config;
use crate::assets::AssetRoot;
use crate::handler::{self, Pipeline};

/// Application state
pub struct AppState {
    pub config: Config,
    pub pipeline: Pipeline,
    /// Open connections, checked against `performance.max_connections`
    pub active_connections: AtomicUsize,
}

impl AppState {
    pub fn new(config: Config, root: AssetRoot) -> Self {
        let pipeline = handler::build_pipeline(&config, root);
        Self {
            config,
            pipeline,
            active_connections: AtomicUsize::new(0),
        }
    }
}
