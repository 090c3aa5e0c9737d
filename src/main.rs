use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::Notify;

mod assets;
mod config;
mod error;
mod handler;
mod http;
mod logger;
mod server;

use error::StartupError;

/// Environment variable naming the configuration file
const CONFIG_ENV: &str = "SPA_CONFIG";

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            logger::log_fatal(&err);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), StartupError> {
    let config_path = config_path_from_args(std::env::args().skip(1))
        .or_else(|| std::env::var(CONFIG_ENV).ok())
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());

    let cfg = config::Config::load_from(&config_path)?;
    logger::init(&cfg.logging.level)?;

    logger::log_working_directory();
    let root = assets::select_asset_root(&cfg.assets.candidates)?;
    logger::log_asset_root(root.path());

    let addr = cfg.get_socket_addr()?;

    // Build the runtime, sized by `server.workers` when set
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build().map_err(StartupError::Runtime)?;

    runtime.block_on(async move {
        let listener = server::bind_listener(addr)?;
        logger::log_server_start(&addr, &cfg);

        let state = Arc::new(config::AppState::new(cfg, root));
        logger::log_pipeline(&state.pipeline.stage_names());
        let shutdown = Arc::new(Notify::new());
        server::start_signal_handler(Arc::clone(&shutdown));
        server::run_server(listener, state, shutdown).await;

        Ok(())
    })
}

/// Pick `--config <path>` or `--config=<path>` out of the arguments.
fn config_path_from_args(mut args: impl Iterator<Item = String>) -> Option<String> {
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next();
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(path.to_string());
        }
    }
    None
}
