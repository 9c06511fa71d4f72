//! Archival replay proxy.
//!
//! ```text
//!     Client request ──▶ http::server ──▶ engine ──▶ exclusion filter ──▶ bypass ──▶ forward as is
//!                                           │
//!                                           ├── URI-M ──▶ fetch (provenance header) ──▶ rewrite HTML
//!                                           │
//!                                           └── other ──▶ reconstruct from referrer ──▶ local 302
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use memento_replay::config::{load_config, validate_config, ConfigError, ConfigWatcher, ReplayConfig};
use memento_replay::http::HttpServer;
use memento_replay::lifecycle::{wait_for_signal, Shutdown};
use memento_replay::observability::{logging, metrics};

#[derive(Debug, Parser)]
#[command(name = "memento-replay", version, about = "Archival replay proxy")]
struct Args {
    /// Configuration file (TOML). Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => {
            let config = ReplayConfig::default();
            if let Err(errors) = validate_config(&config) {
                eprintln!("{}", ConfigError::Validation(errors));
                return ExitCode::FAILURE;
            }
            config
        }
    };

    if args.check {
        println!("configuration OK");
        return ExitCode::SUCCESS;
    }

    logging::init_tracing(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "memento-replay starting");

    match run(config, args.config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ReplayConfig, config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // The watcher must outlive the server.
    let (_watcher, config_updates) = match config_path {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(&path);
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let serving = tokio::spawn(server.run(listener, config_updates, server_shutdown));

    wait_for_signal().await;
    shutdown.trigger();

    serving.await??;
    Ok(())
}
