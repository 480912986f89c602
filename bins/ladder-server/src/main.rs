//! Ladder HTTP server binary.
//!
//! Accepts score deltas at `POST /customer/{id}/score/{delta}` and serves
//! rank-window and customer-anchored leaderboard queries. Deltas are applied
//! by a background batch task once per batch interval.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

mod routes;

use ladder_service::config::DEFAULT_BIND_ADDR;
use ladder_service::{RankingService, ServiceConfig};

/// Shared application state passed to every Axum handler.
#[derive(Clone)]
pub struct AppState {
    /// The ranking service; cheap to clone, shared with the batch task.
    pub service: Arc<RankingService>,
}

/// Ladder ranking server.
#[derive(Parser, Debug)]
#[command(
    name = "ladder-server",
    version,
    about = "Live customer leaderboard with batched score updates"
)]
struct Args {
    /// HTTP bind address
    #[arg(long, default_value = DEFAULT_BIND_ADDR)]
    bind: String,

    /// Milliseconds between batch applications
    #[arg(long, default_value_t = 1_000)]
    batch_interval_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log output format ("text" or "json")
    #[arg(long, default_value = "text")]
    log_format: String,
}

impl Args {
    /// Convert CLI args into a ServiceConfig and the log format.
    fn into_config(self) -> (ServiceConfig, String) {
        let config = ServiceConfig {
            bind_addr: self.bind,
            log_level: self.log_level,
            ..ServiceConfig::default()
        }
        .with_batch_interval(Duration::from_millis(self.batch_interval_ms));

        (config, self.log_format)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let (config, log_format) = args.into_config();

    init_logging(&config.log_level, &log_format);

    info!(
        bind = %config.bind_addr,
        batch_interval_ms = config.batch_interval.as_millis() as u64,
        "Starting ladder-server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let service = RankingService::new(config.clone());
    let batcher = service.start();

    let app = routes::router(AppState {
        service: Arc::clone(&service),
    });

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!("Listening on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    batcher.stop().await.context("Failed to stop batch task")?;
    info!(unapplied = service.pending(), "ladder-server shutdown complete");
    Ok(())
}

/// Resolve on Ctrl+C. If the handler cannot be installed, never resolve.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received Ctrl+C, shutting down..."),
        Err(e) => {
            error!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    }
}

/// Initialize tracing subscriber with the given log level and output format.
///
/// `RUST_LOG` takes precedence over `level_str`. Pass `format = "json"` for
/// structured JSON output; any other value gives human-readable text.
fn init_logging(level_str: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_str));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_level(true))
            .init();
    }
}
