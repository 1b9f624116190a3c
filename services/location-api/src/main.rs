//! Location API Server
//!
//! Point weather forecast and rainfall lookups over JMA raster tiles.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tile_store::FailurePolicy;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use location_api::config::{ServiceConfig, DEFAULT_FETCH_TIMEOUT_MS, DEFAULT_TILE_BASE_URL};
use location_api::state::AppState;

/// Location API Server
#[derive(Parser, Debug)]
#[command(name = "location-api")]
#[command(about = "Point weather and rainfall lookups over JMA raster tiles")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8000", env = "LOCATION_API_LISTEN_ADDR")]
    listen: String,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Number of worker threads
    #[arg(long, env = "LOCATION_API_WORKER_THREADS")]
    worker_threads: Option<usize>,

    /// Scheme and host of the tile server
    #[arg(long, default_value = DEFAULT_TILE_BASE_URL, env = "JMATILE_BASE_URL")]
    tile_base_url: String,

    /// Tile fetch timeout in milliseconds
    #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT_MS, env = "JMATILE_FETCH_TIMEOUT_MS")]
    fetch_timeout_ms: u64,

    /// What a failed fetch does to the cache: "stamp" or "retry"
    #[arg(long, default_value = "stamp", env = "JMATILE_FAILURE_POLICY")]
    failure_policy: FailurePolicy,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Build runtime with configured threads
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder
        .build()
        .context("Failed to create Tokio runtime")?;

    runtime.block_on(run_server(args))
}

async fn run_server(args: Args) -> Result<()> {
    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    info!("Starting location API server");

    // Initialize Prometheus metrics exporter
    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    let config = ServiceConfig::new(args.tile_base_url, args.fetch_timeout_ms, args.failure_policy);

    let state = Arc::new(AppState::new(config)?.with_prometheus(prometheus_handle));

    let app = location_api::router(state);

    let addr: SocketAddr = args
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address: {}", args.listen))?;

    info!("Location API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server failed")?;

    Ok(())
}
