//! Application state for the location API.

use std::sync::Arc;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusHandle;
use tile_store::{HttpTileFetcher, TileFetcher};
use tracing::info;

use crate::config::ServiceConfig;
use crate::service::{RainfallService, WeatherService};

/// Shared application state.
pub struct AppState {
    /// Weather forecast lookups (zoom 5).
    pub weather: WeatherService,

    /// Rainfall nowcast lookups (zoom 9).
    pub rainfall: RainfallService,

    /// Resolved configuration.
    pub config: ServiceConfig,

    /// Prometheus exporter handle; absent when no recorder is installed.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    /// Create state backed by the HTTP tile fetcher.
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let fetcher = HttpTileFetcher::new(config.fetch_config())
            .context("Failed to create tile fetcher")?;

        info!(
            tile_base_url = %config.tile_base_url,
            fetch_timeout_ms = config.fetch_timeout.as_millis() as u64,
            failure_policy = %config.failure_policy,
            "Tile fetcher configured"
        );

        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }

    /// Create state around any fetcher.
    pub fn with_fetcher(config: ServiceConfig, fetcher: Arc<dyn TileFetcher>) -> Self {
        Self {
            weather: WeatherService::weather(&config, Arc::clone(&fetcher)),
            rainfall: RainfallService::rainfall(&config, fetcher),
            config,
            prometheus: None,
        }
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}
