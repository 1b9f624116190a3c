//! HTTP tile fetching.
//!
//! A fetch either yields a decoded tile or a typed [`FetchError`]. Callers
//! decide what a failure means; the cache turns it into "no image".

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::palette::{ImageError, PaletteImage};

/// Why a tile could not be obtained.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("Tile request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Tile server returned HTTP {0}")]
    Status(u16),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Undecodable tile: {0}")]
    Decode(#[from] ImageError),
}

pub type FetchResult<T> = Result<T, FetchError>;

/// Source of decoded tiles.
#[async_trait]
pub trait TileFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> FetchResult<PaletteImage>;
}

/// Configuration for the HTTP fetcher.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Whole-request timeout (connect, headers and body)
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(1),
            user_agent: concat!("jmatile-location/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Fetches tiles over HTTP with `reqwest`.
pub struct HttpTileFetcher {
    client: Client,
    config: FetchConfig,
}

impl HttpTileFetcher {
    pub fn new(config: FetchConfig) -> FetchResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .pool_max_idle_per_host(4)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| FetchError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    async fn get_bytes(&self, url: &str) -> FetchResult<Bytes> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status(status.as_u16()));
        }

        response.bytes().await.map_err(|e| self.classify(e))
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.config.timeout)
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl TileFetcher for HttpTileFetcher {
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch(&self, url: &str) -> FetchResult<PaletteImage> {
        let result = match self.get_bytes(url).await {
            Ok(body) => PaletteImage::decode(&body)
                .map(|image| (image, body.len()))
                .map_err(FetchError::from),
            Err(e) => Err(e),
        };

        match result {
            Ok((image, size)) => {
                info!(
                    bytes = size,
                    width = image.width(),
                    height = image.height(),
                    indexed = image.is_indexed(),
                    "Fetched tile"
                );
                Ok(image)
            }
            Err(e @ FetchError::Decode(_)) => {
                error!(error = %e, "Tile body could not be decoded");
                Err(e)
            }
            Err(e) => {
                warn!(error = %e, "Tile fetch failed");
                Err(e)
            }
        }
    }
}
