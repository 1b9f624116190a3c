//! Service configuration.

use std::time::Duration;

use tile_store::{FailurePolicy, FetchConfig};

/// Default tile host.
pub const DEFAULT_TILE_BASE_URL: &str = "https://www.jma.go.jp";

/// Default whole-request timeout for tile fetches, in milliseconds.
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 1000;

/// Resolved settings shared by both lookup services.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Scheme and host tile URLs are built on.
    pub tile_base_url: String,

    /// Timeout for a single tile fetch.
    pub fetch_timeout: Duration,

    /// What a failed fetch does to the cached entry.
    pub failure_policy: FailurePolicy,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            tile_base_url: DEFAULT_TILE_BASE_URL.to_string(),
            fetch_timeout: Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS),
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl ServiceConfig {
    pub fn new(tile_base_url: impl Into<String>, fetch_timeout_ms: u64, failure_policy: FailurePolicy) -> Self {
        Self {
            tile_base_url: tile_base_url.into().trim_end_matches('/').to_string(),
            fetch_timeout: Duration::from_millis(fetch_timeout_ms),
            failure_policy,
        }
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            timeout: self.fetch_timeout,
            ..FetchConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.tile_base_url, "https://www.jma.go.jp");
        assert_eq!(config.fetch_timeout, Duration::from_secs(1));
        assert_eq!(config.failure_policy, FailurePolicy::StampOnFailure);
    }

    #[test]
    fn test_new_trims_base_url() {
        let config = ServiceConfig::new("http://127.0.0.1:9000/", 250, FailurePolicy::RetryOnNextRequest);
        assert_eq!(config.tile_base_url, "http://127.0.0.1:9000");
        assert_eq!(config.fetch_config().timeout, Duration::from_millis(250));
    }
}
