//! Prometheus metrics for lookups and tile caches.

use metrics::{counter, gauge};
use tile_store::TileImageCacheStats;

use crate::state::AppState;

/// Record one lookup request for `product`.
pub fn record_request(product: &'static str) {
    counter!("jmatile_requests_total", "product" => product).increment(1);
}

/// Record a lookup that failed with the given error code.
pub fn record_error(product: &'static str, code: &'static str) {
    counter!("jmatile_request_errors_total", "product" => product, "error" => code).increment(1);
}

/// Publish the current counters of one tile cache.
pub fn record_tile_cache_stats(product: &'static str, stats: &TileImageCacheStats) {
    counter!("jmatile_cache_hits_total", "product" => product).absolute(stats.hits());
    counter!("jmatile_cache_misses_total", "product" => product).absolute(stats.misses());
    counter!("jmatile_fetch_failures_total", "product" => product).absolute(stats.fetch_failures());
    gauge!("jmatile_cache_hit_rate_percent", "product" => product).set(stats.hit_rate());
}

/// Refresh cache metrics for both services before a scrape.
pub async fn refresh_cache_metrics(state: &AppState) {
    for (product, cache) in [
        (state.weather.product().name(), state.weather.cache()),
        (state.rainfall.product().name(), state.rainfall.cache()),
    ] {
        record_tile_cache_stats(product, &cache.stats());
        gauge!("jmatile_cache_entries", "product" => product).set(cache.len().await as f64);
    }
}
