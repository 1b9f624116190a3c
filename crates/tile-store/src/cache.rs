//! Freshness-aware tile cache.
//!
//! Each tile key holds the last fetched image stamped with the forecast
//! timestamp it was fetched for. Timestamps are fixed-width digit strings, so
//! a lexicographically greater stamp means the schedule has moved on and the
//! tile must be fetched again.
//!
//! ## Concurrency
//!
//! Every key owns an async mutex slot. A request refreshing one key holds that
//! slot across the fetch, so concurrent lookups of the same stale tile wait
//! for a single fetch while lookups of other keys proceed. The outer map lock
//! is only held long enough to find or create a slot.
//!
//! Entries are never evicted; the key space is bounded by the tile grid of a
//! single zoom level.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use jmatile_common::TileKey;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::fetcher::FetchResult;
use crate::palette::PaletteImage;

/// What a failed fetch does to the cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Store "no image" stamped with the fresh timestamp; the tile is not
    /// requested again until the schedule advances.
    #[default]
    StampOnFailure,
    /// Leave the entry as it was, so the next request fetches again.
    RetryOnNextRequest,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stamp" | "stamp-on-failure" => Ok(FailurePolicy::StampOnFailure),
            "retry" | "retry-on-next-request" => Ok(FailurePolicy::RetryOnNextRequest),
            other => Err(format!(
                "unknown failure policy '{}' (expected 'stamp' or 'retry')",
                other
            )),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::StampOnFailure => f.write_str("stamp"),
            FailurePolicy::RetryOnNextRequest => f.write_str("retry"),
        }
    }
}

/// Cached outcome for one tile.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Forecast timestamp the entry was fetched for
    pub timestamp: String,
    /// `None` when the fetch failed under [`FailurePolicy::StampOnFailure`]
    pub image: Option<Arc<PaletteImage>>,
}

/// Statistics for the tile cache.
///
/// All fields are atomic for lock-free reads from metrics endpoints.
#[derive(Debug, Default)]
pub struct TileImageCacheStats {
    /// Lookups served from a fresh entry
    pub hits: AtomicU64,
    /// Lookups that triggered a fetch
    pub misses: AtomicU64,
    /// Fetches that returned an error
    pub fetch_failures: AtomicU64,
}

impl TileImageCacheStats {
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn fetch_failures(&self) -> u64 {
        self.fetch_failures.load(Ordering::Relaxed)
    }

    /// Calculate cache hit rate as a percentage (0-100).
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits();
        let total = hits + self.misses();
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }
}

type Slot = Arc<Mutex<Option<CacheEntry>>>;

/// Per-product tile cache.
pub struct TileImageCache {
    product: &'static str,
    policy: FailurePolicy,
    slots: RwLock<HashMap<TileKey, Slot>>,
    stats: Arc<TileImageCacheStats>,
}

impl TileImageCache {
    pub fn new(product: &'static str, policy: FailurePolicy) -> Self {
        Self {
            product,
            policy,
            slots: RwLock::new(HashMap::new()),
            stats: Arc::new(TileImageCacheStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<TileImageCacheStats> {
        Arc::clone(&self.stats)
    }

    /// Return the image for `key`, fetching it if the entry is missing or older
    /// than `fresh_timestamp`.
    ///
    /// `fetch` runs at most once per call and only while this key's slot is
    /// held. A failed fetch yields `None`.
    pub async fn get_or_refresh<F, Fut>(
        &self,
        key: TileKey,
        fresh_timestamp: &str,
        fetch: F,
    ) -> Option<Arc<PaletteImage>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = FetchResult<PaletteImage>>,
    {
        let slot = self.slot(key).await;
        let mut entry = slot.lock().await;

        if let Some(current) = entry.as_ref() {
            if current.timestamp.as_str() >= fresh_timestamp {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                debug!(
                    product = self.product,
                    tile = %key,
                    timestamp = %current.timestamp,
                    has_image = current.image.is_some(),
                    "Tile cache hit"
                );
                return current.image.clone();
            }
        }

        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        debug!(
            product = self.product,
            tile = %key,
            stale = entry.as_ref().map(|e| e.timestamp.as_str()),
            fresh = fresh_timestamp,
            "Tile cache miss"
        );

        match fetch().await {
            Ok(image) => {
                let image = Arc::new(image);
                *entry = Some(CacheEntry {
                    timestamp: fresh_timestamp.to_string(),
                    image: Some(Arc::clone(&image)),
                });
                Some(image)
            }
            Err(e) => {
                self.stats.fetch_failures.fetch_add(1, Ordering::Relaxed);
                debug!(
                    product = self.product,
                    tile = %key,
                    error = %e,
                    policy = %self.policy,
                    "Tile unavailable"
                );
                if self.policy == FailurePolicy::StampOnFailure {
                    *entry = Some(CacheEntry {
                        timestamp: fresh_timestamp.to_string(),
                        image: None,
                    });
                }
                None
            }
        }
    }

    /// Current entry for `key`, waiting for any in-flight refresh of it.
    pub async fn entry(&self, key: TileKey) -> Option<CacheEntry> {
        let slot = self.slots.read().await.get(&key).cloned()?;
        let entry = slot.lock().await;
        entry.clone()
    }

    /// Number of tile keys seen so far.
    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn slot(&self, key: TileKey) -> Slot {
        if let Some(slot) = self.slots.read().await.get(&key) {
            return Arc::clone(slot);
        }
        let mut slots = self.slots.write().await;
        Arc::clone(slots.entry(key).or_default())
    }
}
