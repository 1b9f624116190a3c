//! Tile access for the location API.
//!
//! Provides:
//! - HTTP fetching of JMA tiles with a bounded timeout
//! - Palette-indexed PNG decoding and pixel sampling
//! - A per-tile cache that refreshes only when the schedule advances

pub mod cache;
pub mod fetcher;
pub mod palette;

pub use cache::{CacheEntry, FailurePolicy, TileImageCache, TileImageCacheStats};
pub use fetcher::{FetchConfig, FetchError, FetchResult, HttpTileFetcher, TileFetcher};
pub use palette::{ImageError, PaletteImage};
