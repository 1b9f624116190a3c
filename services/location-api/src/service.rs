//! Location lookup orchestration.
//!
//! A lookup projects the location onto the product's tile grid, works out
//! which published tile is current, fetches it through the cache, and reads
//! the palette slot under the projected pixel.
//!
//! One service exists per product. Each owns its tile cache; the HTTP
//! fetcher is shared.

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use tracing::{debug, instrument};

use jmatile_common::time::{format_local, format_utc};
use jmatile_common::{
    jst, Location, LocationResult, PaletteCategory, Product, RainfallIntensity, TileCoordinate,
    Weather,
};
use tile_store::{TileFetcher, TileImageCache};

use crate::config::ServiceConfig;

/// Context shared by both report kinds.
#[derive(Debug, Clone, Serialize)]
pub struct LookupDetails {
    pub location: Location,
    pub tile_position: TileCoordinate,
    /// Request time, JST wall clock
    pub now: String,
    /// Request time, UTC wall clock
    pub utc: String,
    pub observation_timestamp: String,
    pub forecast_timestamp: String,
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeatherReport {
    pub weather: Weather,
    #[serde(flatten)]
    pub details: LookupDetails,
}

#[derive(Debug, Clone, Serialize)]
pub struct RainfallReport {
    pub rainfall: RainfallIntensity,
    #[serde(flatten)]
    pub details: LookupDetails,
}

/// Lookup service for one tile product.
pub struct LocationService<C> {
    product: Product,
    base_url: String,
    fetcher: Arc<dyn TileFetcher>,
    cache: TileImageCache,
    _category: PhantomData<fn() -> C>,
}

pub type WeatherService = LocationService<Weather>;
pub type RainfallService = LocationService<RainfallIntensity>;

impl<C: PaletteCategory> LocationService<C> {
    pub fn new(product: Product, config: &ServiceConfig, fetcher: Arc<dyn TileFetcher>) -> Self {
        Self {
            product,
            base_url: config.tile_base_url.clone(),
            fetcher,
            cache: TileImageCache::new(product.name(), config.failure_policy),
            _category: PhantomData,
        }
    }

    pub fn product(&self) -> Product {
        self.product
    }

    pub fn cache(&self) -> &TileImageCache {
        &self.cache
    }

    /// Resolve the category at `location` for the given request time.
    ///
    /// A missing or non-indexed tile reads as palette slot 0. Only projection
    /// and palette decode failures are returned as errors.
    #[instrument(skip(self), fields(product = %self.product))]
    pub async fn lookup_at(
        &self,
        location: Location,
        now: DateTime<FixedOffset>,
    ) -> LocationResult<(C, LookupDetails)> {
        let tile = TileCoordinate::project(location, self.product.zoom())?;
        let schedule = self.product.schedule(&now);
        let image_url = self.product.tile_url(&self.base_url, &schedule, &tile);

        let image = self
            .cache
            .get_or_refresh(tile.key(), &schedule.forecast_timestamp, || {
                self.fetcher.fetch(&image_url)
            })
            .await;

        let index = image
            .as_deref()
            .and_then(|image| image.palette_index(tile.pixel_x, tile.pixel_y))
            .unwrap_or(0);
        let category = C::from_palette_index(index)?;

        debug!(
            tile = %tile.key(),
            pixel_x = tile.pixel_x,
            pixel_y = tile.pixel_y,
            index,
            has_image = image.is_some(),
            "Resolved palette index"
        );

        Ok((
            category,
            LookupDetails {
                location,
                tile_position: tile,
                now: format_local(&now),
                utc: format_utc(&now),
                observation_timestamp: schedule.observation_timestamp,
                forecast_timestamp: schedule.forecast_timestamp,
                image_url,
            },
        ))
    }
}

/// Current time on the JST wall clock.
fn now_jst() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&jst())
}

impl WeatherService {
    pub fn weather(config: &ServiceConfig, fetcher: Arc<dyn TileFetcher>) -> Self {
        Self::new(Product::Weather, config, fetcher)
    }

    pub async fn resolve_weather(&self, location: Location) -> LocationResult<WeatherReport> {
        self.resolve_weather_at(location, now_jst()).await
    }

    pub async fn resolve_weather_at(
        &self,
        location: Location,
        now: DateTime<FixedOffset>,
    ) -> LocationResult<WeatherReport> {
        let (weather, details) = self.lookup_at(location, now).await?;
        Ok(WeatherReport { weather, details })
    }
}

impl RainfallService {
    pub fn rainfall(config: &ServiceConfig, fetcher: Arc<dyn TileFetcher>) -> Self {
        Self::new(Product::Rainfall, config, fetcher)
    }

    pub async fn resolve_rainfall(&self, location: Location) -> LocationResult<RainfallReport> {
        self.resolve_rainfall_at(location, now_jst()).await
    }

    pub async fn resolve_rainfall_at(
        &self,
        location: Location,
        now: DateTime<FixedOffset>,
    ) -> LocationResult<RainfallReport> {
        let (rainfall, details) = self.lookup_at(location, now).await?;
        Ok(RainfallReport { rainfall, details })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use jmatile_common::LocationError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use test_utils::{create_png_rgba, locations, palettes, tile_with_pixel, uniform_tile};
    use tile_store::{FailurePolicy, FetchError, FetchResult, PaletteImage};

    /// Serves one fixed body, or 404 when there is none.
    struct StaticFetcher {
        body: Option<Vec<u8>>,
        calls: AtomicUsize,
        urls: Mutex<Vec<String>>,
    }

    impl StaticFetcher {
        fn serving(body: Vec<u8>) -> Arc<Self> {
            Arc::new(Self {
                body: Some(body),
                calls: AtomicUsize::new(0),
                urls: Mutex::new(Vec::new()),
            })
        }

        fn missing() -> Arc<Self> {
            Arc::new(Self {
                body: None,
                calls: AtomicUsize::new(0),
                urls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TileFetcher for StaticFetcher {
        async fn fetch(&self, url: &str) -> FetchResult<PaletteImage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.urls.lock().unwrap().push(url.to_string());
            match &self.body {
                Some(body) => Ok(PaletteImage::decode(body)?),
                None => Err(FetchError::Status(404)),
            }
        }
    }

    fn naha() -> Location {
        Location::new(locations::NAHA.0, locations::NAHA.1)
    }

    fn kitakyushu() -> Location {
        Location::new(locations::KITAKYUSHU.0, locations::KITAKYUSHU.1)
    }

    fn jst_at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<FixedOffset> {
        jst().with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn weather_service(fetcher: Arc<StaticFetcher>) -> WeatherService {
        WeatherService::weather(&ServiceConfig::default(), fetcher)
    }

    #[tokio::test]
    async fn test_weather_reads_projected_pixel() {
        let fetcher = StaticFetcher::serving(tile_with_pixel(&palettes::WEATHER, 88, 149, 2));
        let service = weather_service(fetcher.clone());

        let report = service
            .resolve_weather_at(naha(), jst_at(2021, 8, 1, 6, 0))
            .await
            .unwrap();

        assert_eq!(report.weather, Weather::Cloudy);
        assert_eq!(report.details.tile_position.tile_x, 27);
        assert_eq!(report.details.tile_position.tile_y, 13);
        assert_eq!(report.details.observation_timestamp, "20210731080000");
        assert_eq!(report.details.forecast_timestamp, "20210731210000");
        assert_eq!(report.details.now, "2021/08/01 06:00:00");
        assert_eq!(report.details.utc, "2021/07/31 21:00:00");
        assert_eq!(
            report.details.image_url,
            "https://www.jma.go.jp/bosai/jmatile/data/wdist/20210731080000/none/20210731210000/surf/wm/5/27/13.png"
        );
        assert_eq!(*fetcher.urls.lock().unwrap(), vec![report.details.image_url.clone()]);
    }

    #[tokio::test]
    async fn test_missing_tile_reads_unknown() {
        let fetcher = StaticFetcher::missing();
        let service = weather_service(fetcher.clone());

        let report = service
            .resolve_weather_at(naha(), jst_at(2021, 8, 1, 6, 0))
            .await
            .unwrap();

        assert_eq!(report.weather, Weather::Unknown);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_non_indexed_tile_reads_unknown() {
        let pixels = vec![255u8; 256 * 256 * 4];
        let service = weather_service(StaticFetcher::serving(create_png_rgba(&pixels, 256, 256)));

        let report = service
            .resolve_weather_at(naha(), jst_at(2021, 8, 1, 6, 0))
            .await
            .unwrap();

        assert_eq!(report.weather, Weather::Unknown);
    }

    #[tokio::test]
    async fn test_out_of_table_index_is_decode_error() {
        let service = weather_service(StaticFetcher::serving(uniform_tile(&palettes::RAINFALL, 7)));

        let err = service
            .resolve_weather_at(naha(), jst_at(2021, 8, 1, 6, 0))
            .await
            .unwrap_err();

        assert!(err.is_decode_error());
        assert_eq!(
            err,
            LocationError::PaletteIndexOutOfRange {
                product: "weather",
                index: 7
            }
        );
    }

    #[tokio::test]
    async fn test_polar_location_is_rejected_without_fetch() {
        let fetcher = StaticFetcher::serving(uniform_tile(&palettes::WEATHER, 1));
        let service = weather_service(fetcher.clone());

        let north = Location::new(locations::NORTH_POLE.0, locations::NORTH_POLE.1);
        let err = service
            .resolve_weather_at(north, jst_at(2021, 8, 1, 6, 0))
            .await
            .unwrap_err();

        assert!(err.is_projection_error());
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_cache_reused_within_slot() {
        let fetcher = StaticFetcher::serving(uniform_tile(&palettes::WEATHER, 1));
        let service = weather_service(fetcher.clone());

        for minute in [0, 20, 59] {
            let report = service
                .resolve_weather_at(naha(), jst_at(2021, 8, 1, 6, minute))
                .await
                .unwrap();
            assert_eq!(report.weather, Weather::Sunny);
        }
        assert_eq!(fetcher.calls(), 1);

        // 09:00 starts the next slot.
        service
            .resolve_weather_at(naha(), jst_at(2021, 8, 1, 9, 0))
            .await
            .unwrap();
        assert_eq!(fetcher.calls(), 2);
        assert_eq!(service.cache().stats().hits(), 2);
    }

    #[tokio::test]
    async fn test_stamped_failure_not_retried_within_slot() {
        let fetcher = StaticFetcher::missing();
        let service = weather_service(fetcher.clone());

        for _ in 0..3 {
            service
                .resolve_weather_at(naha(), jst_at(2021, 8, 1, 6, 0))
                .await
                .unwrap();
        }
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_retry_policy_refetches_after_failure() {
        let fetcher = StaticFetcher::missing();
        let config = ServiceConfig {
            failure_policy: FailurePolicy::RetryOnNextRequest,
            ..ServiceConfig::default()
        };
        let service = WeatherService::weather(&config, fetcher.clone());

        for _ in 0..3 {
            service
                .resolve_weather_at(naha(), jst_at(2021, 8, 1, 6, 0))
                .await
                .unwrap();
        }
        assert_eq!(fetcher.calls(), 3);
    }

    #[tokio::test]
    async fn test_rainfall_lookup() {
        let fetcher = StaticFetcher::serving(uniform_tile(&palettes::RAINFALL, 8));
        let service = RainfallService::rainfall(&ServiceConfig::default(), fetcher);

        let report = service
            .resolve_rainfall_at(kitakyushu(), jst_at(2021, 8, 1, 0, 0))
            .await
            .unwrap();

        assert_eq!(report.rainfall, RainfallIntensity::Eighty);
        assert_eq!(report.details.tile_position.zoom, 9);
        assert_eq!(report.details.observation_timestamp, "20210731150000");
        assert_eq!(report.details.forecast_timestamp, "20210731150000");
        assert_eq!(
            report.details.image_url,
            "https://www.jma.go.jp/bosai/jmatile/data/nowc/20210731150000/none/20210731150000/surf/hrpns/9/442/204.png"
        );
    }

    #[tokio::test]
    async fn test_report_json_shape() {
        let service = weather_service(StaticFetcher::serving(uniform_tile(&palettes::WEATHER, 5)));
        let report = service
            .resolve_weather_at(naha(), jst_at(2021, 8, 1, 6, 0))
            .await
            .unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["weather"], "snow");
        assert_eq!(json["location"]["lat"], 26.206998);
        assert_eq!(json["tile_position"]["zoom"], 5);
        assert_eq!(json["tile_position"]["pixel_x"], 88);
        assert_eq!(json["tile_position"]["location"]["lon"], 127.65174);
        assert!(json["image_url"].as_str().unwrap().ends_with("/5/27/13.png"));
    }
}
