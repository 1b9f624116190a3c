//! JMA tile products served by the location API.

use chrono::{DateTime, TimeZone};
use serde::Serialize;

use crate::time::{resolve_forecast_schedule, resolve_rainfall_schedule};
use crate::{ScheduleResult, TileCoordinate};

/// A tile product: its zoom level, scheduling rule and URL layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Product {
    /// 3-hourly weather forecast distribution (`wdist/.../wm`)
    Weather,
    /// High-resolution precipitation nowcast (`nowc/.../hrpns`)
    Rainfall,
}

impl Product {
    pub fn name(&self) -> &'static str {
        match self {
            Product::Weather => "weather",
            Product::Rainfall => "rainfall",
        }
    }

    /// Fixed zoom level the product is requested at.
    pub fn zoom(&self) -> u32 {
        match self {
            Product::Weather => 5,
            Product::Rainfall => 9,
        }
    }

    pub fn schedule<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> ScheduleResult {
        match self {
            Product::Weather => resolve_forecast_schedule(now),
            Product::Rainfall => resolve_rainfall_schedule(now),
        }
    }

    /// Dataset directory under `/bosai/jmatile/data/`.
    pub fn dataset(&self) -> &'static str {
        match self {
            Product::Weather => "wdist",
            Product::Rainfall => "nowc",
        }
    }

    /// Element name after `surf/`.
    pub fn element(&self) -> &'static str {
        match self {
            Product::Weather => "wm",
            Product::Rainfall => "hrpns",
        }
    }

    /// Build the tile URL for a schedule and projected coordinate.
    ///
    /// `base_url` is scheme plus host, e.g. `https://www.jma.go.jp`.
    pub fn tile_url(&self, base_url: &str, schedule: &ScheduleResult, tile: &TileCoordinate) -> String {
        format!(
            "{}/bosai/jmatile/data/{}/{}/none/{}/surf/{}/{}/{}/{}.png",
            base_url.trim_end_matches('/'),
            self.dataset(),
            schedule.observation_timestamp,
            schedule.forecast_timestamp,
            self.element(),
            tile.zoom,
            tile.tile_x,
            tile.tile_y,
        )
    }
}

impl std::fmt::Display for Product {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Location;

    const JMA: &str = "https://www.jma.go.jp";

    fn schedule(observation: &str, forecast: &str) -> ScheduleResult {
        ScheduleResult {
            observation_timestamp: observation.to_string(),
            forecast_timestamp: forecast.to_string(),
        }
    }

    #[test]
    fn test_weather_url() {
        let tile = TileCoordinate::project(Location::new(26.206998, 127.65174), 5).unwrap();
        let url = Product::Weather.tile_url(JMA, &schedule("20210731080000", "20210731180000"), &tile);
        assert_eq!(
            url,
            "https://www.jma.go.jp/bosai/jmatile/data/wdist/20210731080000/none/20210731180000/surf/wm/5/27/13.png"
        );

        let tile = TileCoordinate::project(Location::new(26.206998, 127.65174), 4).unwrap();
        let url = Product::Weather.tile_url(JMA, &schedule("20210801080000", "20210801150000"), &tile);
        assert_eq!(
            url,
            "https://www.jma.go.jp/bosai/jmatile/data/wdist/20210801080000/none/20210801150000/surf/wm/4/13/6.png"
        );
    }

    #[test]
    fn test_rainfall_url() {
        let tile = TileCoordinate::project(Location::new(33.903307, 130.933741), 9).unwrap();
        let url = Product::Rainfall.tile_url(
            "https://www.jma.go.jp/",
            &schedule("20210731150000", "20210731150000"),
            &tile,
        );
        assert_eq!(
            url,
            "https://www.jma.go.jp/bosai/jmatile/data/nowc/20210731150000/none/20210731150000/surf/hrpns/9/442/204.png"
        );
    }

    #[test]
    fn test_zoom_levels() {
        assert_eq!(Product::Weather.zoom(), 5);
        assert_eq!(Product::Rainfall.zoom(), 9);
    }
}
