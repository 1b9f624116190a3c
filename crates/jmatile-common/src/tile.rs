//! Web Mercator tile projection.
//!
//! Maps a latitude/longitude onto the XYZ tile grid used by the JMA tile
//! service: which 256x256 tile contains the point, and which pixel inside it.

use crate::{Location, LocationError, LocationResult};
use serde::{Deserialize, Serialize};

/// Tile edge length in pixels.
pub const TILE_SIZE: u32 = 256;

/// Latitude where the Web Mercator square ends (`atan(sinh(π))`).
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Deepest zoom whose grid still fits in `u32` indices.
pub const MAX_ZOOM: u32 = 30;

/// Identity of a tile within one zoom level; used as the cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileKey {
    pub x: u32,
    pub y: u32,
}

impl TileKey {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for TileKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.x, self.y)
    }
}

/// A location projected onto the tile grid at a fixed zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TileCoordinate {
    pub location: Location,
    pub zoom: u32,
    /// Fractional global column
    pub x: f64,
    /// Fractional global row
    pub y: f64,
    pub tile_x: u32,
    pub tile_y: u32,
    /// Column inside the tile, 0..=255
    pub pixel_x: u32,
    /// Row inside the tile, 0..=255
    pub pixel_y: u32,
}

impl TileCoordinate {
    /// Project a location at the given zoom.
    ///
    /// Latitudes beyond ±[`MAX_LATITUDE`] are rejected: `tan` diverges toward
    /// the poles and the resulting row would be off the grid.
    pub fn project(location: Location, zoom: u32) -> LocationResult<Self> {
        validate_location(&location)?;
        if zoom > MAX_ZOOM {
            return Err(LocationError::UnsupportedZoom(zoom));
        }

        let n = 2u32.pow(zoom) as f64;
        let lat_rad = location.latitude.to_radians();
        let x = (location.longitude + 180.0) / 360.0 * n;
        let y = (1.0 - lat_rad.tan().asinh() / std::f64::consts::PI) / 2.0 * n;

        let (tile_x, pixel_x) = split_axis(x, zoom);
        let (tile_y, pixel_y) = split_axis(y, zoom);

        Ok(Self {
            location,
            zoom,
            x,
            y,
            tile_x,
            tile_y,
            pixel_x,
            pixel_y,
        })
    }

    pub fn key(&self) -> TileKey {
        TileKey::new(self.tile_x, self.tile_y)
    }

    /// Geographic extent of the tile containing this coordinate.
    pub fn bounds(&self) -> TileBounds {
        TileBounds::for_tile(self.zoom, self.tile_x, self.tile_y)
    }
}

/// Reject coordinates outside the projection's numeric domain.
pub fn validate_location(location: &Location) -> LocationResult<()> {
    let lat = location.latitude;
    if !lat.is_finite() || lat.abs() > MAX_LATITUDE {
        return Err(LocationError::LatitudeOutOfRange(lat));
    }
    let lon = location.longitude;
    if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
        return Err(LocationError::LongitudeOutOfRange(lon));
    }
    Ok(())
}

/// Split a fractional grid position into (tile index, pixel offset).
///
/// Positions on the far edge (longitude 180, latitude limit) are pulled back
/// into the last tile so indices always stay inside the grid.
fn split_axis(value: f64, zoom: u32) -> (u32, u32) {
    let last_tile = 2u32.pow(zoom) - 1;
    let value = value.max(0.0);
    let tile = (value.floor() as u32).min(last_tile);
    let pixel = ((value - tile as f64) * TILE_SIZE as f64).floor() as u32;
    (tile, pixel.min(TILE_SIZE - 1))
}

/// Lat/lon extent of a single tile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TileBounds {
    pub lon_min: f64,
    pub lat_min: f64,
    pub lon_max: f64,
    pub lat_max: f64,
}

impl TileBounds {
    /// Convert Web Mercator tile coordinates to lat/lon bounds.
    pub fn for_tile(zoom: u32, tile_x: u32, tile_y: u32) -> Self {
        let n = 2u32.pow(zoom) as f64;

        let lon_min = tile_x as f64 / n * 360.0 - 180.0;
        let lon_max = (tile_x as f64 + 1.0) / n * 360.0 - 180.0;

        let lat_max = (std::f64::consts::PI * (1.0 - 2.0 * tile_y as f64 / n))
            .sinh()
            .atan()
            .to_degrees();
        let lat_min = (std::f64::consts::PI * (1.0 - 2.0 * (tile_y as f64 + 1.0) / n))
            .sinh()
            .atan()
            .to_degrees();

        Self {
            lon_min,
            lat_min,
            lon_max,
            lat_max,
        }
    }

    pub fn contains(&self, location: &Location) -> bool {
        (self.lon_min..=self.lon_max).contains(&location.longitude)
            && (self.lat_min..=self.lat_max).contains(&location.latitude)
    }
}
