//! Palette index to category tables.
//!
//! JMA tiles are palette-indexed PNGs; the palette slot of a pixel, not its
//! color, carries the meaning. Both tables are closed: an index outside the
//! table is a decode error, never a silent default.

use crate::{LocationError, LocationResult};
use serde::{Serialize, Serializer};

/// A category decoded from a tile palette index.
pub trait PaletteCategory: Sized + Copy + Send + Sync + 'static {
    /// Product name used in errors and logs.
    const PRODUCT: &'static str;

    fn from_palette_index(index: u8) -> LocationResult<Self>;
}

/// Weather forecast category (`wdist` tiles).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    Unknown,
    Sunny,
    Cloudy,
    Rainy,
    Sleet,
    Snow,
}

impl Weather {
    pub fn as_str(&self) -> &'static str {
        match self {
            Weather::Unknown => "unknown",
            Weather::Sunny => "sunny",
            Weather::Cloudy => "cloudy",
            Weather::Rainy => "rainy",
            Weather::Sleet => "sleet",
            Weather::Snow => "snow",
        }
    }
}

impl PaletteCategory for Weather {
    const PRODUCT: &'static str = "weather";

    fn from_palette_index(index: u8) -> LocationResult<Self> {
        match index {
            0 => Ok(Weather::Unknown),
            1 => Ok(Weather::Sunny),
            2 => Ok(Weather::Cloudy),
            3 => Ok(Weather::Rainy),
            4 => Ok(Weather::Sleet),
            5 => Ok(Weather::Snow),
            _ => Err(LocationError::PaletteIndexOutOfRange {
                product: Self::PRODUCT,
                index,
            }),
        }
    }
}

impl std::fmt::Display for Weather {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Nowcast rainfall intensity band (`nowc` tiles), in mm/h.
///
/// Serialized as the plain integer rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RainfallIntensity {
    Zero,
    One,
    Five,
    Ten,
    Twenty,
    Thirty,
    Fifty,
    Eighty,
    Hundred,
}

impl RainfallIntensity {
    pub fn mm_per_hour(&self) -> u8 {
        match self {
            RainfallIntensity::Zero => 0,
            RainfallIntensity::One => 1,
            RainfallIntensity::Five => 5,
            RainfallIntensity::Ten => 10,
            RainfallIntensity::Twenty => 20,
            RainfallIntensity::Thirty => 30,
            RainfallIntensity::Fifty => 50,
            RainfallIntensity::Eighty => 80,
            RainfallIntensity::Hundred => 100,
        }
    }
}

impl PaletteCategory for RainfallIntensity {
    const PRODUCT: &'static str = "rainfall";

    fn from_palette_index(index: u8) -> LocationResult<Self> {
        // Slots 0 and 1 both read as no rain.
        match index {
            0 | 1 => Ok(RainfallIntensity::Zero),
            2 => Ok(RainfallIntensity::One),
            3 => Ok(RainfallIntensity::Five),
            4 => Ok(RainfallIntensity::Ten),
            5 => Ok(RainfallIntensity::Twenty),
            6 => Ok(RainfallIntensity::Thirty),
            7 => Ok(RainfallIntensity::Fifty),
            8 => Ok(RainfallIntensity::Eighty),
            9 => Ok(RainfallIntensity::Hundred),
            _ => Err(LocationError::PaletteIndexOutOfRange {
                product: Self::PRODUCT,
                index,
            }),
        }
    }
}

impl Serialize for RainfallIntensity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.mm_per_hour())
    }
}

impl std::fmt::Display for RainfallIntensity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} mm/h", self.mm_per_hour())
    }
}
