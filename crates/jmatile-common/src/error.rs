//! Error types for jmatile location lookups.

use thiserror::Error;

/// Result type alias using LocationError.
pub type LocationResult<T> = Result<T, LocationError>;

/// Primary error type for location lookups.
///
/// Fetch failures are not part of this type: they degrade to the
/// "no image" path inside the tile cache and never reach the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocationError {
    // === Projection Errors ===
    #[error("Latitude {0} is outside the Web Mercator domain (±85.0511°)")]
    LatitudeOutOfRange(f64),

    #[error("Longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    #[error("Unsupported zoom level: {0}")]
    UnsupportedZoom(u32),

    // === Decode Errors ===
    #[error("Palette index {index} is outside the {product} category table")]
    PaletteIndexOutOfRange { product: &'static str, index: u8 },
}

impl LocationError {
    /// Taxonomy code reported in error bodies.
    pub fn error_code(&self) -> &'static str {
        match self {
            LocationError::LatitudeOutOfRange(_)
            | LocationError::LongitudeOutOfRange(_)
            | LocationError::UnsupportedZoom(_) => "ProjectionError",
            LocationError::PaletteIndexOutOfRange { .. } => "DecodeError",
        }
    }

    pub fn is_projection_error(&self) -> bool {
        self.error_code() == "ProjectionError"
    }

    pub fn is_decode_error(&self) -> bool {
        self.error_code() == "DecodeError"
    }

    /// Get the HTTP status code for this error.
    ///
    /// A bad coordinate is the caller's fault; a bad palette index means the
    /// upstream tile is malformed.
    pub fn http_status_code(&self) -> u16 {
        match self {
            LocationError::LatitudeOutOfRange(_)
            | LocationError::LongitudeOutOfRange(_)
            | LocationError::UnsupportedZoom(_) => 400,

            LocationError::PaletteIndexOutOfRange { .. } => 502,
        }
    }
}
