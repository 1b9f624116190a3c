//! Common test fixtures for jmatile-location tests.
//!
//! Reference points and timestamps taken from real JMA tile lookups.

/// Reference locations as (latitude, longitude).
pub mod locations {
    /// Naha, Okinawa. Weather zoom 5 → tile 27/13, pixel (88, 149).
    pub const NAHA: (f64, f64) = (26.206998, 127.65174);

    /// Kitakyushu. Rainfall zoom 9 → tile 442/204.
    pub const KITAKYUSHU: (f64, f64) = (33.903307, 130.933741);

    /// Null island. Weather zoom 5 → tile 16/16, pixel (0, 0).
    pub const NULL_ISLAND: (f64, f64) = (0.0, 0.0);

    /// North of the Web Mercator limit; must be rejected.
    pub const NORTH_POLE: (f64, f64) = (89.9, 0.0);
}

/// Common tile palettes (RGB).
pub mod palettes {
    /// Weather forecast palette: unknown, sunny, cloudy, rainy, sleet, snow.
    pub const WEATHER: [(u8, u8, u8); 6] = [
        (0, 0, 0),
        (255, 170, 0),
        (170, 170, 170),
        (0, 65, 255),
        (160, 210, 255),
        (242, 242, 255),
    ];

    /// Rainfall nowcast palette, index 0..=9.
    pub const RAINFALL: [(u8, u8, u8); 10] = [
        (0, 0, 0),
        (242, 242, 255),
        (160, 210, 255),
        (33, 140, 255),
        (0, 65, 255),
        (250, 245, 0),
        (255, 153, 0),
        (255, 40, 0),
        (180, 0, 104),
        (102, 0, 64),
    ];
}
