//! Common types and utilities shared by the jmatile location services.

pub mod category;
pub mod error;
pub mod location;
pub mod product;
pub mod tile;
pub mod time;

pub use category::{PaletteCategory, RainfallIntensity, Weather};
pub use error::{LocationError, LocationResult};
pub use location::Location;
pub use product::Product;
pub use tile::{TileBounds, TileCoordinate, TileKey};
pub use time::{jst, ScheduleResult};
