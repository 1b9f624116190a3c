//! Property sweeps over the tile projection.

use jmatile_common::tile::MAX_LATITUDE;
use jmatile_common::{Location, Product, TileCoordinate};

// ============================================================================
// Helpers
// ============================================================================

fn sample_locations() -> Vec<Location> {
    let mut locations = Vec::new();
    let mut lat = -MAX_LATITUDE;
    while lat <= MAX_LATITUDE {
        let mut lon = -180.0;
        while lon <= 180.0 {
            locations.push(Location::new(lat, lon));
            lon += 7.3;
        }
        lat += 3.1;
    }
    locations.push(Location::new(MAX_LATITUDE, 180.0));
    locations.push(Location::new(-MAX_LATITUDE, -180.0));
    locations
}

// ============================================================================
// Range invariants
// ============================================================================

#[test]
fn test_indices_and_pixels_in_range() {
    for zoom in [0, 1, 5, 9, 15] {
        let n = 2u32.pow(zoom);
        for location in sample_locations() {
            let coord = TileCoordinate::project(location, zoom).unwrap();
            assert!(coord.tile_x < n, "{location:?} z{zoom} tile_x {}", coord.tile_x);
            assert!(coord.tile_y < n, "{location:?} z{zoom} tile_y {}", coord.tile_y);
            assert!(coord.pixel_x <= 255);
            assert!(coord.pixel_y <= 255);
        }
    }
}

#[test]
fn test_projection_is_deterministic() {
    for location in sample_locations() {
        let a = TileCoordinate::project(location, 9).unwrap();
        let b = TileCoordinate::project(location, 9).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn test_projected_points_inside_their_tile() {
    let japan = [
        Location::new(43.06417, 141.34694), // Sapporo
        Location::new(35.68944, 139.69167), // Tokyo
        Location::new(34.68639, 135.52),    // Osaka
        Location::new(26.2125, 127.68111),  // Naha
    ];
    for product in [Product::Weather, Product::Rainfall] {
        for location in japan {
            let coord = TileCoordinate::project(location, product.zoom()).unwrap();
            assert!(
                coord.bounds().contains(&location),
                "{location:?} not inside {:?}",
                coord.bounds()
            );
        }
    }
}

// ============================================================================
// Domain boundary
// ============================================================================

#[test]
fn test_domain_boundary() {
    assert!(TileCoordinate::project(Location::new(MAX_LATITUDE, 0.0), 5).is_ok());
    assert!(TileCoordinate::project(Location::new(-MAX_LATITUDE, 0.0), 5).is_ok());
    assert!(TileCoordinate::project(Location::new(85.06, 0.0), 5).is_err());
    assert!(TileCoordinate::project(Location::new(0.0, -180.0001), 5).is_err());
    assert!(TileCoordinate::project(Location::new(0.0, f64::NAN), 5).is_err());
}
