//! Coordinate types and great-circle distance.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in statute miles.
const EARTH_RADIUS_MILES: f64 = 3958.7613;

/// A point in signed decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

impl Point {
    #[must_use]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// True when both coordinates are finite numbers.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

/// A lat/lon rectangle used to bias a geocoding provider toward local results.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub south: f64,
    pub north: f64,
    pub west: f64,
    pub east: f64,
}

impl BoundingBox {
    /// Box centered on `center`, extending `lat_delta` degrees north/south and
    /// `lon_delta` degrees east/west.
    #[must_use]
    pub fn around(center: Point, lat_delta: f64, lon_delta: f64) -> Self {
        Self {
            south: center.lat - lat_delta,
            north: center.lat + lat_delta,
            west: center.lon - lon_delta,
            east: center.lon + lon_delta,
        }
    }
}

/// Great-circle distance between two points in statute miles.
///
/// The haversine formula is symmetric in its arguments and periodic in
/// longitude, so antimeridian-adjacent pairs need no special-casing.
#[must_use]
pub fn haversine_miles(a: Point, b: Point) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * h.sqrt().asin()
}
