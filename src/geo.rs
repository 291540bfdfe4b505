//! Web Mercator (EPSG:3857) projection and view geometry.
//!
//! Projected coordinates are in metres, geographic coordinates are
//! `x = longitude`, `y = latitude` in degrees. Pixels grow right and down
//! from the top-left corner of the viewport.

use geo_types::Coord;
use std::f64::consts::PI;

pub const EARTH_RADIUS: f64 = 6378137.0;

/// Latitude beyond which Web Mercator diverges.
pub const MAX_LATITUDE: f64 = 85.0511287798;

/// Metres per pixel at zoom 0 for 256 px tiles.
pub const MAX_RESOLUTION: f64 = 156543.03392804097;

pub fn from_lon_lat(lon_lat: Coord<f64>) -> Coord<f64> {
    let lat = lon_lat.y.clamp(-MAX_LATITUDE, MAX_LATITUDE);

    Coord {
        x: EARTH_RADIUS * lon_lat.x.to_radians(),
        y: EARTH_RADIUS * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln(),
    }
}

pub fn to_lon_lat(coordinate: Coord<f64>) -> Coord<f64> {
    Coord {
        x: (coordinate.x / EARTH_RADIUS).to_degrees(),
        y: (2.0 * (coordinate.y / EARTH_RADIUS).exp().atan() - PI / 2.0).to_degrees(),
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct View {
    /// Projected center of the viewport.
    pub center: Coord<f64>,
    pub zoom: f64,
    /// Viewport size in pixels.
    pub size: Coord<f64>,
}

impl View {
    pub fn new(center_lon_lat: Coord<f64>, zoom: f64, size: Coord<f64>) -> Self {
        Self {
            center: from_lon_lat(center_lon_lat),
            zoom,
            size,
        }
    }

    pub fn resolution(&self) -> f64 {
        MAX_RESOLUTION / 2f64.powf(self.zoom)
    }

    pub fn pixel_to_coordinate(&self, pixel: Coord<f64>) -> Coord<f64> {
        let resolution = self.resolution();

        Coord {
            x: self.center.x + (pixel.x - self.size.x / 2.0) * resolution,
            y: self.center.y - (pixel.y - self.size.y / 2.0) * resolution,
        }
    }

    pub fn coordinate_to_pixel(&self, coordinate: Coord<f64>) -> Coord<f64> {
        let resolution = self.resolution();

        Coord {
            x: (coordinate.x - self.center.x) / resolution + self.size.x / 2.0,
            y: (self.center.y - coordinate.y) / resolution + self.size.y / 2.0,
        }
    }
}
