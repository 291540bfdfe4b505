use geo_types::Coord;

use crate::entities::Poi;
use crate::geo::{from_lon_lat, View};

/// Source image edge in pixels.
pub const ICON_SIZE: f64 = 600.0;
pub const ICON_SCALE: f64 = 0.05;

/// Icon anchor as a fraction of its size: bottom center.
pub const ICON_ANCHOR: Coord<f64> = Coord { x: 0.5, y: 1.0 };

/// A single POI drawn as a pin icon.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkerLayer {
    pub poi: Poi,
    /// Projected position of the icon anchor.
    pub position: Coord<f64>,
}

impl MarkerLayer {
    pub fn new(poi: Poi) -> Self {
        let position = from_lon_lat(poi.lon_lat());

        Self { poi, position }
    }

    /// Whether `pixel` falls inside the rendered icon, edges included.
    pub fn hit(&self, view: &View, pixel: Coord<f64>) -> bool {
        let anchor = view.coordinate_to_pixel(self.position);
        let size = ICON_SIZE * ICON_SCALE;

        let left = anchor.x - ICON_ANCHOR.x * size;
        let top = anchor.y - ICON_ANCHOR.y * size;

        pixel.x >= left && pixel.x <= left + size && pixel.y >= top && pixel.y <= top + size
    }
}

/// Marker layers drawn on top of the basemap. Replaced wholesale on reload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayerGroup {
    pub generation: u64,
    pub layers: Vec<MarkerLayer>,
}

impl LayerGroup {
    pub fn new(generation: u64, pois: Vec<Poi>) -> Self {
        Self {
            generation,
            layers: pois.into_iter().map(MarkerLayer::new).collect(),
        }
    }

    /// Topmost marker under `pixel`; later layers draw over earlier ones.
    pub fn feature_at_pixel(&self, view: &View, pixel: Coord<f64>) -> Option<&Poi> {
        self.layers
            .iter()
            .rev()
            .find(|layer| layer.hit(view, pixel))
            .map(|layer| &layer.poi)
    }
}
