pub mod marker;
pub mod overlay;

use geo_types::Coord;

use crate::entities::Poi;
use crate::geo::{View, EARTH_RADIUS};

pub use marker::{LayerGroup, MarkerLayer};
pub use overlay::{Form, Overlay, State, Submission};

pub const OSM_TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Tiled basemap source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Basemap {
    pub url_template: String,
}

impl Default for Basemap {
    fn default() -> Self {
        Self {
            url_template: OSM_TILE_URL.into(),
        }
    }
}

impl Basemap {
    pub fn tile_url(&self, z: u32, x: u32, y: u32) -> String {
        self.url_template
            .replace("{z}", &z.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }
}

#[derive(Clone, Debug)]
pub struct MapView {
    pub view: View,
    pub basemap: Basemap,
    markers: Option<LayerGroup>,
    generation: u64,
}

impl MapView {
    pub fn new(view: View) -> Self {
        Self {
            view,
            basemap: Basemap::default(),
            markers: None,
            generation: 0,
        }
    }

    pub fn markers(&self) -> Option<&LayerGroup> {
        self.markers.as_ref()
    }

    pub fn pois(&self) -> impl Iterator<Item = &Poi> {
        self.markers
            .iter()
            .flat_map(|group| group.layers.iter().map(|layer| &layer.poi))
    }

    /// Drops the current marker group and builds a new one from `pois`.
    #[tracing::instrument(skip_all, fields(count = pois.len()))]
    pub fn refresh(&mut self, pois: Vec<Poi>) {
        self.generation += 1;
        self.markers = Some(LayerGroup::new(self.generation, pois));
    }

    pub fn coordinate_from_pixel(&self, pixel: Coord<f64>) -> Coord<f64> {
        self.view.pixel_to_coordinate(pixel)
    }

    /// Basemap tile URLs covering the viewport at the view's integer zoom.
    pub fn visible_tiles(&self) -> Vec<String> {
        let z = self.view.zoom.max(0.0).floor() as u32;
        let count = 1u32 << z;
        let half_world = std::f64::consts::PI * EARTH_RADIUS;
        let span = 2.0 * half_world / count as f64;

        let top_left = self.view.pixel_to_coordinate(Coord { x: 0.0, y: 0.0 });
        let bottom_right = self.view.pixel_to_coordinate(self.view.size);

        let index = |metres: f64| ((metres / span).floor().max(0.0) as u32).min(count - 1);

        let (min_x, max_x) = (index(top_left.x + half_world), index(bottom_right.x + half_world));
        let (min_y, max_y) = (index(half_world - top_left.y), index(half_world - bottom_right.y));

        (min_y..=max_y)
            .flat_map(|y| (min_x..=max_x).map(move |x| (x, y)))
            .map(|(x, y)| self.basemap.tile_url(z, x, y))
            .collect()
    }

    pub fn feature_at_pixel(&self, pixel: Coord<f64>) -> Option<&Poi> {
        self.markers
            .as_ref()
            .and_then(|group| group.feature_at_pixel(&self.view, pixel))
    }
}

#[test]
fn osm_tile_url() {
    assert_eq!(
        Basemap::default().tile_url(10, 538, 358),
        "https://tile.openstreetmap.org/10/538/358.png"
    );
}

#[test]
fn visible_tiles_cover_center() {
    let map = MapView::new(View::new(
        Coord {
            x: 9.289173811645158,
            y: 47.389594468010614,
        },
        10.0,
        Coord { x: 800.0, y: 600.0 },
    ));

    let tiles = map.visible_tiles();

    assert!(tiles.contains(&"https://tile.openstreetmap.org/10/538/358.png".to_string()));
    // 800x600 px spans at most 5x4 tiles of 256 px
    assert!(tiles.len() >= 4 && tiles.len() <= 20);
}

#[test]
fn visible_tiles_at_world_zoom() {
    let map = MapView::new(View::new(
        Coord { x: 0.0, y: 0.0 },
        0.0,
        Coord { x: 1024.0, y: 1024.0 },
    ));

    assert_eq!(
        map.visible_tiles(),
        vec!["https://tile.openstreetmap.org/0/0/0.png".to_string()]
    );
}

#[test]
fn refresh_replaces_group() {
    let mut map = MapView::new(View::new(
        Coord { x: 9.0, y: 47.0 },
        10.0,
        Coord { x: 800.0, y: 600.0 },
    ));
    assert!(map.markers().is_none());

    let poi = |id: i64| Poi {
        id,
        title: "t".into(),
        address: "a".into(),
        longitude: 9.0,
        latitude: 47.0,
    };

    map.refresh(vec![poi(1), poi(2)]);
    map.refresh(vec![poi(3)]);

    let group = map.markers().unwrap();
    assert_eq!(group.generation, 2);
    assert_eq!(map.pois().map(|poi| poi.id).collect::<Vec<_>>(), vec![3]);
}
