use geo_types::Coord;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Poi {
    pub id: i64,
    pub title: String,
    pub address: String,
    pub longitude: f64,
    pub latitude: f64,
}

/// Body of a create request. The backend assigns the id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewPoi {
    pub title: String,
    pub address: String,
    pub longitude: f64,
    pub latitude: f64,
}

/// Partial update; only the descriptive fields can change.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PoiPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Poi {
    pub fn from_new(id: i64, new: NewPoi) -> Self {
        Self {
            id,
            title: new.title,
            address: new.address,
            longitude: new.longitude,
            latitude: new.latitude,
        }
    }

    /// Geographic position, x = longitude, y = latitude.
    pub fn lon_lat(&self) -> Coord<f64> {
        Coord {
            x: self.longitude,
            y: self.latitude,
        }
    }

    pub fn apply(&mut self, patch: PoiPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }

        if let Some(address) = patch.address {
            self.address = address;
        }
    }
}

impl NewPoi {
    pub fn new(title: String, address: String, lon_lat: Coord<f64>) -> Self {
        Self {
            title,
            address,
            longitude: lon_lat.x,
            latitude: lon_lat.y,
        }
    }
}

impl PoiPatch {
    pub fn new(title: String, address: String) -> Self {
        Self {
            title: Some(title),
            address: Some(address),
        }
    }
}

#[test]
fn patch_skips_absent_fields() {
    let patch = PoiPatch {
        title: Some("Bakery".into()),
        address: None,
    };

    let body = serde_json::to_value(&patch).unwrap();
    assert_eq!(body, serde_json::json!({ "title": "Bakery" }));
}

#[test]
fn apply_patch_keeps_position() {
    let mut poi = Poi {
        id: 7,
        title: "Old".into(),
        address: "Somewhere 1".into(),
        longitude: 9.3,
        latitude: 47.4,
    };

    poi.apply(PoiPatch {
        title: None,
        address: Some("Elsewhere 2".into()),
    });

    assert_eq!(poi.title, "Old");
    assert_eq!(poi.address, "Elsewhere 2");
    assert_eq!(poi.lon_lat(), Coord { x: 9.3, y: 47.4 });
}

#[test]
fn poi_wire_format() {
    let poi: Poi = serde_json::from_str(
        r#"{"id":3,"title":"Cafe","address":"Main St 4","longitude":9.28,"latitude":47.38}"#,
    )
    .unwrap();

    assert_eq!(poi.id, 3);
    assert_eq!(poi.title, "Cafe");
    assert_eq!(poi.address, "Main St 4");
}
