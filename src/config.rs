use geo_types::Coord;
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::error::{invalid_input_error, Error};
use crate::external::poi_client::DEFAULT_API_BASE;
use crate::geo::View;

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub api_base: String,
    pub listen_addr: SocketAddr,
    pub center: Coord<f64>,
    pub zoom: f64,
    pub viewport: Coord<f64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.into(),
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            center: Coord {
                x: 9.289173811645158,
                y: 47.389594468010614,
            },
            zoom: 10.0,
            viewport: Coord {
                x: 1280.0,
                y: 720.0,
            },
        }
    }
}

impl Config {
    /// Reads `POIMAP_*` variables, falling back to defaults for unset ones.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            api_base: lookup("POIMAP_API_BASE").unwrap_or(defaults.api_base),
            listen_addr: parse_or(&lookup, "POIMAP_LISTEN_ADDR", defaults.listen_addr)?,
            center: Coord {
                x: parse_or(&lookup, "POIMAP_CENTER_LON", defaults.center.x)?,
                y: parse_or(&lookup, "POIMAP_CENTER_LAT", defaults.center.y)?,
            },
            zoom: parse_or(&lookup, "POIMAP_ZOOM", defaults.zoom)?,
            viewport: Coord {
                x: parse_or(&lookup, "POIMAP_VIEWPORT_WIDTH", defaults.viewport.x)?,
                y: parse_or(&lookup, "POIMAP_VIEWPORT_HEIGHT", defaults.viewport.y)?,
            },
        })
    }

    pub fn view(&self) -> View {
        View::new(self.center, self.zoom, self.viewport)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, Error>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value.trim().parse().map_err(|_| {
            tracing::warn!("invalid value for {}: {:?}", key, value);
            invalid_input_error()
        }),
        None => Ok(default),
    }
}

#[test]
fn defaults_when_unset() {
    let config = Config::from_lookup(|_| None).unwrap();

    assert_eq!(config, Config::default());
    assert_eq!(config.api_base, "http://localhost:3000");
}

#[test]
fn reads_overrides() {
    let config = Config::from_lookup(|key| match key {
        "POIMAP_API_BASE" => Some("http://poi.example:8080".into()),
        "POIMAP_ZOOM" => Some("14".into()),
        "POIMAP_LISTEN_ADDR" => Some("0.0.0.0:4000".into()),
        _ => None,
    })
    .unwrap();

    assert_eq!(config.api_base, "http://poi.example:8080");
    assert_eq!(config.zoom, 14.0);
    assert_eq!(config.listen_addr.port(), 4000);
}

#[test]
fn rejects_malformed_numbers() {
    let err = Config::from_lookup(|key| match key {
        "POIMAP_CENTER_LAT" => Some("north".into()),
        _ => None,
    })
    .unwrap_err();

    assert_eq!(err, invalid_input_error());
}
