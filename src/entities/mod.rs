mod poi;

pub use poi::{NewPoi, Poi, PoiPatch};
