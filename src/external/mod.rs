pub mod poi_client;

pub use poi_client::PoiClient;
