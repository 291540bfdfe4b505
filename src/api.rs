use async_trait::async_trait;
use std::sync::Arc;

use crate::entities::{NewPoi, Poi, PoiPatch};
use crate::error::Error;

#[async_trait]
pub trait PoiAPI {
    async fn list_pois(&self) -> Result<Vec<Poi>, Error>;
    async fn create_poi(&self, poi: NewPoi) -> Result<Poi, Error>;
    async fn update_poi(&self, id: i64, patch: PoiPatch) -> Result<Poi, Error>;
    async fn delete_poi(&self, id: i64) -> Result<(), Error>;
}

pub type DynAPI = Arc<dyn PoiAPI + Send + Sync>;
