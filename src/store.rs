use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

use crate::{
    api::PoiAPI,
    entities::{NewPoi, Poi, PoiPatch},
    error::{not_found_error, Error},
};

/// In-memory POI backend, ordered by id.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pois: Mutex<BTreeMap<i64, Poi>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pois(pois: impl IntoIterator<Item = Poi>) -> Self {
        Self {
            pois: Mutex::new(pois.into_iter().map(|poi| (poi.id, poi)).collect()),
        }
    }
}

#[async_trait]
impl PoiAPI for MemoryStore {
    #[tracing::instrument(skip(self))]
    async fn list_pois(&self) -> Result<Vec<Poi>, Error> {
        Ok(self.pois.lock().await.values().cloned().collect())
    }

    #[tracing::instrument(skip(self))]
    async fn create_poi(&self, poi: NewPoi) -> Result<Poi, Error> {
        let mut pois = self.pois.lock().await;

        let id = pois.keys().next_back().map_or(1, |last| last + 1);
        let poi = Poi::from_new(id, poi);
        pois.insert(id, poi.clone());

        tracing::info!("created poi {}", id);

        Ok(poi)
    }

    #[tracing::instrument(skip(self))]
    async fn update_poi(&self, id: i64, patch: PoiPatch) -> Result<Poi, Error> {
        let mut pois = self.pois.lock().await;

        let poi = pois.get_mut(&id).ok_or_else(not_found_error)?;
        poi.apply(patch);

        Ok(poi.clone())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_poi(&self, id: i64) -> Result<(), Error> {
        self.pois
            .lock()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(not_found_error)
    }
}
