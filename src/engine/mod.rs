mod event;

use geo_types::Coord;

use crate::{
    api::DynAPI,
    entities::Poi,
    error::Error,
    geo::View,
    map::{MapView, Overlay, State, Submission},
};

pub use event::{run, Event};

/// Outcome of a form submit.
#[derive(Clone, Debug, PartialEq)]
pub enum Submitted {
    /// Hidden overlay or an empty field; nothing was sent.
    Ignored,
    Created(Poi),
    Updated(Poi),
}

/// Drives the click → form → create/update → reload workflow.
pub struct Engine {
    api: DynAPI,
    map: MapView,
    overlay: Overlay,
}

impl Engine {
    pub fn new(api: DynAPI, view: View) -> Self {
        Self {
            api,
            map: MapView::new(view),
            overlay: Overlay::default(),
        }
    }

    pub fn map(&self) -> &MapView {
        &self.map
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    /// Refetches every POI and rebuilds the marker layers.
    #[tracing::instrument(name = "Engine::load_pois", skip_all)]
    pub async fn load_pois(&mut self) -> Result<usize, Error> {
        let pois = self.api.list_pois().await?;
        let count = pois.len();

        self.map.refresh(pois);

        tracing::info!("loaded {} pois", count);

        Ok(count)
    }

    #[tracing::instrument(name = "Engine::click", skip(self))]
    pub fn click(&mut self, pixel: Coord<f64>) -> State {
        let coordinate = self.map.coordinate_from_pixel(pixel);

        match self.map.feature_at_pixel(pixel) {
            Some(poi) => self.overlay.open_edit(coordinate, poi),
            None => self.overlay.open_create(coordinate),
        }

        self.overlay.state()
    }

    pub fn set_title(&mut self, title: String) {
        self.overlay.set_title(title);
    }

    pub fn set_address(&mut self, address: String) {
        self.overlay.set_address(address);
    }

    /// Sends the form. A failed write leaves the overlay open with the input
    /// intact. Once the write succeeds the overlay closes; a failed reload
    /// after that is logged and leaves the previous markers in place.
    #[tracing::instrument(name = "Engine::submit", skip(self))]
    pub async fn submit(&mut self) -> Result<Submitted, Error> {
        let submitted = match self.overlay.submission() {
            None => return Ok(Submitted::Ignored),
            Some(Submission::Update { id, patch }) => {
                Submitted::Updated(self.api.update_poi(id, patch).await?)
            }
            Some(Submission::Create(poi)) => Submitted::Created(self.api.create_poi(poi).await?),
        };

        self.overlay.close();

        if let Err(err) = self.load_pois().await {
            tracing::warn!("reload after submit failed: {}", err);
        }

        Ok(submitted)
    }

    pub fn cancel(&mut self) {
        self.overlay.close();
    }

    /// Removes a POI and reloads. Not reachable from the form.
    #[tracing::instrument(name = "Engine::delete", skip(self))]
    pub async fn delete(&mut self, id: i64) -> Result<(), Error> {
        self.api.delete_poi(id).await?;
        self.load_pois().await?;

        Ok(())
    }

    pub async fn dispatch(&mut self, event: Event) -> Result<(), Error> {
        match event {
            Event::Click(pixel) => {
                self.click(pixel);
            }
            Event::Title(title) => self.set_title(title),
            Event::Address(address) => self.set_address(address),
            Event::Submit => {
                self.submit().await?;
            }
            Event::Cancel => self.cancel(),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::PoiAPI;
    use crate::entities::{NewPoi, PoiPatch};
    use crate::error::upstream_error;
    use crate::geo::to_lon_lat;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio_test::block_on;

    #[derive(Clone, Debug, PartialEq)]
    enum Call {
        List,
        Create(NewPoi),
        Update(i64, PoiPatch),
        Delete(i64),
    }

    /// Store wrapper recording every call that reaches the backend.
    #[derive(Default)]
    struct Recorder {
        store: MemoryStore,
        calls: Mutex<Vec<Call>>,
        fail_writes: bool,
        fail_list: AtomicBool,
    }

    impl Recorder {
        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl PoiAPI for Recorder {
        async fn list_pois(&self) -> Result<Vec<Poi>, Error> {
            self.record(Call::List);
            if self.fail_list.load(Ordering::SeqCst) {
                return Err(upstream_error());
            }
            self.store.list_pois().await
        }

        async fn create_poi(&self, poi: NewPoi) -> Result<Poi, Error> {
            self.record(Call::Create(poi.clone()));
            if self.fail_writes {
                return Err(upstream_error());
            }
            self.store.create_poi(poi).await
        }

        async fn update_poi(&self, id: i64, patch: PoiPatch) -> Result<Poi, Error> {
            self.record(Call::Update(id, patch.clone()));
            if self.fail_writes {
                return Err(upstream_error());
            }
            self.store.update_poi(id, patch).await
        }

        async fn delete_poi(&self, id: i64) -> Result<(), Error> {
            self.record(Call::Delete(id));
            self.store.delete_poi(id).await
        }
    }

    fn view() -> View {
        View::new(
            Coord {
                x: 9.289173811645158,
                y: 47.389594468010614,
            },
            10.0,
            Coord { x: 800.0, y: 600.0 },
        )
    }

    /// POI whose marker anchor sits exactly on `pixel`.
    fn poi_at(id: i64, pixel: Coord<f64>) -> Poi {
        let lon_lat = to_lon_lat(view().pixel_to_coordinate(pixel));

        Poi {
            id,
            title: format!("Title {}", id),
            address: format!("Address {}", id),
            longitude: lon_lat.x,
            latitude: lon_lat.y,
        }
    }

    fn setup(recorder: Recorder) -> (Arc<Recorder>, Engine) {
        let recorder = Arc::new(recorder);
        let mut engine = Engine::new(recorder.clone(), view());
        block_on(engine.load_pois()).unwrap();
        recorder.calls.lock().unwrap().clear();

        (recorder, engine)
    }

    fn seeded() -> Recorder {
        Recorder {
            store: MemoryStore::with_pois(vec![poi_at(4, Coord { x: 200.0, y: 200.0 })]),
            ..Default::default()
        }
    }

    #[test]
    fn click_on_marker_opens_edit() {
        let (_, mut engine) = setup(seeded());

        let state = engine.click(Coord { x: 200.0, y: 190.0 });

        assert!(matches!(state, State::Edit { id: 4, .. }));
        assert_eq!(engine.overlay().id(), Some(4));
        assert_eq!(engine.overlay().form().title, "Title 4");
        assert_eq!(engine.overlay().form().address, "Address 4");
    }

    #[test]
    fn click_on_empty_space_clears_form() {
        let (_, mut engine) = setup(seeded());

        engine.click(Coord { x: 200.0, y: 190.0 });
        let state = engine.click(Coord { x: 600.0, y: 400.0 });

        assert!(matches!(state, State::Create { .. }));
        assert_eq!(engine.overlay().id(), None);
        assert!(engine.overlay().form().title.is_empty());
        assert!(engine.overlay().form().address.is_empty());
        assert_eq!(
            engine.overlay().position(),
            Some(view().pixel_to_coordinate(Coord { x: 600.0, y: 400.0 }))
        );
    }

    #[test]
    fn empty_fields_make_no_call() {
        let (recorder, mut engine) = setup(seeded());

        engine.click(Coord { x: 600.0, y: 400.0 });
        engine.set_title("Kiosk".into());

        assert_eq!(block_on(engine.submit()).unwrap(), Submitted::Ignored);
        assert!(recorder.calls.lock().unwrap().is_empty());
        assert!(engine.overlay().is_open());

        engine.set_title(String::new());
        engine.set_address("Seestrasse 5".into());

        assert_eq!(block_on(engine.submit()).unwrap(), Submitted::Ignored);
        assert!(recorder.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn submit_with_id_updates() {
        let (recorder, mut engine) = setup(seeded());

        engine.click(Coord { x: 200.0, y: 190.0 });
        engine.set_title("Renamed".into());

        let submitted = block_on(engine.submit()).unwrap();

        assert!(matches!(submitted, Submitted::Updated(ref poi) if poi.title == "Renamed"));
        assert_eq!(
            *recorder.calls.lock().unwrap(),
            vec![
                Call::Update(4, PoiPatch::new("Renamed".into(), "Address 4".into())),
                Call::List,
            ]
        );
        assert_eq!(engine.overlay().state(), State::Idle);
    }

    #[test]
    fn submit_without_id_creates_at_click() {
        let (recorder, mut engine) = setup(seeded());
        let pixel = Coord { x: 600.0, y: 400.0 };

        engine.click(pixel);
        engine.set_title("Kiosk".into());
        engine.set_address("Seestrasse 5".into());

        let created = match block_on(engine.submit()).unwrap() {
            Submitted::Created(poi) => poi,
            other => panic!("unexpected outcome {:?}", other),
        };

        let expected = to_lon_lat(view().pixel_to_coordinate(pixel));
        assert!((created.longitude - expected.x).abs() < 1e-9);
        assert!((created.latitude - expected.y).abs() < 1e-9);

        let calls = recorder.calls.lock().unwrap();
        assert!(matches!(calls[0], Call::Create(ref poi) if poi.title == "Kiosk"));
        assert_eq!(calls[1], Call::List);
        assert_eq!(calls.len(), 2);
    }

    #[test]
    fn successful_submit_rebuilds_markers() {
        let (recorder, mut engine) = setup(seeded());
        let before = engine.map().markers().unwrap().generation;

        // changed behind the engine's back; the reload must pick it up
        block_on(recorder.store.delete_poi(4)).unwrap();

        engine.click(Coord { x: 600.0, y: 400.0 });
        engine.set_title("Kiosk".into());
        engine.set_address("Seestrasse 5".into());
        block_on(engine.submit()).unwrap();

        let group = engine.map().markers().unwrap();
        assert_eq!(group.generation, before + 1);

        let server = block_on(recorder.store.list_pois()).unwrap();
        let drawn: Vec<Poi> = engine.map().pois().cloned().collect();
        assert_eq!(drawn, server);
        assert!(drawn.iter().all(|poi| poi.id != 4));
    }

    #[test]
    fn failed_write_keeps_overlay_open() {
        let (recorder, mut engine) = setup(Recorder {
            fail_writes: true,
            ..seeded()
        });

        engine.click(Coord { x: 600.0, y: 400.0 });
        engine.set_title("Kiosk".into());
        engine.set_address("Seestrasse 5".into());

        assert!(block_on(engine.submit()).is_err());
        assert!(engine.overlay().is_open());
        assert_eq!(engine.overlay().form().title, "Kiosk");
        assert_eq!(recorder.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn failed_reload_still_closes_overlay() {
        let (recorder, mut engine) = setup(seeded());

        engine.click(Coord { x: 600.0, y: 400.0 });
        engine.set_title("Kiosk".into());
        engine.set_address("Seestrasse 5".into());

        recorder.fail_list.store(true, Ordering::SeqCst);
        let submitted = block_on(engine.submit()).unwrap();
        assert!(matches!(submitted, Submitted::Created(ref poi) if poi.title == "Kiosk"));
        assert_eq!(engine.overlay().state(), State::Idle);

        // a repeated submit must not store the same POI twice
        recorder.fail_list.store(false, Ordering::SeqCst);
        assert_eq!(block_on(engine.submit()).unwrap(), Submitted::Ignored);

        let kiosks = block_on(recorder.store.list_pois())
            .unwrap()
            .into_iter()
            .filter(|poi| poi.title == "Kiosk")
            .count();
        assert_eq!(kiosks, 1);
    }

    #[test]
    fn cancel_discards_edits() {
        let (recorder, mut engine) = setup(seeded());

        engine.click(Coord { x: 200.0, y: 190.0 });
        engine.set_title("Unsaved".into());
        engine.cancel();

        assert_eq!(engine.overlay().state(), State::Idle);
        assert!(engine.overlay().form().title.is_empty());
        assert_eq!(block_on(engine.submit()).unwrap(), Submitted::Ignored);
        assert!(recorder.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn delete_reloads() {
        let (recorder, mut engine) = setup(seeded());

        block_on(engine.delete(4)).unwrap();

        assert_eq!(engine.map().pois().count(), 0);
        assert_eq!(
            *recorder.calls.lock().unwrap(),
            vec![Call::Delete(4), Call::List]
        );
    }
}
