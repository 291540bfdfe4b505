use async_channel::Receiver;
use futures::StreamExt;
use geo_types::Coord;

use super::Engine;
use crate::error::{invalid_input_error, Error};

/// User input reaching the map, in the order it happened.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Click(Coord<f64>),
    Title(String),
    Address(String),
    Submit,
    Cancel,
}

impl Event {
    /// Parses one command line: `click <x> <y>`, `title <text>`,
    /// `address <text>`, `submit` or `cancel`.
    pub fn parse(line: &str) -> Result<Self, Error> {
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        match command {
            "click" => {
                let mut parts = rest.split_whitespace().map(str::parse::<f64>);
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(Ok(x)), Some(Ok(y)), None) => Ok(Self::Click(Coord { x, y })),
                    _ => Err(invalid_input_error()),
                }
            }
            "title" => Ok(Self::Title(rest.into())),
            "address" => Ok(Self::Address(rest.into())),
            "submit" if rest.is_empty() => Ok(Self::Submit),
            "cancel" if rest.is_empty() => Ok(Self::Cancel),
            _ => Err(invalid_input_error()),
        }
    }
}

/// Loads the markers, then handles events one at a time until every sender is gone.
#[tracing::instrument(skip_all)]
pub async fn run(mut engine: Engine, events: Receiver<Event>) -> Engine {
    if let Err(err) = engine.load_pois().await {
        tracing::warn!("initial load failed: {}", err);
    }

    tracing::debug!(
        "basemap tiles in view: {:?}",
        engine.map().visible_tiles()
    );

    futures::pin_mut!(events);

    while let Some(event) = events.next().await {
        tracing::debug!("event: {:?}", event);

        if let Err(err) = engine.dispatch(event).await {
            tracing::warn!("event failed: {}", err);
        }
    }

    engine
}

#[test]
fn runs_until_senders_drop() {
    use crate::api::PoiAPI;
    use crate::geo::View;
    use crate::store::MemoryStore;
    use std::sync::Arc;
    use tokio_test::block_on;

    let store = Arc::new(MemoryStore::new());
    let engine = Engine::new(
        store.clone(),
        View::new(Coord { x: 9.0, y: 47.0 }, 10.0, Coord { x: 800.0, y: 600.0 }),
    );

    let (tx, rx) = async_channel::unbounded();
    for event in [
        Event::Click(Coord { x: 100.0, y: 100.0 }),
        Event::Title("Bench".into()),
        Event::Address("Park 1".into()),
        Event::Submit,
        Event::Click(Coord { x: 300.0, y: 300.0 }),
        Event::Submit,
        Event::Cancel,
    ] {
        block_on(tx.send(event)).unwrap();
    }
    drop(tx);

    let engine = block_on(run(engine, rx));

    let pois = block_on(store.list_pois()).unwrap();
    assert_eq!(pois.len(), 1);
    assert_eq!(pois[0].title, "Bench");
    assert_eq!(engine.map().pois().count(), 1);
    assert!(!engine.overlay().is_open());
}

#[test]
fn parses_commands() {
    assert_eq!(
        Event::parse("click 120 48.5").unwrap(),
        Event::Click(Coord { x: 120.0, y: 48.5 })
    );
    assert_eq!(
        Event::parse("title  Old Town Hall ").unwrap(),
        Event::Title("Old Town Hall".into())
    );
    assert_eq!(
        Event::parse("address Rathausplatz 1").unwrap(),
        Event::Address("Rathausplatz 1".into())
    );
    assert_eq!(Event::parse("submit").unwrap(), Event::Submit);
    assert_eq!(Event::parse(" cancel\n").unwrap(), Event::Cancel);
    assert_eq!(Event::parse("title").unwrap(), Event::Title(String::new()));
}

#[test]
fn rejects_unknown_commands() {
    assert!(Event::parse("click 1").is_err());
    assert!(Event::parse("click 1 2 3").is_err());
    assert!(Event::parse("click a b").is_err());
    assert!(Event::parse("delete 4").is_err());
    assert!(Event::parse("submit now").is_err());
    assert!(Event::parse("").is_err());
}
