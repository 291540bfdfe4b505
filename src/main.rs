use std::env;
use std::net::TcpListener;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use poimap::config::Config;
use poimap::engine::{self, Engine, Event};
use poimap::error::{invalid_input_error, unexpected_error, Error};
use poimap::external::PoiClient;
use poimap::server::serve;
use poimap::store::MemoryStore;

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;

    match env::args().nth(1).as_deref() {
        None | Some("serve") => {
            let listener = TcpListener::bind(config.listen_addr).map_err(unexpected_error)?;

            serve(MemoryStore::new(), listener).await
        }
        Some("edit") => edit(config).await,
        Some(other) => {
            tracing::error!("unknown command {:?}, expected serve or edit", other);
            Err(invalid_input_error())
        }
    }
}

/// Drives the map workflow against `POIMAP_API_BASE`, one command per stdin line.
async fn edit(config: Config) -> Result<(), Error> {
    let client = PoiClient::new(&config.api_base);
    let engine = Engine::new(Arc::new(client), config.view());

    let (tx, rx) = async_channel::unbounded();
    let session = tokio::spawn(engine::run(engine, rx));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.map_err(unexpected_error)? {
        if line.trim().is_empty() {
            continue;
        }

        match Event::parse(&line) {
            Ok(event) => tx.send(event).await.map_err(unexpected_error)?,
            Err(_) => tracing::warn!("ignoring {:?}", line),
        }
    }
    drop(tx);

    let engine = session.await.map_err(unexpected_error)?;
    tracing::info!("{} pois on the map", engine.map().pois().count());

    Ok(())
}
