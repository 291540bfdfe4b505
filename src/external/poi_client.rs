use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::{
    api::PoiAPI,
    entities::{NewPoi, Poi, PoiPatch},
    error::{invalid_input_error, not_found_error, upstream_error, Error},
};

pub const DEFAULT_API_BASE: &str = "http://localhost:3000";

/// REST client for a backend exposing `/pois`.
#[derive(Clone, Debug)]
pub struct PoiClient {
    client: reqwest::Client,
    url: String,
}

impl PoiClient {
    pub fn new(api_base: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!("{}/pois", api_base.trim_end_matches('/')),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn item_url(&self, id: i64) -> String {
        format!("{}/{}", self.url, id)
    }
}

impl Default for PoiClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

fn check_status(res: Response) -> Result<Response, Error> {
    let status = res.status();

    if status.is_success() {
        return Ok(res);
    }

    tracing::warn!("poi backend responded with {}", status);

    if status == StatusCode::NOT_FOUND {
        Err(not_found_error())
    } else if status.is_client_error() {
        Err(invalid_input_error())
    } else {
        Err(upstream_error())
    }
}

async fn parse<T: DeserializeOwned>(res: Response) -> Result<T, Error> {
    Ok(check_status(res)?.json().await?)
}

#[async_trait]
impl PoiAPI for PoiClient {
    #[tracing::instrument(skip(self))]
    async fn list_pois(&self) -> Result<Vec<Poi>, Error> {
        let res = self.client.get(&self.url).send().await?;

        parse(res).await
    }

    #[tracing::instrument(skip(self))]
    async fn create_poi(&self, poi: NewPoi) -> Result<Poi, Error> {
        let res = self.client.post(&self.url).json(&poi).send().await?;

        parse(res).await
    }

    #[tracing::instrument(skip(self))]
    async fn update_poi(&self, id: i64, patch: PoiPatch) -> Result<Poi, Error> {
        let res = self
            .client
            .patch(self.item_url(id))
            .json(&patch)
            .send()
            .await?;

        parse(res).await
    }

    #[tracing::instrument(skip(self))]
    async fn delete_poi(&self, id: i64) -> Result<(), Error> {
        let res = self.client.delete(self.item_url(id)).send().await?;

        check_status(res)?;

        Ok(())
    }
}

#[test]
fn builds_endpoint_urls() {
    let client = PoiClient::new("http://localhost:3000/");

    assert_eq!(client.url(), "http://localhost:3000/pois");
    assert_eq!(client.item_url(12), "http://localhost:3000/pois/12");
}

#[test]
fn default_targets_local_backend() {
    assert_eq!(PoiClient::default().url(), "http://localhost:3000/pois");
}

#[test]
fn unreachable_backend_is_reqwest_error() {
    use tokio_test::block_on;

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = PoiClient::new(&format!("http://127.0.0.1:{}", port));

    let err = block_on(client.list_pois()).unwrap_err();
    assert_eq!(err.code, 3);
}
