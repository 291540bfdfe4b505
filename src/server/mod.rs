mod handlers;

use std::net::TcpListener;
use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, patch},
    Router,
};

use crate::api::PoiAPI;
use crate::error::{unexpected_error, Error};
use crate::server::handlers::pois;

pub(crate) type DynAPI = crate::api::DynAPI;

pub fn router<T: PoiAPI + Sync + Send + 'static>(api: T) -> Router {
    let api = Arc::new(api) as DynAPI;

    Router::new()
        .route("/pois", get(pois::list).post(pois::create))
        .route("/pois/:id", patch(pois::update).delete(pois::delete))
        .layer(Extension(api))
}

/// Serves the POI endpoints on an already bound listener until the task is dropped.
pub async fn serve<T: PoiAPI + Sync + Send + 'static>(
    api: T,
    listener: TcpListener,
) -> Result<(), Error> {
    let app = router(api);

    listener.set_nonblocking(true).map_err(unexpected_error)?;
    let addr = listener.local_addr().map_err(unexpected_error)?;

    tracing::info!("listening on {}", addr);

    axum::Server::from_tcp(listener)
        .map_err(unexpected_error)?
        .serve(app.into_make_service())
        .await
        .map_err(unexpected_error)
}
