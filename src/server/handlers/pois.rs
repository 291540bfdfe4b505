use axum::extract::{Extension, Json, Path};
use axum::http::StatusCode;
use serde_json::{json, Value};

use crate::entities::{NewPoi, Poi, PoiPatch};
use crate::error::Error;
use crate::server::DynAPI;

pub async fn list(Extension(api): Extension<DynAPI>) -> Result<Json<Vec<Poi>>, Error> {
    let pois = api.list_pois().await?;

    Ok(pois.into())
}

pub async fn create(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<NewPoi>,
) -> Result<(StatusCode, Json<Poi>), Error> {
    let poi = api.create_poi(params).await?;

    Ok((StatusCode::CREATED, poi.into()))
}

pub async fn update(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<i64>,
    Json(params): Json<PoiPatch>,
) -> Result<Json<Poi>, Error> {
    let poi = api.update_poi(id, params).await?;

    Ok(poi.into())
}

pub async fn delete(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, Error> {
    api.delete_poi(id).await?;

    Ok(json!({}).into())
}
