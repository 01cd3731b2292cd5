use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{AddProductRequest, CreatePvzRequest, ListPvzQuery, OpenReceptionRequest};
use crate::{
    error::Result,
    extract::{AppJson, AppPath, AppQuery},
    models::{PickupPoint, Principal, Product, Reception},
    state::AppState,
};

pub fn pvz_routes() -> Router<AppState> {
    Router::new()
        .route("/pvz", post(create_pvz).get(list_pvz))
        .route("/pvz/:pvz_id/delete_last_product", post(delete_last_product))
        .route("/pvz/:pvz_id/close_last_reception", post(close_last_reception))
}

pub fn reception_routes() -> Router<AppState> {
    Router::new()
        .route("/receptions", post(open_reception))
        .route("/products", post(add_product))
}

#[instrument(skip(state))]
pub async fn create_pvz(
    State(state): State<AppState>,
    principal: Principal,
    AppJson(body): AppJson<CreatePvzRequest>,
) -> Result<(StatusCode, Json<PickupPoint>)> {
    let pvz = state.pvz.create_pickup_point(&principal, &body.city).await?;
    Ok((StatusCode::CREATED, Json(pvz)))
}

#[instrument(skip(state))]
pub async fn list_pvz(
    State(state): State<AppState>,
    principal: Principal,
    AppQuery(query): AppQuery<ListPvzQuery>,
) -> Result<Json<Vec<PickupPoint>>> {
    let list = state
        .pvz
        .list_pickup_points(&principal, query.into())
        .await?;
    Ok(Json(list))
}

#[instrument(skip(state))]
pub async fn open_reception(
    State(state): State<AppState>,
    principal: Principal,
    AppJson(body): AppJson<OpenReceptionRequest>,
) -> Result<(StatusCode, Json<Reception>)> {
    let reception = state.pvz.open_reception(&principal, body.pvz_id).await?;
    Ok((StatusCode::CREATED, Json(reception)))
}

#[instrument(skip(state))]
pub async fn add_product(
    State(state): State<AppState>,
    principal: Principal,
    AppJson(body): AppJson<AddProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = state
        .pvz
        .add_product(&principal, body.pvz_id, &body.kind)
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

#[instrument(skip(state))]
pub async fn delete_last_product(
    State(state): State<AppState>,
    principal: Principal,
    AppPath(pvz_id): AppPath<Uuid>,
) -> Result<StatusCode> {
    state.pvz.delete_last_product(&principal, pvz_id).await?;
    Ok(StatusCode::OK)
}

#[instrument(skip(state))]
pub async fn close_last_reception(
    State(state): State<AppState>,
    principal: Principal,
    AppPath(pvz_id): AppPath<Uuid>,
) -> Result<Json<Reception>> {
    let reception = state.pvz.close_last_reception(&principal, pvz_id).await?;
    Ok(Json(reception))
}
