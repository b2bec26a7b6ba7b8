use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use obras_core::ObraService;
use obras_domain::{Obra, ObraInput};

use super::{parse_id, ApiError, AppState};

pub(super) async fn list(State(state): State<AppState>) -> Result<Json<Vec<Obra>>, ApiError> {
    let obras = state.with_store(|store| ObraService::list(store)).await?;
    Ok(Json(obras))
}

pub(super) async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Obra>, ApiError> {
    let id = parse_id(&id)?;
    let obra = state.with_store(move |store| ObraService::get(store, id)).await?;
    Ok(Json(obra))
}

pub(super) async fn create(
    State(state): State<AppState>,
    payload: Result<Json<ObraInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Obra>), ApiError> {
    let Json(input) = payload?;
    let obra = state
        .with_store(move |store| ObraService::create(store, input))
        .await?;
    Ok((StatusCode::CREATED, Json(obra)))
}

pub(super) async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ObraInput>, JsonRejection>,
) -> Result<Json<Obra>, ApiError> {
    let id = parse_id(&id)?;
    let Json(input) = payload?;
    let obra = state
        .with_store(move |store| ObraService::update(store, id, input))
        .await?;
    Ok(Json(obra))
}

/// Deletes the project together with all of its entries.
pub(super) async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    let removed = state
        .with_store(move |store| ObraService::delete(store, id))
        .await?;
    info!(obra_id = id, anotes_removed = removed, "obra removed over http");
    Ok(StatusCode::NO_CONTENT)
}
