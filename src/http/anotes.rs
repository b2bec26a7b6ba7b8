use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use obras_core::AnoteService;
use obras_domain::{Anote, AnoteInput};

use super::{parse_id, ApiError, AppState};

/// Entries of the project, newest first.
pub(super) async fn list(
    State(state): State<AppState>,
    Path(obra_id): Path<String>,
) -> Result<Json<Vec<Anote>>, ApiError> {
    let obra_id = parse_id(&obra_id)?;
    let anotes = state
        .with_store(move |store| AnoteService::list_for_obra(store, obra_id))
        .await?;
    Ok(Json(anotes))
}

pub(super) async fn create(
    State(state): State<AppState>,
    Path(obra_id): Path<String>,
    payload: Result<Json<AnoteInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Anote>), ApiError> {
    let obra_id = parse_id(&obra_id)?;
    let Json(input) = payload?;
    let clock = Arc::clone(&state.clock);
    let anote = state
        .with_store(move |store| AnoteService::create(store, &*clock, obra_id, input))
        .await?;
    Ok((StatusCode::CREATED, Json(anote)))
}

pub(super) async fn update(
    State(state): State<AppState>,
    Path((obra_id, anote_id)): Path<(String, String)>,
    payload: Result<Json<AnoteInput>, JsonRejection>,
) -> Result<Json<Anote>, ApiError> {
    let obra_id = parse_id(&obra_id)?;
    let anote_id = parse_id(&anote_id)?;
    let Json(input) = payload?;
    let anote = state
        .with_store(move |store| AnoteService::update(store, obra_id, anote_id, input))
        .await?;
    Ok(Json(anote))
}

pub(super) async fn remove(
    State(state): State<AppState>,
    Path((obra_id, anote_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let obra_id = parse_id(&obra_id)?;
    let anote_id = parse_id(&anote_id)?;
    state
        .with_store(move |store| AnoteService::delete(store, obra_id, anote_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
