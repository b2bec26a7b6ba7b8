use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use serde::Deserialize;

use obras_core::{parse_reference_date, week_bounds, SummaryService};
use obras_domain::{Anote, BudgetTotals, WeekGroup};

use super::{parse_id, ApiError, AppState};

#[derive(Debug, Default, Deserialize)]
pub(super) struct WeekQuery {
    /// Any day of the wanted week; today when absent.
    fecha: Option<String>,
}

pub(super) async fn totals(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BudgetTotals>, ApiError> {
    let id = parse_id(&id)?;
    let totals = state
        .with_store(move |store| SummaryService::totals(store, id))
        .await?;
    Ok(Json(totals))
}

pub(super) async fn weeks(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<WeekGroup>>, ApiError> {
    let id = parse_id(&id)?;
    let offset = state.offset;
    let weeks = state
        .with_store(move |store| SummaryService::weeks(store, id, &offset))
        .await?;
    Ok(Json(weeks))
}

pub(super) async fn current_week(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: Result<Query<WeekQuery>, QueryRejection>,
) -> Result<Json<Vec<Anote>>, ApiError> {
    let id = parse_id(&id)?;
    let Query(query) = query?;
    let now = match query.fecha.as_deref().filter(|raw| !raw.trim().is_empty()) {
        Some(raw) => week_bounds(parse_reference_date(raw)?, &state.offset)?.start,
        None => state.now(),
    };
    let anotes = state
        .with_store(move |store| SummaryService::current_week(store, id, &now))
        .await?;
    Ok(Json(anotes))
}
