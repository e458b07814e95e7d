use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::catalog::analytics::{
    self, HistogramBin, Kpis, OwnerCount, PositionFrame,
};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::state::AppState;

const TOP_OWNERS: usize = 10;

#[utoipa::path(
    get,
    path = "/api/snapshot",
    responses(
        (status = 200, description = "Today's ground tracks for the whole catalog", body = crate::cache::CatalogSnapshot),
        (status = 503, description = "No snapshot could be produced", body = ErrorResponse)
    ),
    tag = "snapshot"
)]
pub async fn get_snapshot(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let snapshot = state.cache.get_snapshot().await?;
    let body = snapshot
        .to_bytes()
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PositionsQuery {
    /// Grid index; defaults to the sample nearest to now.
    pub index: Option<usize>,
    /// Only objects with exactly this name.
    pub name: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/positions",
    params(PositionsQuery),
    responses(
        (status = 200, description = "Sub-satellite points at one grid instant", body = PositionFrame),
        (status = 400, description = "Index outside the grid", body = ErrorResponse),
        (status = 503, description = "No snapshot could be produced", body = ErrorResponse)
    ),
    tag = "snapshot"
)]
pub async fn positions(
    State(state): State<AppState>,
    Query(query): Query<PositionsQuery>,
) -> ApiResult<Json<PositionFrame>> {
    let snapshot = state.cache.get_snapshot().await?;
    let index = query
        .index
        .unwrap_or_else(|| snapshot.grid.nearest_index(state.cache.now()));

    let frame = analytics::positions_at(&snapshot, index, query.name.as_deref()).ok_or_else(
        || {
            ApiError::Validation(format!(
                "index {} outside grid of {} samples",
                index,
                snapshot.grid.len()
            ))
        },
    )?;
    Ok(Json(frame))
}

#[utoipa::path(
    get,
    path = "/api/objects",
    responses(
        (status = 200, description = "Sorted unique object names", body = Vec<String>),
        (status = 503, description = "No snapshot could be produced", body = ErrorResponse)
    ),
    tag = "snapshot"
)]
pub async fn object_names(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    let snapshot = state.cache.get_snapshot().await?;
    Ok(Json(analytics::object_names(&snapshot)))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyticsResponse {
    pub generated_on: NaiveDate,
    pub kpis: Kpis,
    pub top_owners: Vec<OwnerCount>,
    pub altitude_histogram: Vec<HistogramBin>,
    pub inclination_histogram: Vec<HistogramBin>,
}

#[utoipa::path(
    get,
    path = "/api/analytics",
    responses(
        (status = 200, description = "Catalog statistics", body = AnalyticsResponse),
        (status = 503, description = "No snapshot could be produced", body = ErrorResponse)
    ),
    tag = "snapshot"
)]
pub async fn analytics(State(state): State<AppState>) -> ApiResult<Json<AnalyticsResponse>> {
    let snapshot = state.cache.get_snapshot().await?;
    Ok(Json(AnalyticsResponse {
        generated_on: snapshot.generated_on,
        kpis: analytics::kpis(&snapshot),
        top_owners: analytics::owner_distribution(&snapshot, TOP_OWNERS),
        altitude_histogram: analytics::altitude_histogram(&snapshot),
        inclination_histogram: analytics::inclination_histogram(&snapshot),
    }))
}
