//! Last-known location handlers

use super::types::LocateQuery;
use crate::{AppState, WebResult};
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use locator_core::AddressLookup;
use tracing::info;

/// Look up the address of one shared location, or all of them
#[utoipa::path(
    get,
    path = "/loc",
    tag = "Location",
    summary = "Last-known address",
    description = "Address of the `idx`-th shared location (1-based, default 1). \
                   An index below 1 returns every record keyed by position. \
                   Lookup failures are reported as `{\"error\": ...}` bodies.",
    params(LocateQuery),
    responses(
        (status = 200, description = "Address record, map of records, or error map", content_type = "application/json"),
        (status = 502, description = "The account session could not be established")
    )
)]
pub async fn locate(
    State(state): State<AppState>,
    Query(query): Query<LocateQuery>,
) -> WebResult<Json<AddressLookup>> {
    lookup(&state, query.idx.unwrap_or(1)).await
}

/// Path form of [`locate`]
#[utoipa::path(
    get,
    path = "/loc/{idx}",
    tag = "Location",
    params(("idx" = i64, Path, description = "1-based index; below 1 returns every record")),
    responses(
        (status = 200, description = "Address record, map of records, or error map", content_type = "application/json"),
        (status = 502, description = "The account session could not be established")
    )
)]
pub async fn locate_index(
    State(state): State<AppState>,
    Path(idx): Path<i64>,
) -> WebResult<Json<AddressLookup>> {
    lookup(&state, idx).await
}

async fn lookup(state: &AppState, idx: i64) -> WebResult<Json<AddressLookup>> {
    let result = state.sessions.fetch_address(idx).await?;
    info!(idx, error = result.is_error(), "Served location lookup");
    Ok(Json(result))
}
