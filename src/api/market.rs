use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::AppState;
use super::error::{ApiError, ApiResult};
use crate::core::asset::{CatalogEntry, Category};
use crate::core::service::{DEFAULT_INTERVAL, DEFAULT_RANGE};
use crate::core::{HistorySeries, Snapshot};

/// Catalog grouped by category, `{symbol, name}` per entry.
async fn get_market_config(
    State(state): State<Arc<AppState>>,
) -> Json<BTreeMap<Category, Vec<CatalogEntry>>> {
    Json(state.market.registry().catalog())
}

async fn get_snapshot(State(state): State<Arc<AppState>>) -> ApiResult<Json<Snapshot>> {
    let snapshot = state
        .market
        .snapshot()
        .await
        .map_err(ApiError::Snapshot)?;
    Ok(Json(snapshot))
}

#[derive(Deserialize)]
struct HistoryQuery {
    range: Option<String>,
    interval: Option<String>,
}

async fn get_history(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<HistorySeries>> {
    let range = query.range.as_deref().unwrap_or(DEFAULT_RANGE);
    let interval = query.interval.as_deref().unwrap_or(DEFAULT_INTERVAL);

    let series = state
        .market
        .history(&symbol, range, interval)
        .await
        .map_err(|source| ApiError::History {
            symbol: symbol.clone(),
            source,
        })?;
    Ok(Json(series))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/market/config", get(get_market_config))
        .route("/market/snapshot", get(get_snapshot))
        .route("/market/history/{symbol}", get(get_history))
}
