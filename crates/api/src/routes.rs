use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use spotbridge_core::*;
use std::sync::Arc;

pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Health
        .route("/health", get(health_check))
        // Account (signed)
        .route("/account", get(get_account))
        // Market data (public)
        .route("/price", get(get_price))
        .route("/price-history", get(get_price_history))
        // Orders (signed)
        .route("/order", post(create_order))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "message": "OK" }))
}

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

async fn get_account(State(state): State<Arc<AppState>>) -> Result<Json<AccountInfo>, ApiError> {
    tracing::info!("Fetching account");
    Ok(Json(state.exchange.account().await?))
}

// ---------------------------------------------------------------------------
// Market Data
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct PriceParams {
    symbol: Option<String>,
}

async fn get_price(
    State(state): State<Arc<AppState>>,
    params: Result<Query<PriceParams>, QueryRejection>,
) -> Result<Json<PriceInfo>, ApiError> {
    let Query(params) = params?;
    let symbol = normalize_symbol(params.symbol.as_deref().unwrap_or_default())?;
    Ok(Json(state.exchange.price(&symbol).await?))
}

#[derive(Deserialize)]
struct HistoryParams {
    symbol: Option<String>,
    interval: Option<String>,
    limit: Option<u32>,
}

async fn get_price_history(
    State(state): State<Arc<AppState>>,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> Result<Json<Vec<CandleInfo>>, ApiError> {
    let Query(params) = params?;
    let query = HistoryQuery::new(
        params.symbol.as_deref().unwrap_or_default(),
        params.interval.as_deref(),
        params.limit,
    )?;
    Ok(Json(state.exchange.price_history(&query).await?))
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

async fn create_order(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<OrderRequest>, JsonRejection>,
) -> Result<Json<OrderOutcome>, ApiError> {
    let Json(order) = payload?;
    Ok(Json(state.exchange.place_order(&order).await?))
}
