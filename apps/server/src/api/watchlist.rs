use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use marketmind_market_data::{
    Instrument, MarketDataError, MarketSummary, WatchlistSnapshot, WindowStats,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentDetail {
    pub instrument: Instrument,
    pub stats: WindowStats,
}

impl From<Instrument> for InstrumentDetail {
    fn from(instrument: Instrument) -> Self {
        let stats = instrument.stats();
        Self { instrument, stats }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResponse {
    pub symbol: Option<String>,
    pub instrument: Option<InstrumentDetail>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SelectRequest {
    symbol: String,
}

async fn get_watchlist(State(state): State<Arc<AppState>>) -> Json<WatchlistSnapshot> {
    Json(state.market().snapshot())
}

/// Apply one simulation cycle immediately.
async fn advance_watchlist(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<WatchlistSnapshot>> {
    let snapshot = state.advance_market()?;
    Ok(Json(snapshot))
}

async fn get_summary(State(state): State<Arc<AppState>>) -> Json<MarketSummary> {
    Json(state.market().summary())
}

async fn get_instrument(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> ApiResult<Json<InstrumentDetail>> {
    let instrument = state
        .market()
        .instrument(&symbol)
        .cloned()
        .ok_or_else(|| MarketDataError::UnknownSymbol(symbol.trim().to_ascii_uppercase()))?;
    Ok(Json(instrument.into()))
}

async fn get_selection(State(state): State<Arc<AppState>>) -> Json<SelectionResponse> {
    Json(SelectionResponse {
        symbol: state.selected_symbol(),
        instrument: state.selected_instrument().map(InstrumentDetail::from),
    })
}

async fn update_selection(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SelectRequest>,
) -> ApiResult<Json<SelectionResponse>> {
    // Unknown symbols are a bad request here rather than a missing resource.
    let instrument = state.select(&body.symbol).map_err(|e| match e {
        MarketDataError::UnknownSymbol(_) => ApiError::BadRequest(e.to_string()),
        other => other.into(),
    })?;
    Ok(Json(SelectionResponse {
        symbol: Some(instrument.symbol().to_string()),
        instrument: Some(instrument.into()),
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/watchlist", get(get_watchlist))
        .route("/watchlist/advance", post(advance_watchlist))
        .route("/watchlist/summary", get(get_summary))
        .route("/watchlist/{symbol}", get(get_instrument))
        .route("/selection", get(get_selection).put(update_selection))
}
