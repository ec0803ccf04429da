use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{Method, header::CONTENT_TYPE},
    routing::get,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::LotteryError;
use crate::types::{DrawResult, HistorySnapshot, LiveResponse, NumberStat, ResultsResponse};
use crate::use_cases::{IngestUseCase, QueryUseCase};
use crate::utils::parse_count;

const DEFAULT_COUNT: usize = 10;

pub struct AppState {
    pub ingest: Arc<IngestUseCase>,
    pub queries: Arc<QueryUseCase>,
}

type SharedState = State<Arc<AppState>>;

pub fn router(ingest: Arc<IngestUseCase>, queries: Arc<QueryUseCase>) -> Router {
    let state = Arc::new(AppState { ingest, queries });

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/lottery/live", get(live_handler))
        .route("/api/lottery/results", get(results_handler))
        .route("/api/lottery/results/:date", get(results_by_date_handler))
        .route("/api/lottery/history/:date", get(history_handler))
        .route("/api/lottery/recent-history/:days", get(recent_history_handler))
        .route("/api/lottery/stats/:number", get(number_stat_handler))
        .route("/api/lottery/popular-numbers", get(popular_numbers_handler))
        .route("/api/lottery/all-stats", get(all_stats_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn live_handler(State(state): SharedState) -> Result<Json<LiveResponse>, LotteryError> {
    Ok(Json(state.ingest.ingest_live().await?))
}

async fn results_handler(
    State(state): SharedState,
) -> Result<Json<ResultsResponse>, LotteryError> {
    Ok(Json(state.ingest.ingest_results().await?))
}

async fn results_by_date_handler(
    State(state): SharedState,
    Path(date): Path<String>,
) -> Result<Json<Vec<DrawResult>>, LotteryError> {
    Ok(Json(state.queries.results_by_date(&date).await?))
}

async fn history_handler(
    State(state): SharedState,
    Path(date): Path<String>,
) -> Result<Json<Value>, LotteryError> {
    Ok(Json(state.ingest.ingest_history(&date).await?))
}

async fn recent_history_handler(
    State(state): SharedState,
    Path(days): Path<String>,
) -> Result<Json<Vec<HistorySnapshot>>, LotteryError> {
    let days = parse_count(Some(days.as_str()), DEFAULT_COUNT);
    Ok(Json(state.queries.recent_history(days).await?))
}

async fn number_stat_handler(
    State(state): SharedState,
    Path(number): Path<String>,
) -> Result<Json<NumberStat>, LotteryError> {
    Ok(Json(state.queries.number_stat(&number).await?))
}

#[derive(Debug, Deserialize)]
struct LimitParams {
    limit: Option<String>,
}

async fn popular_numbers_handler(
    State(state): SharedState,
    Query(params): Query<LimitParams>,
) -> Result<Json<Vec<NumberStat>>, LotteryError> {
    let limit = parse_count(params.limit.as_deref(), DEFAULT_COUNT);
    Ok(Json(state.queries.popular_numbers(limit).await?))
}

async fn all_stats_handler(
    State(state): SharedState,
) -> Result<Json<Vec<NumberStat>>, LotteryError> {
    Ok(Json(state.queries.all_stats().await?))
}
