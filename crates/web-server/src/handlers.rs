use crate::{error::AppError, AppState};
use analytics::{AnalyticsSummary, Details};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDateTime;
use core_types::{Interval, Period};
use indicators::IndicatorRow;
use market_data::fetch_bars_or_empty;
use market_overview::{
    ComparisonSeries, HeatmapCell, IndexSnapshot, Movers, SectorPerformance, StockMetrics,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError};

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub period: Option<Period>,
    pub interval: Option<Interval>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub period: Option<Period>,
}

#[derive(Debug, Serialize)]
pub struct IndicatorResponse {
    pub symbol: String,
    pub period: Period,
    pub interval: Interval,
    pub rows: Vec<IndicatorRow>,
}

/// # GET /api/stocks/:symbol/indicators
pub async fn get_stock_indicators(
    Path(symbol): Path<String>,
    Query(query): Query<HistoryQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<IndicatorResponse>, AppError> {
    let period = query.period.unwrap_or(state.dashboard.default_period);
    let interval = query.interval.unwrap_or(state.dashboard.default_interval);

    let bars = fetch_bars_or_empty(state.source.as_ref(), &symbol, period, interval).await;
    if bars.is_empty() {
        return Err(AppError::NotFound(format!("No data found for {symbol}")));
    }
    let series = state.engine.compute(&bars);
    Ok(Json(IndicatorResponse {
        symbol,
        period,
        interval,
        rows: series.rows(),
    }))
}

/// # GET /api/stocks/:symbol/metrics
pub async fn get_stock_metrics(
    Path(symbol): Path<String>,
    Query(query): Query<HistoryQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<StockMetrics>, AppError> {
    let period = query.period.unwrap_or(state.dashboard.default_period);
    let interval = query.interval.unwrap_or(state.dashboard.default_interval);
    let metrics = state.overview.stock_metrics(&symbol, period, interval).await?;
    Ok(Json(metrics))
}

/// # GET /api/market/indices
pub async fn get_market_indices(State(state): State<Arc<AppState>>) -> Json<Vec<IndexSnapshot>> {
    Json(state.overview.indices().await)
}

/// # GET /api/market/sectors
pub async fn get_sector_performance(
    State(state): State<Arc<AppState>>,
) -> Json<Vec<SectorPerformance>> {
    Json(state.overview.sector_performance().await)
}

/// # GET /api/market/movers
pub async fn get_market_movers(State(state): State<Arc<AppState>>) -> Json<Movers> {
    Json(state.overview.movers().await)
}

/// # GET /api/market/comparison
/// Defaults to six months.
pub async fn get_index_comparison(
    Query(query): Query<PeriodQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ComparisonSeries>>, AppError> {
    let period = query.period.unwrap_or(Period::SixMonths);
    Ok(Json(state.overview.index_comparison(period).await?))
}

/// # GET /api/market/heatmap
/// Defaults to one day.
pub async fn get_market_heatmap(
    Query(query): Query<PeriodQuery>,
    State(state): State<Arc<AppState>>,
) -> Json<Vec<HeatmapCell>> {
    let period = query.period.unwrap_or(Period::OneDay);
    Json(state.overview.heatmap(period).await)
}

#[derive(Debug, Serialize)]
pub struct SessionStarted {
    pub user_id: String,
    #[serde(with = "visit_format")]
    pub visit_timestamp: NaiveDateTime,
}

mod visit_format {
    use analytics::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(TIMESTAMP_FORMAT))
    }
}

/// Runs analytics file I/O off the async worker threads.
async fn blocking<T, F>(state: &Arc<AppState>, f: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce(&AppState) -> T + Send + 'static,
{
    let state = Arc::clone(state);
    Ok(tokio::task::spawn_blocking(move || f(&state)).await?)
}

fn unknown_session(user_id: &str) -> AppError {
    AppError::NotFound(format!("Unknown session {user_id}"))
}

/// # POST /api/analytics/sessions
/// Starts a session and records its visit.
pub async fn start_session(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<SessionStarted>), AppError> {
    let session = blocking(&state, |state| state.aggregator.start_session()).await?;
    let started = SessionStarted {
        user_id: session.user_id().to_string(),
        visit_timestamp: session.visit_timestamp(),
    };
    state.sessions.insert(session);
    Ok((StatusCode::CREATED, Json(started)))
}

/// # DELETE /api/analytics/sessions/:user_id
/// Ends a session. Its recorded events stay in the log.
pub async fn end_session(
    Path(user_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(&user_id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(unknown_session(&user_id))
    }
}

#[derive(Debug, Deserialize)]
pub struct PageViewRequest {
    pub page_name: String,
}

#[derive(Debug, Serialize)]
pub struct PageViewRecorded {
    pub page_name: String,
    pub view_count: u64,
    /// `false` when the event could not be persisted.
    pub recorded: bool,
}

/// # POST /api/analytics/sessions/:user_id/page-views
pub async fn record_page_view(
    Path(user_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<PageViewRequest>,
) -> Result<Json<PageViewRecorded>, AppError> {
    let session = state
        .sessions
        .get(&user_id)
        .ok_or_else(|| unknown_session(&user_id))?;
    let response = blocking(&state, move |state| {
        let mut session = session.lock().unwrap_or_else(PoisonError::into_inner);
        let page_name = request.page_name;
        let recorded = match state.aggregator.record_page_view(&mut session, &page_name) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(%user_id, page = %page_name, error = %e, "Failed to record page view.");
                false
            }
        };
        PageViewRecorded {
            view_count: session.view_count(&page_name),
            page_name,
            recorded,
        }
    })
    .await?;
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct InteractionRequest {
    pub interaction_type: String,
    #[serde(default)]
    pub details: Details,
}

#[derive(Debug, Serialize)]
pub struct InteractionRecorded {
    pub interaction_type: String,
    pub recorded: bool,
}

/// # POST /api/analytics/sessions/:user_id/interactions
pub async fn record_interaction(
    Path(user_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<InteractionRequest>,
) -> Result<Json<InteractionRecorded>, AppError> {
    let session = state
        .sessions
        .get(&user_id)
        .ok_or_else(|| unknown_session(&user_id))?;
    let response = blocking(&state, move |state| {
        let mut session = session.lock().unwrap_or_else(PoisonError::into_inner);
        let InteractionRequest {
            interaction_type,
            details,
        } = request;
        let recorded = match state
            .aggregator
            .record_interaction(&mut session, &interaction_type, details)
        {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(%user_id, %interaction_type, error = %e, "Failed to record interaction.");
                false
            }
        };
        InteractionRecorded {
            interaction_type,
            recorded,
        }
    })
    .await?;
    Ok(Json(response))
}

/// # GET /api/analytics/summary
pub async fn get_analytics_summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AnalyticsSummary>, AppError> {
    let summary = blocking(&state, |state| state.aggregator.summarize()).await?;
    Ok(Json(summary))
}

/// # DELETE /api/analytics
/// Irreversibly empties the analytics log.
pub async fn clear_analytics(State(state): State<Arc<AppState>>) -> Result<StatusCode, AppError> {
    blocking(&state, |state| state.aggregator.clear()).await??;
    Ok(StatusCode::NO_CONTENT)
}
