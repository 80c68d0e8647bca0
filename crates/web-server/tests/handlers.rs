use analytics::{AnalyticsAggregator, DetailValue, Details, MemoryStore};
use async_trait::async_trait;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{Duration, TimeZone, Utc};
use configuration::settings::Config;
use core_types::{Interval, IssuerProfile, Period, PriceBar};
use market_data::{MarketDataError, MarketDataSource};
use std::sync::Arc;
use web_server::{
    handlers::{self, HistoryQuery, InteractionRequest, PageViewRequest},
    AppState,
};

struct TrendSource;

#[async_trait]
impl MarketDataSource for TrendSource {
    async fn fetch_bars(
        &self,
        symbol: &str,
        _period: Period,
        _interval: Interval,
    ) -> Result<Vec<PriceBar>, MarketDataError> {
        if symbol != "TREND" {
            return Err(MarketDataError::NoData(symbol.to_string()));
        }
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Ok((0..30)
            .map(|i| {
                let close = 100.0 + i as f64;
                PriceBar::new(start + Duration::days(i), close - 0.5, close + 1.0, close - 1.0, close, 1_000)
            })
            .collect())
    }

    async fn fetch_profile(&self, symbol: &str) -> Result<IssuerProfile, MarketDataError> {
        Err(MarketDataError::NoData(symbol.to_string()))
    }
}

fn state() -> Arc<AppState> {
    let aggregator = AnalyticsAggregator::new(MemoryStore::new());
    Arc::new(AppState::new(Arc::new(TrendSource), aggregator, &Config::default()))
}

#[tokio::test]
async fn indicators_endpoint_returns_one_row_per_bar() {
    let state = state();
    let Json(response) = handlers::get_stock_indicators(
        Path("TREND".to_string()),
        Query(HistoryQuery::default()),
        State(state),
    )
    .await
    .unwrap();

    assert_eq!(response.rows.len(), 30);
    assert_eq!(response.period, Period::OneMonth);
    assert_eq!(response.rows[18].sma.get("sma_20"), Some(&None));
    assert!(response.rows[19].sma["sma_20"].is_some());
    assert_eq!(response.rows[29].rsi, Some(100.0));
}

#[tokio::test]
async fn unknown_symbol_is_not_found() {
    let err = handlers::get_stock_indicators(
        Path("NOPE".to_string()),
        Query(HistoryQuery::default()),
        State(state()),
    )
    .await
    .unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);

    let err = handlers::get_stock_metrics(
        Path("NOPE".to_string()),
        Query(HistoryQuery::default()),
        State(state()),
    )
    .await
    .unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn metrics_fall_back_to_an_empty_profile() {
    let Json(metrics) = handlers::get_stock_metrics(
        Path("TREND".to_string()),
        Query(HistoryQuery::default()),
        State(state()),
    )
    .await
    .unwrap();
    assert_eq!(metrics.latest_price, 129.0);
    assert_eq!(metrics.market_cap, None);
    assert!(metrics.sma_20.is_some());
    assert_eq!(metrics.sma_50, None);
}

#[tokio::test]
async fn session_lifecycle_feeds_the_summary() {
    let state = state();
    let (status, Json(started)) = handlers::start_session(State(state.clone())).await.unwrap();
    assert_eq!(status, StatusCode::CREATED);

    for _ in 0..2 {
        handlers::record_page_view(
            Path(started.user_id.clone()),
            State(state.clone()),
            Json(PageViewRequest {
                page_name: "Stock Dashboard".to_string(),
            }),
        )
        .await
        .unwrap();
    }
    let Json(view) = handlers::record_page_view(
        Path(started.user_id.clone()),
        State(state.clone()),
        Json(PageViewRequest {
            page_name: "Stock Dashboard".to_string(),
        }),
    )
    .await
    .unwrap();
    assert_eq!(view.view_count, 3);
    assert!(view.recorded);

    let mut details = Details::new();
    details.insert(
        "stocks".to_string(),
        DetailValue::List(vec!["AAPL".to_string(), "MSFT".to_string()]),
    );
    handlers::record_interaction(
        Path(started.user_id.clone()),
        State(state.clone()),
        Json(InteractionRequest {
            interaction_type: "stock_selection".to_string(),
            details,
        }),
    )
    .await
    .unwrap();

    let Json(summary) = handlers::get_analytics_summary(State(state.clone())).await.unwrap();
    assert_eq!(summary.total_visits, 1);
    assert_eq!(summary.unique_users, 1);
    assert_eq!(summary.total_page_views, 3);
    assert_eq!(summary.total_interactions, 1);
    assert_eq!(summary.popular_stocks.len(), 2);

    let status = handlers::clear_analytics(State(state.clone())).await.unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);
    let Json(summary) = handlers::get_analytics_summary(State(state)).await.unwrap();
    assert_eq!(summary.total_visits, 0);
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let err = handlers::record_page_view(
        Path("no-such-user".to_string()),
        State(state()),
        Json(PageViewRequest {
            page_name: "Market Overview".to_string(),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn ended_session_stops_accepting_events() {
    let state = state();
    let (_, Json(started)) = handlers::start_session(State(state.clone())).await.unwrap();
    assert_eq!(state.sessions.len(), 1);

    let status = handlers::end_session(Path(started.user_id.clone()), State(state.clone()))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(state.sessions.is_empty());

    let err = handlers::record_interaction(
        Path(started.user_id.clone()),
        State(state.clone()),
        Json(InteractionRequest {
            interaction_type: "view_market_movers".to_string(),
            details: Details::new(),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);

    let err = handlers::end_session(Path(started.user_id), State(state.clone()))
        .await
        .unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);

    // The visit recorded at start stays in the log.
    let Json(summary) = handlers::get_analytics_summary(State(state)).await.unwrap();
    assert_eq!(summary.total_visits, 1);
}
