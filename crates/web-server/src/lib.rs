use analytics::{AnalyticsAggregator, JsonFileStore};
use axum::{
    routing::{delete, get, post},
    Router,
};
use configuration::settings::{Config, DashboardSettings};
use indicators::{IndicatorEngine, IndicatorParams};
use market_data::{MarketDataSource, YahooFinanceClient};
use market_overview::MarketOverview;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;
pub mod sessions;

use sessions::SessionRegistry;

/// The shared application state that all handlers can access.
pub struct AppState {
    pub source: Arc<dyn MarketDataSource>,
    pub overview: MarketOverview,
    pub engine: IndicatorEngine,
    pub aggregator: AnalyticsAggregator,
    pub sessions: SessionRegistry,
    pub dashboard: DashboardSettings,
}

impl AppState {
    pub fn new(
        source: Arc<dyn MarketDataSource>,
        aggregator: AnalyticsAggregator,
        config: &Config,
    ) -> Self {
        let params = IndicatorParams::from(&config.indicators);
        Self {
            overview: MarketOverview::new(source.clone(), params.rsi_period),
            engine: IndicatorEngine::new(params),
            source,
            aggregator,
            sessions: SessionRegistry::new(Duration::from_secs(config.server.session_idle_secs)),
            dashboard: config.dashboard.clone(),
        }
    }
}

/// Builds the API router over `state`.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any());

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/stocks/:symbol/indicators", get(handlers::get_stock_indicators))
        .route("/api/stocks/:symbol/metrics", get(handlers::get_stock_metrics))
        .route("/api/market/indices", get(handlers::get_market_indices))
        .route("/api/market/sectors", get(handlers::get_sector_performance))
        .route("/api/market/movers", get(handlers::get_market_movers))
        .route("/api/market/comparison", get(handlers::get_index_comparison))
        .route("/api/market/heatmap", get(handlers::get_market_heatmap))
        .route("/api/analytics", delete(handlers::clear_analytics))
        .route("/api/analytics/summary", get(handlers::get_analytics_summary))
        .route("/api/analytics/sessions", post(handlers::start_session))
        .route("/api/analytics/sessions/:user_id", delete(handlers::end_session))
        .route(
            "/api/analytics/sessions/:user_id/page-views",
            post(handlers::record_page_view),
        )
        .route(
            "/api/analytics/sessions/:user_id/interactions",
            post(handlers::record_interaction),
        )
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Wires the live data source and the file-backed analytics log, then serves
/// the API until the process is stopped.
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let source: Arc<dyn MarketDataSource> = Arc::new(YahooFinanceClient::new(&config.market_data)?);
    let aggregator = AnalyticsAggregator::new(JsonFileStore::new(config.analytics.log_path.clone()));
    let app_state = Arc::new(AppState::new(source, aggregator, &config));
    let app = router(app_state);

    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    tracing::info!("Web server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
