use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use market_overview::OverviewError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Analytics error: {0}")]
    Analytics(#[from] analytics::AnalyticsError),
    #[error("Market overview error: {0}")]
    Overview(#[from] OverviewError),
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Analytics(analytics_err) => {
                tracing::error!(error = ?analytics_err, "Analytics error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal analytics storage error occurred".to_string(),
                )
            }
            AppError::Overview(OverviewError::NoData(symbol)) => (
                StatusCode::NOT_FOUND,
                format!("No data found for {symbol}"),
            ),
            AppError::Overview(overview_err) => {
                tracing::warn!(error = %overview_err, "Market overview unavailable.");
                (StatusCode::BAD_GATEWAY, overview_err.to_string())
            }
            AppError::Task(join_err) => {
                tracing::error!(error = ?join_err, "Blocking task failed.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
