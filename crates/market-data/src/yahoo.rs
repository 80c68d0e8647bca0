use crate::error::MarketDataError;
use crate::responses::{parse_chart, parse_quote_summary};
use crate::MarketDataSource;
use async_trait::async_trait;
use configuration::settings::MarketDataSettings;
use core_types::{Interval, IssuerProfile, Period, PriceBar};
use reqwest::Url;
use std::time::Duration;

const PROFILE_MODULES: &str = "price,summaryDetail,assetProfile";

/// A concrete implementation of `MarketDataSource` over the Yahoo Finance HTTP API.
#[derive(Clone)]
pub struct YahooFinanceClient {
    client: reqwest::Client,
    base_url: Url,
}

impl YahooFinanceClient {
    pub fn new(settings: &MarketDataSettings) -> Result<Self, MarketDataError> {
        let base_url = Url::parse(&settings.base_url).map_err(|e| {
            MarketDataError::InvalidData(format!("Invalid base URL '{}': {e}", settings.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(MarketDataError::InvalidData(format!(
                "Base URL cannot carry a path: {base_url}"
            )));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.clone())
            .build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Appends `segments` to the base path. Each segment is percent-encoded,
    /// so a symbol can never add path components or a query.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, MarketDataError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                MarketDataError::InvalidData(format!("Base URL cannot carry a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_text(&self, url: Url, query: &[(&str, &str)]) -> Result<String, MarketDataError> {
        tracing::debug!(%url, "Requesting market data");
        let response = self.client.get(url).query(query).send().await?;
        let status = response.status();
        let text = response.text().await?;

        // JSON error bodies are decoded by the envelope parsers.
        if !status.is_success() && !text.trim_start().starts_with('{') {
            return Err(MarketDataError::Source {
                code: status.as_u16().to_string(),
                description: text,
            });
        }
        Ok(text)
    }
}

#[async_trait]
impl MarketDataSource for YahooFinanceClient {
    async fn fetch_bars(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<Vec<PriceBar>, MarketDataError> {
        let url = self.endpoint(&["v8", "finance", "chart", symbol])?;
        let text = self
            .get_text(
                url,
                &[
                    ("range", period.as_str()),
                    ("interval", interval.as_str()),
                    ("includePrePost", "false"),
                    ("events", "div,splits"),
                ],
            )
            .await?;
        let bars = parse_chart(symbol, &text)?;
        tracing::debug!(symbol, count = bars.len(), "Fetched price history");
        Ok(bars)
    }

    async fn fetch_profile(&self, symbol: &str) -> Result<IssuerProfile, MarketDataError> {
        let url = self.endpoint(&["v10", "finance", "quoteSummary", symbol])?;
        let text = self.get_text(url, &[("modules", PROFILE_MODULES)]).await?;
        parse_quote_summary(symbol, &text)
    }
}
