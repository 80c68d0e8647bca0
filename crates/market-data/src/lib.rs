//! # Market Data
//!
//! The price-history and issuer-profile collaborator of the dashboard.
//!
//! ## Architectural Principles
//!
//! - **Swappable Source:** Consumers hold an `Arc<dyn MarketDataSource>`, so the
//!   live HTTP client can be replaced by an in-memory fake in tests.
//! - **Pure Parsing:** Response bodies are turned into domain types by plain
//!   functions in `responses`, independent of any network I/O.
//! - **Soft Failure at the Edge:** Display paths use `fetch_bars_or_empty` and
//!   `fetch_profile_or_default`, which log the failure and degrade to an empty
//!   result instead of propagating.
//!
//! ## Public API
//!
//! - `MarketDataSource`: The async data-source contract.
//! - `YahooFinanceClient`: The HTTP implementation.
//! - `fetch_bars_or_empty`, `fetch_profile_or_default`, `fetch_many`: Policy helpers.

use async_trait::async_trait;
use core_types::{Interval, IssuerProfile, Period, PriceBar};
use futures::future::join_all;

pub mod error;
pub mod responses;
pub mod yahoo;

// --- Public API ---
pub use error::MarketDataError;
pub use yahoo::YahooFinanceClient;

/// The abstract interface for a source of historical prices and issuer metadata.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetches OHLCV bars for `symbol`, oldest first with strictly increasing timestamps.
    async fn fetch_bars(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<Vec<PriceBar>, MarketDataError>;

    /// Fetches descriptive and fundamental fields for `symbol`.
    async fn fetch_profile(&self, symbol: &str) -> Result<IssuerProfile, MarketDataError>;
}

/// Fetches bars, logging and swallowing any failure as an empty series.
pub async fn fetch_bars_or_empty(
    source: &dyn MarketDataSource,
    symbol: &str,
    period: Period,
    interval: Interval,
) -> Vec<PriceBar> {
    match source.fetch_bars(symbol, period, interval).await {
        Ok(bars) => bars,
        Err(e) => {
            tracing::warn!(symbol, %period, %interval, error = %e, "Failed to fetch price history");
            Vec::new()
        }
    }
}

/// Fetches a profile, logging and swallowing any failure as an all-empty profile.
pub async fn fetch_profile_or_default(source: &dyn MarketDataSource, symbol: &str) -> IssuerProfile {
    match source.fetch_profile(symbol).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(symbol, error = %e, "Failed to fetch issuer profile");
            IssuerProfile::default()
        }
    }
}

/// Fetches bars for several symbols concurrently.
///
/// The result keeps the order of `symbols`; a symbol whose fetch failed maps
/// to an empty series.
pub async fn fetch_many(
    source: &dyn MarketDataSource,
    symbols: &[String],
    period: Period,
    interval: Interval,
) -> Vec<(String, Vec<PriceBar>)> {
    let fetches = symbols
        .iter()
        .map(|symbol| fetch_bars_or_empty(source, symbol, period, interval));
    let results = join_all(fetches).await;
    symbols.iter().cloned().zip(results).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use std::collections::HashMap;

    struct FakeSource {
        bars: HashMap<String, Vec<PriceBar>>,
    }

    #[async_trait]
    impl MarketDataSource for FakeSource {
        async fn fetch_bars(
            &self,
            symbol: &str,
            _period: Period,
            _interval: Interval,
        ) -> Result<Vec<PriceBar>, MarketDataError> {
            self.bars
                .get(symbol)
                .cloned()
                .ok_or_else(|| MarketDataError::NoData(symbol.to_string()))
        }

        async fn fetch_profile(&self, symbol: &str) -> Result<IssuerProfile, MarketDataError> {
            Err(MarketDataError::NoData(symbol.to_string()))
        }
    }

    fn series(closes: &[f64]) -> Vec<PriceBar> {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PriceBar::new(start + Duration::days(i as i64), c, c, c, c, 1_000))
            .collect()
    }

    fn fake() -> FakeSource {
        let mut bars = HashMap::new();
        bars.insert("AAA".to_string(), series(&[1.0, 2.0]));
        bars.insert("CCC".to_string(), series(&[3.0]));
        FakeSource { bars }
    }

    #[tokio::test]
    async fn failed_fetch_degrades_to_empty() {
        let source = fake();
        let bars = fetch_bars_or_empty(&source, "MISSING", Period::OneMonth, Interval::OneDay).await;
        assert!(bars.is_empty());

        let profile = fetch_profile_or_default(&source, "AAA").await;
        assert_eq!(profile, IssuerProfile::default());
    }

    #[tokio::test]
    async fn fetch_many_preserves_order_and_gaps() {
        let source = fake();
        let symbols = vec!["CCC".to_string(), "BBB".to_string(), "AAA".to_string()];
        let results = fetch_many(&source, &symbols, Period::OneMonth, Interval::OneDay).await;

        let names: Vec<&str> = results.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(names, vec!["CCC", "BBB", "AAA"]);
        assert_eq!(results[0].1.len(), 1);
        assert!(results[1].1.is_empty());
        assert_eq!(results[2].1.len(), 2);
    }
}
