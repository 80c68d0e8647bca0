use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV observation.
///
/// Series of bars are strictly increasing in `timestamp`. Bars come wholesale
/// from the market-data source and are never mutated afterwards. No
/// validation is applied: a bar with `high < low` flows through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PriceBar {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Extracts the close column of a series.
pub fn closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Reference data about an issuer. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssuerProfile {
    pub display_name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub employees: Option<u64>,
    pub country: Option<String>,
    pub exchange: Option<String>,
    pub market_cap: Option<f64>,
    pub forward_pe: Option<f64>,
    pub dividend_yield: Option<f64>,
}
