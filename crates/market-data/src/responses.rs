//! Wire formats of the chart and quote-summary endpoints.

use chrono::DateTime;
use core_types::{IssuerProfile, PriceBar};
use serde::Deserialize;

use crate::error::MarketDataError;

#[derive(Debug, Clone, Deserialize)]
pub struct ChartEnvelope {
    pub chart: ChartBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartBody {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<SourceError>,
}

/// Represents an error payload from the source.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceError {
    pub code: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResult {
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: ChartIndicators,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartIndicators {
    #[serde(default)]
    pub quote: Vec<QuoteColumns>,
}

/// Column-oriented OHLCV; a `null` marks a missing observation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteColumns {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}

/// Parses a chart response body into bars, oldest first.
///
/// Rows with any missing field are skipped. Rows whose timestamp does not
/// advance past the previous row are dropped so the series stays strictly
/// increasing.
pub fn parse_chart(symbol: &str, body: &str) -> Result<Vec<PriceBar>, MarketDataError> {
    let envelope: ChartEnvelope = serde_json::from_str(body)?;
    if let Some(err) = envelope.chart.error {
        return Err(MarketDataError::Source {
            code: err.code,
            description: err.description,
        });
    }

    let result = envelope
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| MarketDataError::NoData(symbol.to_string()))?;
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let mut bars: Vec<PriceBar> = Vec::with_capacity(result.timestamp.len());
    for (i, &epoch) in result.timestamp.iter().enumerate() {
        let column = |c: &[Option<f64>]| c.get(i).copied().flatten();
        let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = (
            column(&quote.open),
            column(&quote.high),
            column(&quote.low),
            column(&quote.close),
            column(&quote.volume),
        ) else {
            continue;
        };

        let timestamp = DateTime::from_timestamp(epoch, 0)
            .ok_or_else(|| MarketDataError::InvalidData(format!("Invalid timestamp: {epoch}")))?;
        if bars.last().is_some_and(|prev| prev.timestamp >= timestamp) {
            continue;
        }
        bars.push(PriceBar::new(timestamp, open, high, low, close, volume.max(0.0) as u64));
    }
    Ok(bars)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummaryEnvelope {
    pub quote_summary: QuoteSummaryBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteSummaryBody {
    pub result: Option<Vec<QuoteSummaryResult>>,
    pub error: Option<SourceError>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummaryResult {
    #[serde(default)]
    pub price: PriceModule,
    #[serde(default)]
    pub summary_detail: SummaryDetailModule,
    #[serde(default)]
    pub asset_profile: AssetProfileModule,
}

/// A numeric field as the source encodes it: `{"raw": 1.5, "fmt": "1.50"}` or `{}`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct RawValue {
    pub raw: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceModule {
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub exchange_name: Option<String>,
    pub market_cap: Option<RawValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDetailModule {
    #[serde(rename = "forwardPE")]
    pub forward_pe: Option<RawValue>,
    pub dividend_yield: Option<RawValue>,
    pub market_cap: Option<RawValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetProfileModule {
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub long_business_summary: Option<String>,
    pub full_time_employees: Option<u64>,
    pub country: Option<String>,
}

/// Parses a quote-summary response body into an issuer profile.
pub fn parse_quote_summary(symbol: &str, body: &str) -> Result<IssuerProfile, MarketDataError> {
    let envelope: QuoteSummaryEnvelope = serde_json::from_str(body)?;
    if let Some(err) = envelope.quote_summary.error {
        return Err(MarketDataError::Source {
            code: err.code,
            description: err.description,
        });
    }
    let result = envelope
        .quote_summary
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| MarketDataError::NoData(symbol.to_string()))?;

    let raw = |v: Option<RawValue>| v.and_then(|v| v.raw);
    let price = result.price;
    let detail = result.summary_detail;
    let profile = result.asset_profile;

    Ok(IssuerProfile {
        display_name: price.short_name.or(price.long_name),
        sector: profile.sector,
        industry: profile.industry,
        website: profile.website,
        description: profile.long_business_summary,
        employees: profile.full_time_employees,
        country: profile.country,
        exchange: price.exchange_name,
        market_cap: raw(price.market_cap).or(raw(detail.market_cap)),
        forward_pe: raw(detail.forward_pe),
        dividend_yield: raw(detail.dividend_yield),
    })
}
