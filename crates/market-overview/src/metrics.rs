//! Pure market-wide computations over already-fetched bars.

use chrono::{DateTime, Utc};
use core_types::{closes, IssuerProfile, PriceBar};
use serde::Serialize;
use std::cmp::Ordering;

/// Latest price against the prior reference price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceChange {
    pub latest: f64,
    pub previous: f64,
    pub change: f64,
    pub change_pct: f64,
}

impl PriceChange {
    /// The previous price is the second-to-last close, or the last bar's open
    /// when there is a single bar. `None` for an empty series.
    pub fn from_bars(bars: &[PriceBar]) -> Option<Self> {
        let last = bars.last()?;
        let previous = match bars.len() {
            1 => last.open,
            n => bars[n - 2].close,
        };
        Some(Self::between(previous, last.close))
    }

    fn between(previous: f64, latest: f64) -> Self {
        let change = latest - previous;
        let change_pct = if previous != 0.0 {
            change / previous * 100.0
        } else {
            0.0
        };
        Self {
            latest,
            previous,
            change,
            change_pct,
        }
    }
}

/// Close-to-close change of the last two bars. Requires at least two bars.
pub fn index_change(bars: &[PriceBar]) -> Option<PriceChange> {
    if bars.len() < 2 {
        return None;
    }
    PriceChange::from_bars(bars)
}

/// One point of a series rebased to percent change from its first close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalizedPoint {
    pub timestamp: DateTime<Utc>,
    pub pct_change: f64,
}

/// `(close / first_close - 1) * 100` per bar. Empty when the first close is zero.
pub fn normalized_performance(bars: &[PriceBar]) -> Vec<NormalizedPoint> {
    let Some(first) = bars.first().map(|b| b.close).filter(|c| *c != 0.0) else {
        return Vec::new();
    };
    bars.iter()
        .map(|b| NormalizedPoint {
            timestamp: b.timestamp,
            pct_change: (b.close / first - 1.0) * 100.0,
        })
        .collect()
}

/// Percent change from the first close to the last close. Requires more than one bar.
pub fn period_change_pct(bars: &[PriceBar]) -> Option<f64> {
    if bars.len() < 2 {
        return None;
    }
    let first = bars.first()?.close;
    let last = bars.last()?.close;
    (first != 0.0).then(|| (last - first) / first * 100.0)
}

/// Percent change from the first open to the last close.
pub fn session_change_pct(bars: &[PriceBar]) -> Option<f64> {
    let open = bars.first()?.open;
    let close = bars.last()?.close;
    (open != 0.0).then(|| (close - open) / open * 100.0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mover {
    pub symbol: String,
    pub price: f64,
    pub change_pct: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Movers {
    pub gainers: Vec<Mover>,
    pub losers: Vec<Mover>,
}

/// Splits candidates into the top `n` gainers (descending) and top `n` losers (ascending).
pub fn rank_movers(mut candidates: Vec<Mover>, n: usize) -> Movers {
    candidates.sort_by(|a, b| {
        a.change_pct
            .partial_cmp(&b.change_pct)
            .unwrap_or(Ordering::Equal)
    });
    let losers = candidates.iter().take(n).cloned().collect();
    let gainers = candidates.iter().rev().take(n).cloned().collect();
    Movers { gainers, losers }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorPerformance {
    pub sector: String,
    pub etf: String,
    pub price: f64,
    pub change_pct: f64,
}

/// Sorts sectors ascending by change, worst first.
pub fn sort_sectors(sectors: &mut [SectorPerformance]) {
    sectors.sort_by(|a, b| {
        a.change_pct
            .partial_cmp(&b.change_pct)
            .unwrap_or(Ordering::Equal)
    });
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapCell {
    pub sector: String,
    pub ticker: String,
    pub change: f64,
}

/// `$x.xxB` at or above one billion, `$x.xxM` below.
pub fn format_market_cap(market_cap: f64) -> String {
    if market_cap >= 1e9 {
        format!("${:.2}B", market_cap / 1e9)
    } else {
        format!("${:.2}M", market_cap / 1e6)
    }
}

/// Headline figures for a single stock.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockMetrics {
    pub symbol: String,
    pub latest_price: f64,
    pub price_change: f64,
    pub price_change_pct: f64,
    pub market_cap: Option<String>,
    pub pe_ratio: Option<f64>,
    /// Dividend yield in percent.
    pub dividend_yield: Option<f64>,
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub rsi: Option<f64>,
    pub profile: IssuerProfile,
}

impl StockMetrics {
    /// `None` for an empty series.
    pub fn compute(
        symbol: &str,
        bars: &[PriceBar],
        profile: IssuerProfile,
        rsi_period: usize,
    ) -> Option<Self> {
        let change = PriceChange::from_bars(bars)?;
        let closes = closes(bars);
        let latest = |column: Vec<Option<f64>>| column.last().copied().flatten();

        Some(Self {
            symbol: symbol.to_string(),
            latest_price: change.latest,
            price_change: change.change,
            price_change_pct: change.change_pct,
            market_cap: profile.market_cap.map(format_market_cap),
            pe_ratio: profile.forward_pe,
            dividend_yield: profile.dividend_yield.map(|y| y * 100.0),
            sma_20: latest(indicators::sma(&closes, 20)),
            sma_50: latest(indicators::sma(&closes, 50)),
            rsi: latest(indicators::rsi(&closes, rsi_period)),
            profile,
        })
    }
}
