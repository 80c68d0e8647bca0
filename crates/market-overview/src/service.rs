use crate::error::OverviewError;
use crate::metrics::{
    index_change, normalized_performance, period_change_pct, rank_movers, session_change_pct,
    sort_sectors, HeatmapCell, Mover, Movers, NormalizedPoint, PriceChange, SectorPerformance,
    StockMetrics,
};
use crate::universe::{
    symbols_of, COMPARISON_INDICES, HEATMAP_SECTORS, MAJOR_INDICES, MOVERS_PER_SIDE,
    MOVER_UNIVERSE, SECTOR_ETFS,
};
use core_types::{Interval, Period, PriceBar};
use market_data::{fetch_bars_or_empty, fetch_many, fetch_profile_or_default, MarketDataSource};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexSnapshot {
    pub symbol: String,
    pub name: String,
    /// `None` when fewer than two bars were available.
    pub change: Option<PriceChange>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonSeries {
    pub symbol: String,
    pub name: String,
    pub points: Vec<NormalizedPoint>,
}

/// Market-wide views computed over a `MarketDataSource`.
#[derive(Clone)]
pub struct MarketOverview {
    source: Arc<dyn MarketDataSource>,
    rsi_period: usize,
}

impl MarketOverview {
    pub fn new(source: Arc<dyn MarketDataSource>, rsi_period: usize) -> Self {
        Self { source, rsi_period }
    }

    async fn fetch_table(
        &self,
        symbols: Vec<String>,
        period: Period,
        interval: Interval,
    ) -> HashMap<String, Vec<PriceBar>> {
        fetch_many(self.source.as_ref(), &symbols, period, interval)
            .await
            .into_iter()
            .collect()
    }

    /// Latest level and daily change of each major index.
    pub async fn indices(&self) -> Vec<IndexSnapshot> {
        let data = self
            .fetch_table(symbols_of(&MAJOR_INDICES), Period::FiveDays, Interval::OneDay)
            .await;
        MAJOR_INDICES
            .iter()
            .map(|(symbol, name)| IndexSnapshot {
                symbol: symbol.to_string(),
                name: name.to_string(),
                change: data.get(*symbol).and_then(|bars| index_change(bars)),
            })
            .collect()
    }

    /// The comparison indices rebased to percent change over `period`.
    ///
    /// Fails unless every index returned data.
    pub async fn index_comparison(
        &self,
        period: Period,
    ) -> Result<Vec<ComparisonSeries>, OverviewError> {
        let data = self
            .fetch_table(symbols_of(&COMPARISON_INDICES), period, Interval::OneDay)
            .await;

        let missing: Vec<String> = COMPARISON_INDICES
            .iter()
            .filter(|(symbol, _)| data.get(*symbol).is_none_or(|bars| bars.is_empty()))
            .map(|(symbol, _)| symbol.to_string())
            .collect();
        if !missing.is_empty() {
            tracing::warn!(?missing, "Could not fetch data for all indices");
            return Err(OverviewError::IncompleteComparison(missing));
        }

        Ok(COMPARISON_INDICES
            .iter()
            .map(|(symbol, name)| ComparisonSeries {
                symbol: symbol.to_string(),
                name: name.to_string(),
                points: data
                    .get(*symbol)
                    .map(|bars| normalized_performance(bars))
                    .unwrap_or_default(),
            })
            .collect())
    }

    /// Five-day change of each sector ETF, worst first.
    pub async fn sector_performance(&self) -> Vec<SectorPerformance> {
        let data = self
            .fetch_table(symbols_of(&SECTOR_ETFS), Period::FiveDays, Interval::OneDay)
            .await;
        let mut sectors: Vec<SectorPerformance> = SECTOR_ETFS
            .iter()
            .filter_map(|(etf, sector)| {
                let bars = data.get(*etf)?;
                Some(SectorPerformance {
                    sector: sector.to_string(),
                    etf: etf.to_string(),
                    price: bars.last()?.close,
                    change_pct: period_change_pct(bars)?,
                })
            })
            .collect();
        if sectors.is_empty() {
            tracing::warn!("Could not fetch sector performance data");
        }
        sort_sectors(&mut sectors);
        sectors
    }

    /// Today's top gainers and losers across the mover universe.
    pub async fn movers(&self) -> Movers {
        let symbols: Vec<String> = MOVER_UNIVERSE.iter().map(|s| s.to_string()).collect();
        let results = fetch_many(self.source.as_ref(), &symbols, Period::OneDay, Interval::OneDay).await;
        let candidates: Vec<Mover> = results
            .into_iter()
            .filter_map(|(symbol, bars)| {
                Some(Mover {
                    price: bars.last()?.close,
                    change_pct: session_change_pct(&bars)?,
                    symbol,
                })
            })
            .collect();
        if candidates.is_empty() {
            tracing::warn!("Could not fetch market movers data");
        }
        rank_movers(candidates, MOVERS_PER_SIDE)
    }

    /// Open-to-close change of each heatmap constituent over `period`.
    pub async fn heatmap(&self, period: Period) -> Vec<HeatmapCell> {
        let symbols: Vec<String> = HEATMAP_SECTORS
            .iter()
            .flat_map(|(_, tickers)| tickers.iter().map(|t| t.to_string()))
            .collect();
        let data = self.fetch_table(symbols, period, Interval::OneDay).await;

        let mut cells = Vec::new();
        for (sector, tickers) in HEATMAP_SECTORS.iter() {
            for ticker in tickers {
                if let Some(change) = data.get(*ticker).and_then(|bars| session_change_pct(bars)) {
                    cells.push(HeatmapCell {
                        sector: sector.to_string(),
                        ticker: ticker.to_string(),
                        change,
                    });
                }
            }
        }
        if cells.is_empty() {
            tracing::warn!(%period, "Could not fetch heatmap data");
        }
        cells
    }

    /// Headline price, fundamental and indicator figures for one stock.
    pub async fn stock_metrics(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<StockMetrics, OverviewError> {
        let bars = fetch_bars_or_empty(self.source.as_ref(), symbol, period, interval).await;
        if bars.is_empty() {
            return Err(OverviewError::NoData(symbol.to_string()));
        }
        let profile = fetch_profile_or_default(self.source.as_ref(), symbol).await;
        StockMetrics::compute(symbol, &bars, profile, self.rsi_period)
            .ok_or_else(|| OverviewError::NoData(symbol.to_string()))
    }
}
