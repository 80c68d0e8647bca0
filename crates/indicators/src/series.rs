use chrono::{DateTime, Utc};
use configuration::IndicatorSettings;
use core_types::{closes, PriceBar};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::{atr, bollinger_bands, ema, macd, obv, rsi, sma, BollingerBands, Column, Macd};

/// Window lengths used by [`IndicatorEngine`].
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorParams {
    pub sma_periods: Vec<usize>,
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub macd_signal: usize,
    pub bollinger_window: usize,
    pub bollinger_k: f64,
    pub rsi_period: usize,
    pub atr_period: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self::from(&IndicatorSettings::default())
    }
}

impl From<&IndicatorSettings> for IndicatorParams {
    fn from(settings: &IndicatorSettings) -> Self {
        Self {
            sma_periods: settings.sma_periods.clone(),
            ema_fast: settings.ema_fast,
            ema_slow: settings.ema_slow,
            macd_signal: settings.macd_signal,
            bollinger_window: settings.bollinger_window,
            bollinger_k: settings.bollinger_k,
            rsi_period: settings.rsi_period,
            atr_period: settings.atr_period,
        }
    }
}

/// A price series extended with every dashboard indicator column.
///
/// All columns are index-aligned with `bars`. Recomputed on every call and
/// never cached.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct IndicatorSeries {
    pub bars: Vec<PriceBar>,
    /// Simple moving averages keyed by window length.
    pub sma: BTreeMap<usize, Column>,
    pub ema_fast: Column,
    pub ema_slow: Column,
    pub macd: Macd,
    pub bollinger: BollingerBands,
    pub rsi: Column,
    pub atr: Column,
    pub obv: Vec<i64>,
}

/// One bar of an [`IndicatorSeries`] with its indicator values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorRow {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    /// Keyed `sma_<window>`, e.g. `sma_20`.
    #[serde(flatten)]
    pub sma: BTreeMap<String, Option<f64>>,
    pub ema_fast: Option<f64>,
    pub ema_slow: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_lower: Option<f64>,
    pub rsi: Option<f64>,
    pub atr: Option<f64>,
    pub obv: i64,
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// The SMA column for `window`, if the engine was configured with it.
    pub fn sma(&self, window: usize) -> Option<&Column> {
        self.sma.get(&window)
    }

    /// The row at position `index`.
    pub fn row(&self, index: usize) -> Option<IndicatorRow> {
        let bar = self.bars.get(index)?;
        let at = |col: &Column| col.get(index).copied().flatten();

        Some(IndicatorRow {
            timestamp: bar.timestamp,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            sma: self
                .sma
                .iter()
                .map(|(window, col)| (format!("sma_{window}"), at(col)))
                .collect(),
            ema_fast: at(&self.ema_fast),
            ema_slow: at(&self.ema_slow),
            macd: at(&self.macd.line),
            macd_signal: at(&self.macd.signal),
            macd_hist: at(&self.macd.histogram),
            bb_upper: at(&self.bollinger.upper),
            bb_middle: at(&self.bollinger.middle),
            bb_lower: at(&self.bollinger.lower),
            rsi: at(&self.rsi),
            atr: at(&self.atr),
            obv: self.obv.get(index).copied().unwrap_or_default(),
        })
    }

    /// Every row in bar order.
    pub fn rows(&self) -> Vec<IndicatorRow> {
        (0..self.len()).filter_map(|i| self.row(i)).collect()
    }

    /// The most recent row, `None` for an empty series.
    pub fn latest(&self) -> Option<IndicatorRow> {
        self.len().checked_sub(1).and_then(|i| self.row(i))
    }
}

/// A stateless calculator for the full dashboard indicator set.
#[derive(Debug, Clone, Default)]
pub struct IndicatorEngine {
    params: IndicatorParams,
}

impl IndicatorEngine {
    pub fn new(params: IndicatorParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &IndicatorParams {
        &self.params
    }

    /// Computes every configured column over `bars`.
    ///
    /// An empty input yields an empty series. Nothing is validated: bar order
    /// and `high >= low` are the caller's responsibility.
    pub fn compute(&self, bars: &[PriceBar]) -> IndicatorSeries {
        let p = &self.params;
        let close = closes(bars);

        let sma_columns = p
            .sma_periods
            .iter()
            .map(|&window| (window, sma(&close, window)))
            .collect();

        let series = IndicatorSeries {
            bars: bars.to_vec(),
            sma: sma_columns,
            ema_fast: ema(&close, p.ema_fast),
            ema_slow: ema(&close, p.ema_slow),
            macd: macd(&close, p.ema_fast, p.ema_slow, p.macd_signal),
            bollinger: bollinger_bands(&close, p.bollinger_window, p.bollinger_k),
            rsi: rsi(&close, p.rsi_period),
            atr: atr(bars, p.atr_period),
            obv: obv(bars),
        };

        tracing::debug!(bars = series.len(), "Indicator series computed.");
        series
    }
}
