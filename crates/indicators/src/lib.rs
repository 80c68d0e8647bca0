//! # Technical Indicator Engine
//!
//! Pure functions from an ordered OHLCV series to derived indicator columns.
//!
//! ## Conventions
//!
//! - Every column has the same length and index alignment as its input.
//! - Positions before a column's lookback window are `None`. Zero is a valid
//!   indicator value and never stands in for "insufficient history".
//! - An empty input yields empty columns; nothing here returns an error.
//! - Inputs are not validated. A bar with `high < low` produces whatever the
//!   arithmetic yields.
//!
//! ## Public API
//!
//! - Column functions: [`sma`], [`ema`], [`macd`], [`bollinger_bands`],
//!   [`rsi`], [`true_range`], [`atr`], [`obv`].
//! - [`IndicatorEngine`]: computes the full dashboard column set into an
//!   [`IndicatorSeries`].

pub mod atr;
pub mod bollinger;
pub mod macd;
pub mod moving_average;
pub mod obv;
mod rolling;
pub mod rsi;
pub mod series;

pub use atr::{atr, true_range};
pub use bollinger::{bollinger_bands, BollingerBands};
pub use macd::{macd, Macd};
pub use moving_average::{ema, sma};
pub use obv::obv;
pub use rsi::rsi;
pub use series::{IndicatorEngine, IndicatorParams, IndicatorRow, IndicatorSeries};

/// One derived column. `None` marks "not available".
pub type Column = Vec<Option<f64>>;
