use serde::Serialize;

use crate::moving_average::ema_values;
use crate::Column;

/// The three MACD columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Macd {
    /// `EMA(fast) - EMA(slow)` of the close.
    pub line: Column,
    /// `EMA(signal)` of the MACD line.
    pub signal: Column,
    /// `line - signal`.
    pub histogram: Column,
}

/// Moving Average Convergence Divergence over `closes`.
///
/// Both EMAs are defined from the first bar, so the line, signal and
/// histogram are available at every position of a non-empty series. Any zero
/// span makes every column unavailable.
pub fn macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Macd {
    let n = closes.len();
    if fast == 0 || slow == 0 || signal == 0 {
        return Macd {
            line: vec![None; n],
            signal: vec![None; n],
            histogram: vec![None; n],
        };
    }

    let fast_ema = ema_values(closes, fast);
    let slow_ema = ema_values(closes, slow);
    let line: Vec<f64> = fast_ema.iter().zip(&slow_ema).map(|(f, s)| f - s).collect();
    let signal_line = ema_values(&line, signal);
    let histogram = line.iter().zip(&signal_line).map(|(l, s)| Some(l - s)).collect();

    Macd {
        line: line.into_iter().map(Some).collect(),
        signal: signal_line.into_iter().map(Some).collect(),
        histogram,
    }
}
