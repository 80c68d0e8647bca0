use serde::Serialize;

use crate::rolling;
use crate::Column;

/// Upper, middle and lower Bollinger Bands.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BollingerBands {
    pub upper: Column,
    pub middle: Column,
    pub lower: Column,
}

/// Bollinger Bands of `closes`: `SMA(window) ± k * σ`.
///
/// `σ` is the sample standard deviation (ddof = 1) over the same trailing
/// window. The first `window - 1` positions are `None` in every band.
pub fn bollinger_bands(closes: &[f64], window: usize, k: f64) -> BollingerBands {
    let middle = rolling::mean(closes, window);
    let std_dev = rolling::sample_std(closes, window);

    let (upper, lower): (Column, Column) = middle
        .iter()
        .zip(&std_dev)
        .map(|(m, s)| match (m, s) {
            (Some(m), Some(s)) => (Some(m + k * s), Some(m - k * s)),
            _ => (None, None),
        })
        .unzip();

    BollingerBands {
        upper,
        middle,
        lower,
    }
}
