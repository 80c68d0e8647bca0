use crate::rolling;
use crate::Column;

/// Simple moving average of `values` over the trailing `window` entries.
///
/// The first `window - 1` positions are `None`.
pub fn sma(values: &[f64], window: usize) -> Column {
    rolling::mean(values, window)
}

/// Exponential moving average with smoothing factor `2 / (span + 1)`.
///
/// Seeded with the first input value, without bias adjustment, so every
/// position of a non-empty input is defined. A zero span yields `None`
/// everywhere.
pub fn ema(values: &[f64], span: usize) -> Column {
    if span == 0 {
        return vec![None; values.len()];
    }
    ema_values(values, span).into_iter().map(Some).collect()
}

/// The unwrapped recursion behind [`ema`]. `span` must be non-zero.
pub(crate) fn ema_values(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;
    for &value in values {
        let next = match prev {
            None => value,
            Some(p) => alpha * value + (1.0 - alpha) * p,
        };
        out.push(next);
        prev = Some(next);
    }
    out
}
