//! Trailing-window statistics shared by the windowed indicators.
//!
//! Each window is summed afresh rather than maintained incrementally, so no
//! floating-point drift accumulates over long series.

use crate::Column;

/// Mean of each trailing `window` of `values`.
pub(crate) fn mean(values: &[f64], window: usize) -> Column {
    let mut out = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }
    for end in window..=values.len() {
        let slice = &values[end - window..end];
        out[end - 1] = Some(slice.iter().sum::<f64>() / window as f64);
    }
    out
}

/// Sample standard deviation (ddof = 1) of each trailing `window`.
///
/// A one-element window has no sample deviation and stays `None`.
pub(crate) fn sample_std(values: &[f64], window: usize) -> Column {
    let mut out = vec![None; values.len()];
    if window < 2 || values.len() < window {
        return out;
    }
    for end in window..=values.len() {
        let slice = &values[end - window..end];
        let mean = slice.iter().sum::<f64>() / window as f64;
        let sum_sq: f64 = slice.iter().map(|v| (v - mean) * (v - mean)).sum();
        out[end - 1] = Some((sum_sq / (window - 1) as f64).sqrt());
    }
    out
}
