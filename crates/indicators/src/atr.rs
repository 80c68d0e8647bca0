use core_types::PriceBar;

use crate::rolling;
use crate::Column;

/// True range of every bar: `max(high - low, |high - prev_close|, |low - prev_close|)`.
///
/// The first bar has no previous close and uses `high - low` alone.
pub fn true_range(bars: &[PriceBar]) -> Vec<f64> {
    let mut prev_close: Option<f64> = None;
    bars.iter()
        .map(|bar| {
            let range = bar.high - bar.low;
            let tr = match prev_close {
                None => range,
                Some(pc) => range.max((bar.high - pc).abs()).max((bar.low - pc).abs()),
            };
            prev_close = Some(bar.close);
            tr
        })
        .collect()
}

/// Average True Range: the simple rolling mean of [`true_range`] over `period` bars.
pub fn atr(bars: &[PriceBar], period: usize) -> Column {
    rolling::mean(&true_range(bars), period)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn bar(day: u32, high: f64, low: f64, close: f64) -> PriceBar {
        let ts = Utc.with_ymd_and_hms(2024, 3, day, 0, 0, 0).unwrap();
        PriceBar::new(ts, close, high, low, close, 1_000)
    }

    #[test]
    fn first_bar_uses_high_minus_low() {
        let tr = true_range(&[bar(1, 12.0, 9.0, 10.0)]);
        assert_eq!(tr, vec![3.0]);
    }

    #[test]
    fn gaps_widen_the_true_range() {
        let bars = [bar(1, 11.0, 9.0, 10.0), bar(2, 15.0, 14.0, 14.5), bar(3, 9.0, 8.0, 8.5)];
        // gap up: |15 - 10| = 5; gap down: |8 - 14.5| = 6.5
        assert_eq!(true_range(&bars), vec![2.0, 5.0, 6.5]);
    }

    #[test]
    fn atr_averages_over_period() {
        let bars = [bar(1, 11.0, 9.0, 10.0), bar(2, 15.0, 14.0, 14.5), bar(3, 9.0, 8.0, 8.5)];
        let out = atr(&bars, 2);
        assert_eq!(out, vec![None, Some(3.5), Some(5.75)]);
    }

    #[test]
    fn malformed_bar_is_not_corrected() {
        // high < low propagates as-is into the first true range.
        let tr = true_range(&[bar(1, 9.0, 10.0, 9.5)]);
        assert_eq!(tr, vec![-1.0]);
    }
}
