use core_types::PriceBar;
use std::cmp::Ordering;

/// On-Balance Volume.
///
/// Seeded with the first bar's volume, then adds the bar's volume when the
/// close rose, subtracts it when the close fell and carries the previous
/// value when the close is unchanged.
pub fn obv(bars: &[PriceBar]) -> Vec<i64> {
    let mut out = Vec::with_capacity(bars.len());
    let mut iter = bars.iter();
    let Some(first) = iter.next() else {
        return out;
    };

    let mut running = volume_of(first);
    let mut prev_close = first.close;
    out.push(running);

    for bar in iter {
        let volume = volume_of(bar);
        running = match bar.close.partial_cmp(&prev_close) {
            Some(Ordering::Greater) => running.saturating_add(volume),
            Some(Ordering::Less) => running.saturating_sub(volume),
            _ => running,
        };
        prev_close = bar.close;
        out.push(running);
    }
    out
}

fn volume_of(bar: &PriceBar) -> i64 {
    i64::try_from(bar.volume).unwrap_or(i64::MAX)
}
