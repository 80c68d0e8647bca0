use crate::rolling;
use crate::Column;

/// Relative Strength Index of `closes` using simple rolling averages.
///
/// Gains and losses are the positive and negative parts of the per-bar
/// change. Their means over `period` changes give `RS = gain / loss` and
/// `RSI = 100 - 100 / (1 + RS)`. The first bar has no change, so the first
/// defined position is index `period`.
///
/// When the average loss is zero the RSI is 100, including a window with no
/// movement at all.
pub fn rsi(closes: &[f64], period: usize) -> Column {
    let n = closes.len();
    let mut out = vec![None; n];
    if period == 0 || n < 2 {
        return out;
    }

    let (gains, losses): (Vec<f64>, Vec<f64>) = closes
        .windows(2)
        .map(|w| {
            let delta = w[1] - w[0];
            (delta.max(0.0), (-delta).max(0.0))
        })
        .unzip();

    let avg_gain = rolling::mean(&gains, period);
    let avg_loss = rolling::mean(&losses, period);

    // Change j describes the move into bar j + 1.
    for (j, (gain, loss)) in avg_gain.iter().zip(&avg_loss).enumerate() {
        if let (Some(gain), Some(loss)) = (gain, loss) {
            out[j + 1] = Some(strength_index(*gain, *loss));
        }
    }
    out
}

fn strength_index(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}
