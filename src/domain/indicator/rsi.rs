//! RSI (Relative Strength Index).
//!
//! Deltas are close-to-close differences; the first bar has no predecessor and
//! contributes a delta of 0. Average gain and average loss are simple means over
//! a trailing window of `period` deltas (not Wilder smoothing).
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0 the ratio is +inf and RSI saturates at 100.
//!
//! Warmup: first (period-1) bars are `None`.

use super::rolling::rolling_mean;

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut gains = Vec::with_capacity(closes.len());
    let mut losses = Vec::with_capacity(closes.len());

    for i in 0..closes.len() {
        let change = if i == 0 { 0.0 } else { closes[i] - closes[i - 1] };
        gains.push(if change > 0.0 { change } else { 0.0 });
        losses.push(if change < 0.0 { -change } else { 0.0 });
    }

    let avg_gains = rolling_mean(&gains, period);
    let avg_losses = rolling_mean(&losses, period);

    avg_gains
        .into_iter()
        .zip(avg_losses)
        .map(|(gain, loss)| match (gain, loss) {
            (Some(gain), Some(loss)) => Some(rsi_from_averages(gain, loss)),
            _ => None,
        })
        .collect()
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
}
