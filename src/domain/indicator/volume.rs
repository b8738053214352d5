//! Volume anomaly flag.
//!
//! volume_ma = SMA(volume, period). A bar is a spike when
//! volume > 1.5 × volume_ma. A spike on an up-close is +1, on a down-close -1,
//! anything else (including the first bar and the warmup) is 0.

use super::rolling::rolling_mean;

pub const DEFAULT_PERIOD: usize = 20;
pub const SPIKE_MULTIPLIER: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumePoint {
    pub volume_ma: Option<f64>,
    pub signal: i8,
}

pub fn calculate_volume_signal(closes: &[f64], volumes: &[f64], period: usize) -> Vec<VolumePoint> {
    let averages = rolling_mean(volumes, period);

    averages
        .into_iter()
        .enumerate()
        .map(|(i, volume_ma)| {
            let spike = volume_ma.is_some_and(|ma| volumes[i] > ma * SPIKE_MULTIPLIER);
            let signal = match (spike, i.checked_sub(1).map(|p| closes[p])) {
                (true, Some(prev)) if closes[i] > prev => 1,
                (true, Some(prev)) if closes[i] < prev => -1,
                _ => 0,
            };
            VolumePoint { volume_ma, signal }
        })
        .collect()
}
