//! OHLCV bar representation.

use chrono::NaiveDateTime;

use super::error::ConfluenceError;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

pub fn volumes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.volume).collect()
}

/// Reject series whose timestamps are not strictly ascending.
pub fn ensure_ascending(bars: &[Bar]) -> Result<(), ConfluenceError> {
    for pair in bars.windows(2) {
        if pair[1].timestamp <= pair[0].timestamp {
            return Err(ConfluenceError::InvalidData {
                reason: format!(
                    "timestamps not strictly ascending: {} followed by {}",
                    pair[0].timestamp, pair[1].timestamp
                ),
            });
        }
    }
    Ok(())
}
