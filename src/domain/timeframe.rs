//! Bar timeframes supported by the data source.

use std::fmt;

use chrono::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Timeframe {
    OneMinute,
    #[default]
    FiveMinutes,
    FifteenMinutes,
    OneHour,
    OneDay,
}

impl Timeframe {
    pub const ALL: [Timeframe; 5] = [
        Timeframe::OneMinute,
        Timeframe::FiveMinutes,
        Timeframe::FifteenMinutes,
        Timeframe::OneHour,
        Timeframe::OneDay,
    ];

    /// Parse a label such as `5Min` or `1hour`. Unrecognized labels fall back
    /// to five-minute bars.
    pub fn parse_or_default(value: &str) -> Self {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|tf| tf.label().eq_ignore_ascii_case(value))
            .unwrap_or_default()
    }

    pub fn label(self) -> &'static str {
        match self {
            Timeframe::OneMinute => "1Min",
            Timeframe::FiveMinutes => "5Min",
            Timeframe::FifteenMinutes => "15Min",
            Timeframe::OneHour => "1Hour",
            Timeframe::OneDay => "1Day",
        }
    }

    pub fn duration(self) -> Duration {
        match self {
            Timeframe::OneMinute => Duration::minutes(1),
            Timeframe::FiveMinutes => Duration::minutes(5),
            Timeframe::FifteenMinutes => Duration::minutes(15),
            Timeframe::OneHour => Duration::hours(1),
            Timeframe::OneDay => Duration::days(1),
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
