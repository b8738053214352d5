//! Bar source port trait.

use chrono::NaiveDate;

use crate::domain::error::ConfluenceError;
use crate::domain::ohlcv::Bar;
use crate::domain::timeframe::Timeframe;

pub trait DataPort {
    /// The most recent `limit` bars, ascending by timestamp.
    ///
    /// Collaborator failures surface as
    /// [`ConfluenceError::UpstreamUnavailable`].
    fn get_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Bar>, ConfluenceError>;

    /// Every bar whose date falls within `[start, end]`; `None` leaves that
    /// side open.
    fn fetch_range(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Bar>, ConfluenceError>;
}
