//! Price data access port.

use crate::domain::error::SmoothcastError;
use crate::domain::series::PriceSeries;
use chrono::NaiveDate;

/// Source of daily adjusted-close prices.
///
/// One attempt, fail fast: implementations perform a single fetch with no
/// retry loop. `DataUnavailable` when the instrument is unknown or the feed
/// unreachable; `EmptyRange` when no trading days fall inside the inclusive
/// range.
pub trait DataPort {
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, SmoothcastError>;
}
