//! CSV file data adapter.
//!
//! One file per instrument, `{SYMBOL}.csv`, columns `date,adj_close` with
//! ISO-8601 dates. Adjusted closes are assumed already split/dividend
//! corrected by whatever produced the file.

use crate::domain::error::SmoothcastError;
use crate::domain::series::{PricePoint, PriceSeries};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

impl DataPort for CsvAdapter {
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, SmoothcastError> {
        let path = self.csv_path(symbol);
        let content =
            fs::read_to_string(&path).map_err(|e| SmoothcastError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: format!("failed to read {}: {}", path.display(), e),
            })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut points = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| SmoothcastError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record
                .get(0)
                .ok_or_else(|| SmoothcastError::DataUnavailable {
                    symbol: symbol.to_string(),
                    reason: "missing date column".into(),
                })?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                SmoothcastError::DataUnavailable {
                    symbol: symbol.to_string(),
                    reason: format!("invalid date format: {}", e),
                }
            })?;

            if date < start_date || date > end_date {
                continue;
            }

            let price: f64 = record
                .get(1)
                .ok_or_else(|| SmoothcastError::DataUnavailable {
                    symbol: symbol.to_string(),
                    reason: "missing adj_close column".into(),
                })?
                .parse()
                .map_err(|e| SmoothcastError::DataUnavailable {
                    symbol: symbol.to_string(),
                    reason: format!("invalid adj_close value: {}", e),
                })?;

            points.push(PricePoint { date, price });
        }

        if points.is_empty() {
            return Err(SmoothcastError::EmptyRange {
                symbol: symbol.to_string(),
                start: start_date,
                end: end_date,
            });
        }

        PriceSeries::new(symbol.to_string(), points)
    }
}
