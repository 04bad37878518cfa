//! Price and smoothed series representations.

use crate::domain::error::SmoothcastError;
use chrono::NaiveDate;
use std::fmt;

/// One daily observation of an instrument's adjusted closing price.
#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// An instrument's daily adjusted-close series, ascending by date.
///
/// Construction sorts and rejects duplicate dates; every downstream stage
/// takes the series by shared reference and never mutates it.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(symbol: String, mut points: Vec<PricePoint>) -> Result<Self, SmoothcastError> {
        points.sort_by_key(|p| p.date);
        for pair in points.windows(2) {
            if pair[0].date == pair[1].date {
                return Err(SmoothcastError::DataUnavailable {
                    symbol: symbol.clone(),
                    reason: format!("duplicate date {}", pair[0].date),
                });
            }
        }
        Ok(Self { symbol, points })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Prices without dates, in series order.
    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }
}

/// One output point of a smoothing filter.
///
/// `valid: false` marks warmup indices where the filter's window has not yet
/// filled; the carried value is 0.0 and must not be read.
#[derive(Debug, Clone)]
pub struct SmoothedPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: f64,
}

/// Output of exactly one filter, same index domain as the input series.
#[derive(Debug, Clone)]
pub struct SmoothedSeries {
    pub filter: FilterType,
    pub values: Vec<SmoothedPoint>,
}

impl SmoothedSeries {
    /// Value at index `i` if that index is past warmup.
    pub fn value_at(&self, i: usize) -> Option<f64> {
        self.values.get(i).filter(|p| p.valid).map(|p| p.value)
    }
}

/// Filter identity plus parameters, used for chart labels and stage names.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterType {
    Sma(usize),
    Ema(usize),
    Wma(usize),
    SavitzkyGolay { degree: usize, window: usize },
    Lowess { fraction: f64, iterations: usize },
    Kalman { measurement_var: f64, process_var: f64 },
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterType::Sma(window) => write!(f, "SMA({})", window),
            FilterType::Ema(window) => write!(f, "EMA({})", window),
            FilterType::Wma(window) => write!(f, "WMA({})", window),
            FilterType::SavitzkyGolay { degree, window } => {
                write!(f, "SAVGOL({},{})", degree, window)
            }
            FilterType::Lowess {
                fraction,
                iterations,
            } => write!(f, "LOWESS({},{})", fraction, iterations),
            FilterType::Kalman {
                measurement_var,
                process_var,
            } => write!(f, "KALMAN({},{})", measurement_var, process_var),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Build a series with consecutive January 2024 dates.
    pub fn make_series(prices: &[f64]) -> PriceSeries {
        let points = prices
            .iter()
            .enumerate()
            .map(|(i, &price)| PricePoint {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Days::new(i as u64),
                price,
            })
            .collect();
        PriceSeries::new("TEST".into(), points).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::make_series;
    use super::*;

    #[test]
    fn new_sorts_ascending() {
        let d1 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let series = PriceSeries::new(
            "BHP".into(),
            vec![
                PricePoint { date: d1, price: 2.0 },
                PricePoint { date: d2, price: 1.0 },
            ],
        )
        .unwrap();

        assert_eq!(series.points()[0].date, d2);
        assert_eq!(series.points()[1].date, d1);
    }

    #[test]
    fn new_rejects_duplicate_dates() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let result = PriceSeries::new(
            "BHP".into(),
            vec![
                PricePoint { date: d, price: 1.0 },
                PricePoint { date: d, price: 2.0 },
            ],
        );
        assert!(result.is_err());
    }

    #[test]
    fn prices_in_order() {
        let series = make_series(&[10.0, 20.0, 30.0]);
        assert_eq!(series.prices(), vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn value_at_respects_warmup() {
        let series = SmoothedSeries {
            filter: FilterType::Sma(2),
            values: vec![
                SmoothedPoint {
                    date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                    valid: false,
                    value: 0.0,
                },
                SmoothedPoint {
                    date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                    valid: true,
                    value: 15.0,
                },
            ],
        };
        assert_eq!(series.value_at(0), None);
        assert_eq!(series.value_at(1), Some(15.0));
    }

    #[test]
    fn filter_type_display() {
        assert_eq!(FilterType::Sma(20).to_string(), "SMA(20)");
        assert_eq!(
            FilterType::SavitzkyGolay {
                degree: 3,
                window: 21
            }
            .to_string(),
            "SAVGOL(3,21)"
        );
        assert_eq!(
            FilterType::Lowess {
                fraction: 0.1,
                iterations: 3
            }
            .to_string(),
            "LOWESS(0.1,3)"
        );
    }
}
