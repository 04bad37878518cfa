#![allow(dead_code)]

use chrono::NaiveDate;
use smoothcast::domain::error::SmoothcastError;
use smoothcast::domain::series::{PricePoint, PriceSeries};
use smoothcast::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PricePoint>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
        }
    }

    pub fn with_prices(mut self, symbol: &str, points: Vec<PricePoint>) -> Self {
        self.data.insert(symbol.to_string(), points);
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, SmoothcastError> {
        let Some(points) = self.data.get(symbol) else {
            return Err(SmoothcastError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "unknown instrument".into(),
            });
        };

        let in_range: Vec<PricePoint> = points
            .iter()
            .filter(|p| p.date >= start_date && p.date <= end_date)
            .cloned()
            .collect();

        if in_range.is_empty() {
            return Err(SmoothcastError::EmptyRange {
                symbol: symbol.to_string(),
                start: start_date,
                end: end_date,
            });
        }

        PriceSeries::new(symbol.to_string(), in_range)
    }
}

/// Daily points starting 2024-01-01.
pub fn daily_points(prices: &[f64]) -> Vec<PricePoint> {
    prices
        .iter()
        .enumerate()
        .map(|(i, &price)| PricePoint {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(i as u64),
            price,
        })
        .collect()
}

pub fn make_series(symbol: &str, prices: &[f64]) -> PriceSeries {
    PriceSeries::new(symbol.to_string(), daily_points(prices)).unwrap()
}

/// Deterministic white noise in [-1, 1), splitmix64 finalizer.
pub fn pseudo_noise(i: usize) -> f64 {
    let mut z = (i as u64).wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^= z >> 31;
    ((z >> 11) as f64 / (1u64 << 53) as f64) * 2.0 - 1.0
}
