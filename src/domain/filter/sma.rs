//! Simple Moving Average.
//!
//! SMA(n) at index i is the arithmetic mean of the n prices ending at i.
//! Warmup: first (n-1) indices are invalid.

use crate::domain::error::SmoothcastError;
use crate::domain::filter::{check_window, warmup_point};
use crate::domain::series::{FilterType, PriceSeries, SmoothedPoint, SmoothedSeries};

pub fn calculate_sma(
    series: &PriceSeries,
    window: usize,
) -> Result<SmoothedSeries, SmoothcastError> {
    let filter = FilterType::Sma(window);
    check_window(&filter, window, series.len())?;

    let points = series.points();
    let mut values = Vec::with_capacity(points.len());
    let mut window_sum = 0.0;

    for (i, point) in points.iter().enumerate() {
        window_sum += point.price;
        if i >= window {
            window_sum -= points[i - window].price;
        }

        if i < window - 1 {
            values.push(warmup_point(series, i));
        } else {
            values.push(SmoothedPoint {
                date: point.date,
                valid: true,
                value: window_sum / window as f64,
            });
        }
    }

    Ok(SmoothedSeries { filter, values })
}
