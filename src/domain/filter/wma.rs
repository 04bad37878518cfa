//! Weighted Moving Average with a caller-supplied weight vector.
//!
//! WMA(n, w) at index i is Σ w[k]·P[i-n+1+k]. The weights must have length
//! n, sum to 1 within floating tolerance, and increase strictly toward the
//! most recent sample. Warmup: first (n-1) indices are invalid.

use crate::domain::error::SmoothcastError;
use crate::domain::filter::{check_window, warmup_point};
use crate::domain::series::{FilterType, PriceSeries, SmoothedPoint, SmoothedSeries};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Normalized arithmetic ramp 1..n, the textbook WMA weighting.
pub fn linear_weights(window: usize) -> Vec<f64> {
    let divisor = (window * (window + 1)) as f64 / 2.0;
    (1..=window).map(|k| k as f64 / divisor).collect()
}

pub fn calculate_wma(
    series: &PriceSeries,
    window: usize,
    weights: &[f64],
) -> Result<SmoothedSeries, SmoothcastError> {
    let filter = FilterType::Wma(window);
    check_window(&filter, window, series.len())?;
    validate_weights(window, weights)?;

    let points = series.points();
    let mut values = Vec::with_capacity(points.len());

    for (i, point) in points.iter().enumerate() {
        if i < window - 1 {
            values.push(warmup_point(series, i));
            continue;
        }

        let start = i + 1 - window;
        let wma: f64 = weights
            .iter()
            .enumerate()
            .map(|(k, &w)| w * points[start + k].price)
            .sum();

        values.push(SmoothedPoint {
            date: point.date,
            valid: true,
            value: wma,
        });
    }

    Ok(SmoothedSeries { filter, values })
}

fn validate_weights(window: usize, weights: &[f64]) -> Result<(), SmoothcastError> {
    if weights.len() != window {
        return Err(SmoothcastError::InvalidWeights {
            reason: format!(
                "expected {} weights for window {}, got {}",
                window,
                window,
                weights.len()
            ),
        });
    }

    let sum: f64 = weights.iter().sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(SmoothcastError::InvalidWeights {
            reason: format!("weights sum to {}, expected 1", sum),
        });
    }

    for pair in weights.windows(2) {
        if pair[1] <= pair[0] {
            return Err(SmoothcastError::InvalidWeights {
                reason: "weights must increase strictly toward the newest sample".into(),
            });
        }
    }

    Ok(())
}
