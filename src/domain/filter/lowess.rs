//! Lowess (locally weighted scatterplot smoothing).
//!
//! Cleveland's algorithm over index positions: for each point, a weighted
//! linear regression over the ceil(f*n) nearest neighbors with tricube
//! distance weights, followed by robustness iterations that down-weight
//! high-residual points with the bisquare function. Deterministic for a given
//! fraction and iteration count.

use crate::domain::error::SmoothcastError;
use crate::domain::series::{FilterType, PriceSeries, SmoothedPoint, SmoothedSeries};

pub const DEFAULT_ROBUSTNESS_ITERATIONS: usize = 3;

pub fn calculate_lowess(
    series: &PriceSeries,
    fraction: f64,
    iterations: usize,
) -> Result<SmoothedSeries, SmoothcastError> {
    let filter = FilterType::Lowess {
        fraction,
        iterations,
    };

    if !(fraction > 0.0 && fraction <= 1.0) {
        return Err(SmoothcastError::InvalidFilterParameters {
            filter: filter.to_string(),
            reason: format!("bandwidth fraction {} must be in (0, 1]", fraction),
        });
    }
    let n = series.len();
    if n < 2 {
        return Err(SmoothcastError::InvalidFilterParameters {
            filter: filter.to_string(),
            reason: format!("need at least 2 points, got {}", n),
        });
    }

    let y = series.prices();
    // A local line needs at least two neighbors.
    let span = ((fraction * n as f64).ceil() as usize).clamp(2, n);

    let mut robustness = vec![1.0; n];
    let mut fitted = vec![0.0; n];

    for iteration in 0..=iterations {
        for i in 0..n {
            fitted[i] = fit_local_line(&y, &robustness, i, span);
        }

        if iteration == iterations {
            break;
        }

        // Bisquare down-weighting of high-residual points for the next pass.
        let abs_residuals: Vec<f64> = y
            .iter()
            .zip(&fitted)
            .map(|(&yi, &fi)| (yi - fi).abs())
            .collect();
        let mut sorted = abs_residuals.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let median = sorted[n / 2];

        if median <= 1e-12 {
            break;
        }

        for (r, &abs_res) in robustness.iter_mut().zip(&abs_residuals) {
            let u = abs_res / (6.0 * median);
            *r = if u >= 1.0 { 0.0 } else { (1.0 - u * u).powi(2) };
        }
    }

    let values = series
        .points()
        .iter()
        .zip(&fitted)
        .map(|(point, &value)| SmoothedPoint {
            date: point.date,
            valid: true,
            value,
        })
        .collect();

    Ok(SmoothedSeries { filter, values })
}

/// Weighted linear fit over the `span` nearest neighbors of index `i`,
/// evaluated at `i`.
fn fit_local_line(y: &[f64], robustness: &[f64], i: usize, span: usize) -> f64 {
    let n = y.len();

    // Nearest neighbors by index distance form a contiguous window.
    let mut start = i.saturating_sub(span / 2);
    if start + span > n {
        start = n - span;
    }
    // Slide toward the true nearest set when the window is off-center.
    while start + span < n && (i - start) > (start + span - i) {
        start += 1;
    }
    let end = start + span;

    let xi = i as f64;
    let h = ((i - start).max(end - 1 - i)) as f64;
    let h = if h > 0.0 { h } else { 1.0 };

    let mut sum_w = 0.0;
    let mut sum_wx = 0.0;
    let mut sum_wy = 0.0;
    let mut sum_wxx = 0.0;
    let mut sum_wxy = 0.0;

    for j in start..end {
        let d = ((j as f64) - xi).abs() / h;
        let tricube = if d >= 1.0 {
            0.0
        } else {
            let t = 1.0 - d * d * d;
            t * t * t
        };
        let w = tricube * robustness[j];
        if w <= 0.0 {
            continue;
        }

        let x = j as f64;
        sum_w += w;
        sum_wx += w * x;
        sum_wy += w * y[j];
        sum_wxx += w * x * x;
        sum_wxy += w * x * y[j];
    }

    if sum_w <= 0.0 {
        return y[i];
    }

    let mean_x = sum_wx / sum_w;
    let mean_y = sum_wy / sum_w;
    let var_x = sum_wxx / sum_w - mean_x * mean_x;

    if var_x <= 1e-12 {
        // All weight on one x position; fall back to the weighted mean.
        return mean_y;
    }

    let cov_xy = sum_wxy / sum_w - mean_x * mean_y;
    let slope = cov_xy / var_x;
    mean_y + slope * (xi - mean_x)
}
