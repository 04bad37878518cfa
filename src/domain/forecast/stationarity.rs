//! Unit-root testing for differencing-order selection.
//!
//! Augmented Dickey-Fuller regression with a constant:
//! dy_t = a + b*y_{t-1} + sum g_i*dy_{t-i} + e_t, lag order 2*n^(1/3)
//! capped at n/4. The series is judged stationary when the t-statistic on b
//! falls below the finite-sample 5% critical value -2.86 - 4/n.

use nalgebra::{DMatrix, DVector};

const VARIANCE_FLOOR: f64 = 1e-12;

/// Maximum differencing order considered by the auto search.
pub const MAX_DIFFERENCING: usize = 2;

/// ADF t-statistic on the lagged level, or None when the regression cannot
/// be estimated (too few points or singular design).
pub fn adf_statistic(data: &[f64]) -> Option<f64> {
    let n = data.len();
    if n < 10 {
        return None;
    }

    let diff: Vec<f64> = data.windows(2).map(|w| w[1] - w[0]).collect();

    let lag = (((n as f64).powf(1.0 / 3.0) * 2.0) as usize)
        .min(n / 4)
        .max(1);
    let effective_n = diff.len().checked_sub(lag)?;
    let num_regressors = 2 + lag;
    if effective_n < num_regressors + 2 {
        return None;
    }

    // Regressors: [1, y_{t-1}, dy_{t-1}, ..., dy_{t-lag}]
    let mut x_data = Vec::with_capacity(effective_n * num_regressors);
    for t in lag..diff.len() {
        x_data.push(1.0);
        x_data.push(data[t]);
        for i in 1..=lag {
            x_data.push(diff[t - i]);
        }
    }

    let x = DMatrix::from_row_slice(effective_n, num_regressors, &x_data);
    let y = DVector::from_vec(diff[lag..].to_vec());

    let xtx = x.transpose() * &x;
    let xty = x.transpose() * &y;
    let xtx_inv = xtx.try_inverse()?;
    let beta = &xtx_inv * xty;

    let residuals = &y - &x * &beta;
    let sse: f64 = residuals.iter().map(|r| r * r).sum();
    let dof = effective_n.checked_sub(num_regressors)?;
    if dof == 0 {
        return None;
    }
    let mse = sse / dof as f64;

    let se = (mse * xtx_inv[(1, 1)]).sqrt();
    if !(se > 0.0) {
        return None;
    }

    Some(beta[1] / se)
}

/// 5% critical value with a small-sample adjustment.
fn critical_value(n: usize) -> f64 {
    -2.86 - 4.0 / n as f64
}

/// Judge a series stationary. A degenerate (near-constant) series is
/// stationary by definition; a series the regression cannot handle is
/// conservatively treated as stationary so the search stops differencing.
pub fn is_stationary(data: &[f64]) -> bool {
    if variance(data) < VARIANCE_FLOOR {
        return true;
    }
    match adf_statistic(data) {
        Some(t) => t < critical_value(data.len()),
        None => true,
    }
}

/// Difference until stationary, capped at `max_d`.
pub fn choose_differencing(data: &[f64], max_d: usize) -> usize {
    let mut current = data.to_vec();
    for d in 0..max_d {
        if is_stationary(&current) {
            return d;
        }
        current = current.windows(2).map(|w| w[1] - w[0]).collect();
    }
    max_d
}

fn variance(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let mean = data.iter().sum::<f64>() / data.len() as f64;
    data.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / data.len() as f64
}
