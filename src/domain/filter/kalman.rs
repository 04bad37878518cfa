//! Kalman smoother for the local-level model.
//!
//! State: an unobserved level following a random walk with innovation
//! variance dW, observed with additive Gaussian noise of variance dV. A
//! forward filter pass (recursive mean/variance update) is followed by a
//! Rauch-Tung-Striebel backward pass that produces the smoothed level at
//! every index. dV >> dW yields heavy smoothing; dV << dW tracks the raw
//! series closely.
//!
//! Initialization: filter mean = first observation, filter variance = dV.

use crate::domain::error::SmoothcastError;
use crate::domain::series::{FilterType, PriceSeries, SmoothedPoint, SmoothedSeries};

pub fn calculate_kalman(
    series: &PriceSeries,
    measurement_var: f64,
    process_var: f64,
) -> Result<SmoothedSeries, SmoothcastError> {
    let filter = FilterType::Kalman {
        measurement_var,
        process_var,
    };

    let invalid = |reason: String| SmoothcastError::InvalidFilterParameters {
        filter: filter.to_string(),
        reason,
    };
    if !(measurement_var > 0.0) {
        return Err(invalid(format!(
            "measurement variance {} must be positive",
            measurement_var
        )));
    }
    if !(process_var >= 0.0) {
        return Err(invalid(format!(
            "process variance {} must be non-negative",
            process_var
        )));
    }
    if series.is_empty() {
        return Err(invalid("series is empty".into()));
    }

    let y = series.prices();
    let n = y.len();

    // Forward filter. filtered_* hold the posterior at each step,
    // predicted_var holds the one-step prior variance used by the RTS gain.
    let mut filtered_mean = vec![0.0; n];
    let mut filtered_var = vec![0.0; n];
    let mut predicted_var = vec![0.0; n];

    filtered_mean[0] = y[0];
    filtered_var[0] = measurement_var;
    predicted_var[0] = measurement_var;

    for t in 1..n {
        let prior_var = filtered_var[t - 1] + process_var;
        predicted_var[t] = prior_var;

        let gain = prior_var / (prior_var + measurement_var);
        filtered_mean[t] = filtered_mean[t - 1] + gain * (y[t] - filtered_mean[t - 1]);
        filtered_var[t] = (1.0 - gain) * prior_var;
    }

    // Backward RTS smoothing.
    let mut smoothed = filtered_mean.clone();
    for t in (0..n - 1).rev() {
        let gain = filtered_var[t] / predicted_var[t + 1];
        smoothed[t] = filtered_mean[t] + gain * (smoothed[t + 1] - filtered_mean[t]);
    }

    let values = series
        .points()
        .iter()
        .zip(&smoothed)
        .map(|(point, &value)| SmoothedPoint {
            date: point.date,
            valid: true,
            value,
        })
        .collect();

    Ok(SmoothedSeries { filter, values })
}
