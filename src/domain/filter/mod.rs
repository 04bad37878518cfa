//! Smoothing filter bank.
//!
//! Six independent, stateless transforms from a [`PriceSeries`] to a
//! [`SmoothedSeries`]. Each output has the same index domain as the input;
//! indices where a window has not yet filled are flagged invalid rather than
//! carrying NaN.

pub mod ema;
pub mod kalman;
pub mod lowess;
pub mod savgol;
pub mod sma;
pub mod wma;

pub use ema::calculate_ema;
pub use kalman::calculate_kalman;
pub use lowess::calculate_lowess;
pub use savgol::calculate_savgol;
pub use sma::calculate_sma;
pub use wma::{calculate_wma, linear_weights};

use crate::domain::error::SmoothcastError;
use crate::domain::series::{FilterType, PriceSeries, SmoothedPoint};

/// Reject a window that cannot slide over the series at all.
pub(crate) fn check_window(
    filter: &FilterType,
    window: usize,
    len: usize,
) -> Result<(), SmoothcastError> {
    if window == 0 {
        return Err(SmoothcastError::InvalidFilterParameters {
            filter: filter.to_string(),
            reason: "window must be at least 1".into(),
        });
    }
    if window > len {
        return Err(SmoothcastError::InvalidFilterParameters {
            filter: filter.to_string(),
            reason: format!("window {} exceeds series length {}", window, len),
        });
    }
    Ok(())
}

/// Warmup placeholder for index `i` of the input series.
pub(crate) fn warmup_point(series: &PriceSeries, i: usize) -> SmoothedPoint {
    SmoothedPoint {
        date: series.points()[i].date,
        valid: false,
        value: 0.0,
    }
}
