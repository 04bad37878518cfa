//! ARIMA forecast stage.
//!
//! Order selection is explicit rather than library-magic: d comes from a
//! unit-root test capped at 2, then (p, q) are searched over 0..=5 minimizing
//! AICc with ties broken by fewer parameters. Fitting is least-squares based
//! (OLS for AR, conditional iteration for MA, Hannan-Rissanen for mixed
//! models); prediction intervals come from the psi-weight expansion of the
//! fitted model, so their widths are non-decreasing in the horizon step.

pub mod arima;
pub mod stationarity;

use crate::domain::error::SmoothcastError;
use crate::domain::series::PriceSeries;
use std::fmt;

/// Model order triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArimaOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
}

impl ArimaOrder {
    pub fn parameter_count(&self) -> usize {
        // AR + MA coefficients plus the intercept.
        self.p + self.q + 1
    }
}

impl fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)
    }
}

/// One horizon step of the forecast with both interval bands.
#[derive(Debug, Clone)]
pub struct ForecastPoint {
    pub step: usize,
    pub mean: f64,
    pub lower_80: f64,
    pub upper_80: f64,
    pub lower_95: f64,
    pub upper_95: f64,
}

impl ForecastPoint {
    pub fn width_80(&self) -> f64 {
        self.upper_80 - self.lower_80
    }

    pub fn width_95(&self) -> f64 {
        self.upper_95 - self.lower_95
    }
}

/// Final forecast artifact: selected order, fitted coefficients, and the
/// projected path with 80%/95% prediction intervals.
#[derive(Debug, Clone)]
pub struct Forecast {
    pub order: ArimaOrder,
    pub ar: Vec<f64>,
    pub ma: Vec<f64>,
    pub constant: f64,
    pub sigma2: f64,
    pub aicc: f64,
    pub points: Vec<ForecastPoint>,
}

impl Forecast {
    /// Textual summary of the selected model and its coefficients.
    pub fn summary(&self) -> String {
        let mut out = format!("{} selected by AICc\n", self.order);

        for (i, &phi) in self.ar.iter().enumerate() {
            out.push_str(&format!("  ar{}  = {:+.6}\n", i + 1, phi));
        }
        for (i, &theta) in self.ma.iter().enumerate() {
            out.push_str(&format!("  ma{}  = {:+.6}\n", i + 1, theta));
        }
        out.push_str(&format!("  mean = {:+.6}\n", self.constant));
        out.push_str(&format!("  sigma^2 = {:.6}\n", self.sigma2));
        out.push_str(&format!("  AICc = {:.2}\n", self.aicc));
        out
    }
}

/// Fit an auto-selected ARIMA model to the series and forecast `horizon`
/// steps ahead.
pub fn auto_forecast(
    series: &PriceSeries,
    horizon: usize,
) -> Result<Forecast, SmoothcastError> {
    arima::auto_forecast(&series.prices(), horizon)
}
