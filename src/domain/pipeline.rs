//! Pipeline orchestration: filter bank plus forecast over one price series.
//!
//! Stages are independent; a failing stage is recorded and the remaining
//! stages still run, so one bad parameter set never aborts the whole batch.

use crate::domain::error::SmoothcastError;
use crate::domain::filter::{
    calculate_ema, calculate_kalman, calculate_lowess, calculate_savgol, calculate_sma,
    calculate_wma,
};
use crate::domain::forecast::{self, Forecast};
use crate::domain::series::{FilterType, PriceSeries, SmoothedSeries};

/// Parameters for one full run. `filters` defaults to the six textbook
/// stages; callers may trim or reorder it.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub filters: Vec<FilterSpec>,
    pub horizon: usize,
}

/// One filter-bank stage with its parameters.
#[derive(Debug, Clone)]
pub enum FilterSpec {
    Sma { window: usize },
    Ema { window: usize },
    Wma { window: usize, weights: Vec<f64> },
    SavitzkyGolay { degree: usize, window: usize },
    Lowess { fraction: f64, iterations: usize },
    Kalman { measurement_var: f64, process_var: f64 },
}

impl FilterSpec {
    /// Stage name for error reporting, matching the filter's display form.
    pub fn name(&self) -> String {
        match self {
            FilterSpec::Sma { window } => FilterType::Sma(*window).to_string(),
            FilterSpec::Ema { window } => FilterType::Ema(*window).to_string(),
            FilterSpec::Wma { window, .. } => FilterType::Wma(*window).to_string(),
            FilterSpec::SavitzkyGolay { degree, window } => FilterType::SavitzkyGolay {
                degree: *degree,
                window: *window,
            }
            .to_string(),
            FilterSpec::Lowess {
                fraction,
                iterations,
            } => FilterType::Lowess {
                fraction: *fraction,
                iterations: *iterations,
            }
            .to_string(),
            FilterSpec::Kalman {
                measurement_var,
                process_var,
            } => FilterType::Kalman {
                measurement_var: *measurement_var,
                process_var: *process_var,
            }
            .to_string(),
        }
    }

    fn apply(&self, series: &PriceSeries) -> Result<SmoothedSeries, SmoothcastError> {
        match self {
            FilterSpec::Sma { window } => calculate_sma(series, *window),
            FilterSpec::Ema { window } => calculate_ema(series, *window),
            FilterSpec::Wma { window, weights } => calculate_wma(series, *window, weights),
            FilterSpec::SavitzkyGolay { degree, window } => {
                calculate_savgol(series, *degree, *window)
            }
            FilterSpec::Lowess {
                fraction,
                iterations,
            } => calculate_lowess(series, *fraction, *iterations),
            FilterSpec::Kalman {
                measurement_var,
                process_var,
            } => calculate_kalman(series, *measurement_var, *process_var),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            filters: vec![
                FilterSpec::Sma { window: 20 },
                FilterSpec::Ema { window: 20 },
                FilterSpec::Wma {
                    window: 5,
                    weights: crate::domain::filter::linear_weights(5),
                },
                FilterSpec::SavitzkyGolay {
                    degree: 3,
                    window: 21,
                },
                FilterSpec::Lowess {
                    fraction: 0.1,
                    iterations: crate::domain::filter::lowess::DEFAULT_ROBUSTNESS_ITERATIONS,
                },
                FilterSpec::Kalman {
                    measurement_var: 1.0,
                    process_var: 0.01,
                },
            ],
            horizon: 20,
        }
    }
}

/// Outcome of one stage: the smoothed series, or the stage name with the
/// error that stopped it.
#[derive(Debug)]
pub enum StageOutcome {
    Smoothed(SmoothedSeries),
    Failed {
        stage: String,
        error: SmoothcastError,
    },
}

/// Result of a full run over one series.
#[derive(Debug)]
pub struct PipelineRun {
    pub stages: Vec<StageOutcome>,
    pub forecast: Result<Forecast, SmoothcastError>,
}

impl PipelineRun {
    pub fn smoothed(&self) -> impl Iterator<Item = &SmoothedSeries> {
        self.stages.iter().filter_map(|s| match s {
            StageOutcome::Smoothed(series) => Some(series),
            StageOutcome::Failed { .. } => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &SmoothcastError)> {
        self.stages.iter().filter_map(|s| match s {
            StageOutcome::Failed { stage, error } => Some((stage.as_str(), error)),
            StageOutcome::Smoothed(_) => None,
        })
    }
}

/// Run every configured filter and the forecast against the series.
pub fn run(series: &PriceSeries, config: &PipelineConfig) -> PipelineRun {
    let stages = config
        .filters
        .iter()
        .map(|spec| match spec.apply(series) {
            Ok(smoothed) => StageOutcome::Smoothed(smoothed),
            Err(error) => StageOutcome::Failed {
                stage: spec.name(),
                error,
            },
        })
        .collect();

    let forecast = forecast::auto_forecast(series, config.horizon);

    PipelineRun { stages, forecast }
}
