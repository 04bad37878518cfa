//! Domain error taxonomy.

use chrono::NaiveDate;

/// Top-level error type for smoothcast.
///
/// Every stage fails terminally with one of these; no stage retries or
/// substitutes defaults. The pipeline harness may skip a failed filter and
/// continue with the rest.
#[derive(Debug, thiserror::Error)]
pub enum SmoothcastError {
    #[error("data unavailable for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("no trading days for {symbol} between {start} and {end}")]
    EmptyRange {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("invalid parameters for {filter}: {reason}")]
    InvalidFilterParameters { filter: String, reason: String },

    #[error("invalid weights: {reason}")]
    InvalidWeights { reason: String },

    #[error("no ARIMA candidate converged: {reason}")]
    NonConvergent { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&SmoothcastError> for std::process::ExitCode {
    fn from(err: &SmoothcastError) -> Self {
        let code: u8 = match err {
            SmoothcastError::Io(_) => 1,
            SmoothcastError::InvalidFilterParameters { .. }
            | SmoothcastError::InvalidWeights { .. } => 2,
            SmoothcastError::DataUnavailable { .. } | SmoothcastError::EmptyRange { .. } => 3,
            SmoothcastError::NonConvergent { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
