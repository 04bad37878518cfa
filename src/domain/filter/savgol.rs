//! Savitzky-Golay smoothing.
//!
//! Fits a degree-p polynomial by least squares to each window of n
//! consecutive prices and evaluates the fit at the window center. Requires n
//! odd and n > p.
//!
//! Edge policy: truncated-window fit. The first and last (n-1)/2 points are
//! fitted with the nearest full window and the polynomial is evaluated at the
//! point's own offset inside that window, so every index is defined.

use crate::domain::error::SmoothcastError;
use crate::domain::series::{FilterType, PriceSeries, SmoothedPoint, SmoothedSeries};
use nalgebra::DMatrix;

pub fn calculate_savgol(
    series: &PriceSeries,
    degree: usize,
    window: usize,
) -> Result<SmoothedSeries, SmoothcastError> {
    let filter = FilterType::SavitzkyGolay { degree, window };
    validate_params(&filter, degree, window, series.len())?;

    // Hat matrix H = A (A'A)^-1 A' over centered positions -h..h. Row t of H
    // gives the smoothing weights for evaluating the window fit at offset t.
    let hat = hat_matrix(&filter, degree, window)?;

    let points = series.points();
    let len = points.len();
    let half = (window - 1) / 2;
    let mut values = Vec::with_capacity(len);

    for (i, point) in points.iter().enumerate() {
        // Nearest full window and the point's row inside it.
        let (start, row) = if i < half {
            (0, i)
        } else if i + half >= len {
            (len - window, i - (len - window))
        } else {
            (i - half, half)
        };

        let fitted: f64 = (0..window)
            .map(|j| hat[(row, j)] * points[start + j].price)
            .sum();

        values.push(SmoothedPoint {
            date: point.date,
            valid: true,
            value: fitted,
        });
    }

    Ok(SmoothedSeries { filter, values })
}

fn validate_params(
    filter: &FilterType,
    degree: usize,
    window: usize,
    len: usize,
) -> Result<(), SmoothcastError> {
    let invalid = |reason: String| SmoothcastError::InvalidFilterParameters {
        filter: filter.to_string(),
        reason,
    };

    if window % 2 == 0 {
        return Err(invalid(format!("window {} must be odd", window)));
    }
    if window <= degree {
        return Err(invalid(format!(
            "window {} must exceed polynomial degree {}",
            window, degree
        )));
    }
    if window > len {
        return Err(invalid(format!(
            "window {} exceeds series length {}",
            window, len
        )));
    }
    Ok(())
}

fn hat_matrix(
    filter: &FilterType,
    degree: usize,
    window: usize,
) -> Result<DMatrix<f64>, SmoothcastError> {
    let half = (window - 1) as f64 / 2.0;

    // Vandermonde over centered positions.
    let design = DMatrix::from_fn(window, degree + 1, |row, col| {
        (row as f64 - half).powi(col as i32)
    });

    let normal = design.transpose() * &design;
    let normal_inv =
        normal
            .try_inverse()
            .ok_or_else(|| SmoothcastError::InvalidFilterParameters {
                filter: filter.to_string(),
                reason: "least-squares design matrix is singular".into(),
            })?;

    Ok(&design * normal_inv * design.transpose())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::test_support::make_series;
    use approx::assert_relative_eq;

    #[test]
    fn savgol_rejects_even_window() {
        let series = make_series(&[1.0; 20]);
        assert!(matches!(
            calculate_savgol(&series, 3, 10),
            Err(SmoothcastError::InvalidFilterParameters { .. })
        ));
    }

    #[test]
    fn savgol_rejects_degree_not_below_window() {
        let series = make_series(&[1.0; 20]);
        assert!(calculate_savgol(&series, 5, 5).is_err());
        assert!(calculate_savgol(&series, 7, 5).is_err());
    }

    #[test]
    fn savgol_rejects_window_longer_than_series() {
        let series = make_series(&[1.0; 5]);
        assert!(calculate_savgol(&series, 2, 7).is_err());
    }

    #[test]
    fn savgol_constant_input() {
        let series = make_series(&[100.0; 30]);
        let smoothed = calculate_savgol(&series, 3, 7).unwrap();

        for i in 0..30 {
            assert_relative_eq!(smoothed.value_at(i).unwrap(), 100.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn savgol_reproduces_polynomial_of_fit_degree() {
        // A cubic is inside the model space of a degree-3 fit, so the filter
        // must return it exactly, edges included.
        let prices: Vec<f64> = (0..25)
            .map(|i| {
                let x = i as f64;
                0.5 * x * x * x - 2.0 * x * x + 3.0 * x + 10.0
            })
            .collect();
        let series = make_series(&prices);
        let smoothed = calculate_savgol(&series, 3, 9).unwrap();

        for (i, &expected) in prices.iter().enumerate() {
            assert_relative_eq!(smoothed.value_at(i).unwrap(), expected, epsilon = 1e-6);
        }
    }

    #[test]
    fn savgol_every_index_defined() {
        let series = make_series(&[3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0, 5.0, 3.0]);
        let smoothed = calculate_savgol(&series, 2, 5).unwrap();

        assert_eq!(smoothed.values.len(), 10);
        assert!(smoothed.values.iter().all(|p| p.valid));
        assert!(smoothed.values.iter().all(|p| p.value.is_finite()));
    }

    #[test]
    fn savgol_smooths_noise() {
        let prices: Vec<f64> = (0..40)
            .map(|i| 100.0 + if i % 2 == 0 { 1.0 } else { -1.0 })
            .collect();
        let series = make_series(&prices);
        let smoothed = calculate_savgol(&series, 2, 11).unwrap();

        // Interior fit stays much closer to the 100 level than the raw swing.
        for i in 5..35 {
            assert!((smoothed.value_at(i).unwrap() - 100.0).abs() < 0.9);
        }
    }
}
