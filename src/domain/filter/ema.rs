//! Exponential Moving Average.
//!
//! k = 2/(n+1). Seeding rule: the value at index (n-1) is the SMA of the
//! first n prices, then EMA[i] = P[i]*k + EMA[i-1]*(1-k). Early values depend
//! on the seed choice, so the seed is part of the contract and tested.
//! Warmup: first (n-1) indices are invalid.

use crate::domain::error::SmoothcastError;
use crate::domain::filter::{check_window, warmup_point};
use crate::domain::series::{FilterType, PriceSeries, SmoothedPoint, SmoothedSeries};

pub fn calculate_ema(
    series: &PriceSeries,
    window: usize,
) -> Result<SmoothedSeries, SmoothcastError> {
    let filter = FilterType::Ema(window);
    check_window(&filter, window, series.len())?;

    let points = series.points();
    let mut values = Vec::with_capacity(points.len());
    let k = 2.0 / (window as f64 + 1.0);
    let mut ema = 0.0;
    let mut seed_sum = 0.0;

    for (i, point) in points.iter().enumerate() {
        if i < window - 1 {
            seed_sum += point.price;
            values.push(warmup_point(series, i));
        } else if i == window - 1 {
            seed_sum += point.price;
            ema = seed_sum / window as f64;
            values.push(SmoothedPoint {
                date: point.date,
                valid: true,
                value: ema,
            });
        } else {
            ema = point.price * k + ema * (1.0 - k);
            values.push(SmoothedPoint {
                date: point.date,
                valid: true,
                value: ema,
            });
        }
    }

    Ok(SmoothedSeries { filter, values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::test_support::make_series;

    #[test]
    fn ema_warmup() {
        let series = make_series(&[10.0, 20.0, 30.0, 40.0]);
        let smoothed = calculate_ema(&series, 3).unwrap();

        assert!(!smoothed.values[0].valid);
        assert!(!smoothed.values[1].valid);
        assert!(smoothed.values[2].valid);
        assert!(smoothed.values[3].valid);
    }

    #[test]
    fn ema_seed_is_sma_of_first_window() {
        let series = make_series(&[10.0, 20.0, 30.0]);
        let smoothed = calculate_ema(&series, 3).unwrap();

        let expected = (10.0 + 20.0 + 30.0) / 3.0;
        assert!((smoothed.value_at(2).unwrap() - expected).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_recursion_after_seed() {
        let series = make_series(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let smoothed = calculate_ema(&series, 3).unwrap();

        let k = 2.0 / 4.0;
        let seed = 20.0;
        let ema_3 = 40.0 * k + seed * (1.0 - k);
        let ema_4 = 50.0 * k + ema_3 * (1.0 - k);

        assert!((smoothed.value_at(3).unwrap() - ema_3).abs() < f64::EPSILON);
        assert!((smoothed.value_at(4).unwrap() - ema_4).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_window_1_equals_raw_series() {
        let series = make_series(&[10.0, 25.0, 17.0, 42.0]);
        let smoothed = calculate_ema(&series, 1).unwrap();

        for (i, &price) in [10.0, 25.0, 17.0, 42.0].iter().enumerate() {
            assert!((smoothed.value_at(i).unwrap() - price).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn ema_large_window_stays_near_first_window_mean() {
        // As n grows the smoothing factor vanishes and the output flattens
        // toward the seed.
        let mut prices = vec![100.0; 60];
        for (i, p) in prices.iter_mut().enumerate().skip(50) {
            *p = 100.0 + (i - 49) as f64;
        }
        let series = make_series(&prices);
        let smoothed = calculate_ema(&series, 50).unwrap();

        let last = smoothed.value_at(59).unwrap();
        assert!((last - 100.0).abs() < 2.0);
    }

    #[test]
    fn ema_constant_input() {
        let series = make_series(&[100.0; 8]);
        let smoothed = calculate_ema(&series, 3).unwrap();

        for i in 2..8 {
            assert!((smoothed.value_at(i).unwrap() - 100.0).abs() < 1e-12);
        }
    }

    #[test]
    fn ema_invalid_windows_rejected() {
        let series = make_series(&[10.0, 20.0]);
        assert!(calculate_ema(&series, 0).is_err());
        assert!(calculate_ema(&series, 5).is_err());
    }
}
