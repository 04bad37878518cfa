//! ARIMA fitting, order search, and interval forecasting.

use crate::domain::error::SmoothcastError;
use crate::domain::forecast::stationarity::{MAX_DIFFERENCING, choose_differencing};
use crate::domain::forecast::{ArimaOrder, Forecast, ForecastPoint};
use nalgebra::{DMatrix, DVector};

/// Upper bound of the (p, q) search grid.
pub const MAX_ORDER: usize = 5;

const Z_80: f64 = 1.2816;
const Z_95: f64 = 1.9600;
const SIGMA2_FLOOR: f64 = 1e-12;
const AICC_TIE_TOLERANCE: f64 = 1e-9;

/// A fitted model on the d-differenced scale.
#[derive(Debug, Clone)]
pub struct FittedArima {
    pub order: ArimaOrder,
    pub ar: Vec<f64>,
    pub ma: Vec<f64>,
    pub constant: f64,
    pub sigma2: f64,
    pub aicc: f64,
    residuals: Vec<f64>,
}

/// Difference a series d times.
pub fn difference(data: &[f64], d: usize) -> Vec<f64> {
    let mut result = data.to_vec();
    for _ in 0..d {
        if result.len() < 2 {
            return vec![];
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Fit one candidate order. None when the sample is too short, the design is
/// singular, or the estimate is numerically unusable.
pub fn fit(data: &[f64], order: ArimaOrder) -> Option<FittedArima> {
    let diff = difference(data, order.d);
    if diff.len() < order.p.max(order.q) * 2 + 5 {
        return None;
    }

    let (ar, ma, constant, residuals) = match (order.p, order.q) {
        (0, 0) => estimate_mean_only(&diff),
        (p, 0) => estimate_ar(&diff, p)?,
        (0, q) => estimate_ma(&diff, q)?,
        (p, q) => estimate_arma(&diff, p, q)?,
    };

    if !ar.iter().chain(&ma).chain([&constant]).all(|v| v.is_finite()) {
        return None;
    }
    if !residuals.iter().all(|r| r.is_finite()) {
        return None;
    }

    let n = residuals.len() as f64;
    let k = order.parameter_count() as f64;
    if n <= k + 1.0 {
        return None;
    }

    let sigma2 = residuals.iter().map(|r| r * r).sum::<f64>() / n;
    let sigma2_for_lik = sigma2.max(SIGMA2_FLOOR);
    let log_likelihood =
        -0.5 * n * (1.0 + (2.0 * std::f64::consts::PI * sigma2_for_lik).ln());
    let aic = -2.0 * log_likelihood + 2.0 * k;
    let aicc = aic + 2.0 * k * (k + 1.0) / (n - k - 1.0);

    Some(FittedArima {
        order,
        ar,
        ma,
        constant,
        sigma2,
        aicc,
        residuals,
    })
}

/// Mean-only ARIMA(0,d,0): intercept is the sample mean of the differenced
/// series.
fn estimate_mean_only(diff: &[f64]) -> (Vec<f64>, Vec<f64>, f64, Vec<f64>) {
    let mean = diff.iter().sum::<f64>() / diff.len() as f64;
    let residuals = diff.iter().map(|v| v - mean).collect();
    (vec![], vec![], mean, residuals)
}

/// AR(p) by OLS with intercept.
fn estimate_ar(diff: &[f64], p: usize) -> Option<(Vec<f64>, Vec<f64>, f64, Vec<f64>)> {
    let n = diff.len();
    let effective_n = n.checked_sub(p)?;
    if effective_n < p + 3 {
        return None;
    }

    // Regressors: [1, y_{t-1}, ..., y_{t-p}]
    let mut x_data = Vec::with_capacity(effective_n * (p + 1));
    for t in p..n {
        x_data.push(1.0);
        for i in 1..=p {
            x_data.push(diff[t - i]);
        }
    }

    let x = DMatrix::from_row_slice(effective_n, p + 1, &x_data);
    let y = DVector::from_vec(diff[p..].to_vec());

    let beta = ols(&x, &y)?;
    let constant = beta[0];
    let ar: Vec<f64> = beta.iter().skip(1).cloned().collect();

    let residuals: Vec<f64> = (&y - &x * &beta).iter().cloned().collect();
    Some((ar, vec![], constant, residuals))
}

/// MA(q) by iterative conditional least squares on the centered series.
fn estimate_ma(diff: &[f64], q: usize) -> Option<(Vec<f64>, Vec<f64>, f64, Vec<f64>)> {
    let n = diff.len();
    let mean = diff.iter().sum::<f64>() / n as f64;
    let centered: Vec<f64> = diff.iter().map(|v| v - mean).collect();

    let mut ma = vec![0.0; q];
    let max_iter = 100;
    let tol = 1e-6;

    for _ in 0..max_iter {
        let residuals = ma_residuals(&centered, &ma);

        let mut next = vec![0.0; q];
        for (i, coef) in next.iter_mut().enumerate() {
            let mut num = 0.0;
            let mut den = 0.0;
            for t in (i + 1)..n {
                let lagged = residuals[t - i - 1];
                num += centered[t] * lagged;
                den += lagged * lagged;
            }
            if den > 0.0 {
                *coef = num / den;
            }
        }

        let delta: f64 = ma.iter().zip(&next).map(|(a, b)| (a - b).abs()).sum();
        ma = next;
        if delta < tol {
            break;
        }
    }

    if !ma.iter().all(|v| v.is_finite()) {
        return None;
    }

    let residuals = ma_residuals(&centered, &ma);
    Some((vec![], ma, mean, residuals))
}

/// Conditional residual recursion for an MA model with zero pre-sample
/// shocks.
fn ma_residuals(centered: &[f64], ma: &[f64]) -> Vec<f64> {
    let n = centered.len();
    let q = ma.len();
    let mut residuals = vec![0.0; n];

    for t in 0..n {
        let mut ma_part = 0.0;
        for i in 0..q {
            if t > i {
                ma_part += ma[i] * residuals[t - i - 1];
            }
        }
        residuals[t] = centered[t] - ma_part;
    }

    residuals
}

/// Mixed ARMA(p,q) by two-step Hannan-Rissanen: a long-AR fit supplies
/// residual proxies, then AR and MA terms are estimated jointly by OLS.
fn estimate_arma(
    diff: &[f64],
    p: usize,
    q: usize,
) -> Option<(Vec<f64>, Vec<f64>, f64, Vec<f64>)> {
    let n = diff.len();
    let mean = diff.iter().sum::<f64>() / n as f64;
    let centered: Vec<f64> = diff.iter().map(|v| v - mean).collect();

    let long_order = (p + q).max(10).min(n / 4);
    let (_, _, _, proxy) = estimate_ar(&centered, long_order)?;
    // proxy[r] is the residual at time long_order + r.
    let shock_at = |t: usize| -> Option<f64> {
        t.checked_sub(long_order).and_then(|r| proxy.get(r)).copied()
    };

    let start = (long_order + q).max(p);
    let effective_n = n.checked_sub(start)?;
    let num_params = p + q + 1;
    if effective_n < num_params + 2 {
        return None;
    }

    let mut x_data = Vec::with_capacity(effective_n * num_params);
    let mut y_data = Vec::with_capacity(effective_n);

    for t in start..n {
        y_data.push(centered[t]);
        x_data.push(1.0);
        for i in 1..=p {
            x_data.push(centered[t - i]);
        }
        for i in 1..=q {
            x_data.push(shock_at(t - i)?);
        }
    }

    let x = DMatrix::from_row_slice(effective_n, num_params, &x_data);
    let y = DVector::from_vec(y_data);
    let beta = ols(&x, &y)?;

    let constant = beta[0] + mean;
    let ar: Vec<f64> = beta.iter().skip(1).take(p).cloned().collect();
    let ma: Vec<f64> = beta.iter().skip(1 + p).take(q).cloned().collect();

    let residuals: Vec<f64> = (&y - &x * &beta).iter().cloned().collect();
    Some((ar, ma, constant, residuals))
}

fn ols(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let xtx = x.transpose() * x;
    let xty = x.transpose() * y;
    let xtx_inv = xtx.try_inverse()?;
    Some(&xtx_inv * xty)
}

/// Search d by unit-root test, then (p, q) over the bounded grid minimizing
/// AICc; ties go to the model with fewer parameters.
pub fn auto_fit(data: &[f64]) -> Result<FittedArima, SmoothcastError> {
    let d = choose_differencing(data, MAX_DIFFERENCING);

    let mut best: Option<FittedArima> = None;
    for p in 0..=MAX_ORDER {
        for q in 0..=MAX_ORDER {
            let order = ArimaOrder { p, d, q };
            let Some(candidate) = fit(data, order) else {
                continue;
            };

            let replace = match &best {
                None => true,
                Some(current) => {
                    candidate.aicc < current.aicc - AICC_TIE_TOLERANCE
                        || ((candidate.aicc - current.aicc).abs() <= AICC_TIE_TOLERANCE
                            && candidate.order.parameter_count()
                                < current.order.parameter_count())
                }
            };
            if replace {
                best = Some(candidate);
            }
        }
    }

    best.ok_or_else(|| SmoothcastError::NonConvergent {
        reason: format!(
            "no (p,q) in 0..={} fitted a usable model with d={} on {} observations",
            MAX_ORDER,
            d,
            data.len()
        ),
    })
}

/// Forecast `horizon` steps from a fitted model, with 80%/95% intervals.
pub fn forecast(model: &FittedArima, data: &[f64], horizon: usize) -> Vec<ForecastPoint> {
    let d = model.order.d;
    let p = model.order.p;
    let q = model.order.q;

    // Mean path on the differenced scale, future shocks at zero.
    let mut extended = difference(data, d);
    let mut shocks = model.residuals.clone();
    let mut diff_forecasts = Vec::with_capacity(horizon);

    for _ in 0..horizon {
        let mut value = model.constant;
        for i in 0..p {
            if let Some(&lag) = extended.get(extended.len().wrapping_sub(1 + i)) {
                value += model.ar[i] * lag;
            }
        }
        for i in 0..q {
            if let Some(&shock) = shocks.get(shocks.len().wrapping_sub(1 + i)) {
                value += model.ma[i] * shock;
            }
        }
        extended.push(value);
        shocks.push(0.0);
        diff_forecasts.push(value);
    }

    // Integrate back to levels, one differencing layer at a time.
    let mut means = diff_forecasts;
    for layer in (0..d).rev() {
        let level = difference(data, layer);
        let mut cumulative = *level.last().unwrap_or(&0.0);
        for m in means.iter_mut() {
            cumulative += *m;
            *m = cumulative;
        }
    }

    // se_h = sigma * sqrt(sum_{j<h} psi_j^2) from the psi-weight expansion of
    // theta(B) / (phi(B) (1-B)^d); the partial sums make widths monotone.
    let psi = psi_weights(&model.ar, &model.ma, d, horizon);
    let sigma = model.sigma2.sqrt();

    let mut cumulative_psi2 = 0.0;
    means
        .iter()
        .zip(&psi)
        .enumerate()
        .map(|(i, (&mean, &psi_j))| {
            cumulative_psi2 += psi_j * psi_j;
            let se = sigma * cumulative_psi2.sqrt();
            ForecastPoint {
                step: i + 1,
                mean,
                lower_80: mean - Z_80 * se,
                upper_80: mean + Z_80 * se,
                lower_95: mean - Z_95 * se,
                upper_95: mean + Z_95 * se,
            }
        })
        .collect()
}

/// psi weights of the ARIMA process: coefficients of theta(B) divided by
/// phi(B)(1-B)^d, computed by the standard recursion on the expanded AR
/// polynomial.
fn psi_weights(ar: &[f64], ma: &[f64], d: usize, horizon: usize) -> Vec<f64> {
    // phi(B)(1-B)^d as polynomial coefficients, constant term first.
    let mut poly = vec![1.0];
    poly.extend(ar.iter().map(|&phi| -phi));
    for _ in 0..d {
        // Multiply by (1 - B).
        let mut next = vec![0.0; poly.len() + 1];
        for (k, &c) in poly.iter().enumerate() {
            next[k] += c;
            next[k + 1] -= c;
        }
        poly = next;
    }

    let mut psi = Vec::with_capacity(horizon);
    for j in 0..horizon {
        let mut value = if j == 0 {
            1.0
        } else if j <= ma.len() {
            ma[j - 1]
        } else {
            0.0
        };
        for k in 1..poly.len().min(j + 1) {
            value += -poly[k] * psi[j - k];
        }
        psi.push(value);
    }
    psi
}

/// Auto-select, fit, and forecast in one step.
pub fn auto_forecast(data: &[f64], horizon: usize) -> Result<Forecast, SmoothcastError> {
    let model = auto_fit(data)?;
    let points = forecast(&model, data, horizon);
    Ok(Forecast {
        order: model.order,
        ar: model.ar,
        ma: model.ma,
        constant: model.constant,
        sigma2: model.sigma2,
        aicc: model.aicc,
        points,
    })
}
