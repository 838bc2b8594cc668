//! Ordinary least squares with an intercept.
//!
//! The stepwise search solves many small regression problems of the form:
//!
//! ```text
//! minimize Σ (y_i - β0 - x_i^T β)^2
//! ```
//!
//! Implementation choices:
//! - SVD solve, which handles tall design matrices without forming `XᵀX`.
//! - Rank deficiency is an error, not a pseudo-inverse answer: a candidate
//!   column that is constant or collinear with the current set must be
//!   rejected by the caller.
//! - AIC uses the full Gaussian log-likelihood (the statsmodels convention):
//!   `AIC = n·ln(2π) + n·ln(RSS/n) + n + 2p` with `p` estimated parameters.
//! - `RSS/n` is floored relative to the response variance, so a perfect fit
//!   scores the same whether `y` is in grams or tonnes.

use std::f64::consts::PI;

use nalgebra::{DMatrix, DVector};

use super::stats::population_variance;

/// Floor on `RSS/n` as a share of the population variance of `y`.
const RSS_PER_OBS_REL_FLOOR: f64 = 1e-12;

/// Least squares solution for a design with intercept.
#[derive(Debug, Clone)]
pub struct OlsSolution {
    /// Intercept first, then one coefficient per feature column.
    pub beta: Vec<f64>,
    pub rss: f64,
    pub n_obs: usize,
    /// Population variance of the response; scales the AIC floor.
    pub y_variance: f64,
}

impl OlsSolution {
    /// Number of estimated parameters, intercept included.
    pub fn n_params(&self) -> usize {
        self.beta.len()
    }

    pub fn aic(&self) -> f64 {
        aic(self.n_obs, self.rss, self.n_params(), self.y_variance)
    }
}

/// Akaike Information Criterion of a Gaussian linear model.
///
/// `y_variance` sets the scale below which `RSS/n` counts as an exact fit.
/// A constant response (zero or non-finite variance) uses a scale of 1.
pub fn aic(n: usize, rss: f64, n_params: usize, y_variance: f64) -> f64 {
    let n_f = n as f64;
    let scale = if y_variance.is_finite() && y_variance > 0.0 { y_variance } else { 1.0 };
    let rss_per = (rss / n_f).max(RSS_PER_OBS_REL_FLOOR * scale);
    n_f * (2.0 * PI).ln() + n_f * rss_per.ln() + n_f + 2.0 * n_params as f64
}

/// Fit `y` on an intercept plus the given feature columns.
///
/// Returns `None` when the problem has no rows, contains non-finite inputs,
/// or the design matrix is rank deficient.
pub fn fit_with_intercept(y: &[f64], columns: &[&[f64]]) -> Option<OlsSolution> {
    let n = y.len();
    if n == 0 || columns.iter().any(|c| c.len() != n) {
        return None;
    }
    if y.iter().any(|v| !v.is_finite()) || columns.iter().any(|c| c.iter().any(|v| !v.is_finite())) {
        return None;
    }

    let p = columns.len() + 1;
    let x = DMatrix::from_fn(n, p, |i, j| if j == 0 { 1.0 } else { columns[j - 1][i] });
    let yv = DVector::from_column_slice(y);

    let beta = solve_least_squares(&x, &yv)?;
    let fitted_v = &x * &beta;
    let rss = (&yv - &fitted_v).norm_squared();
    if !rss.is_finite() {
        return None;
    }

    Some(OlsSolution {
        beta: beta.iter().copied().collect(),
        rss,
        n_obs: n,
        y_variance: population_variance(y).unwrap_or(0.0),
    })
}

/// Solve a full-rank least squares problem using SVD.
///
/// Returns `None` if the numeric rank of `x` is below its column count.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let (n, p) = x.shape();
    if n == 0 || p == 0 {
        return None;
    }

    let svd = x.clone().svd(true, true);
    let sv_max = svd.singular_values.max();
    if !(sv_max.is_finite() && sv_max > 0.0) {
        return None;
    }

    // Same default tolerance as numpy's matrix_rank.
    let tol = sv_max * (n.max(p) as f64) * f64::EPSILON;
    let rank = svd.singular_values.iter().filter(|&&s| s > tol).count();
    if rank < p {
        return None;
    }

    let beta = svd.solve(y, tol).ok()?;
    if beta.iter().all(|v| v.is_finite()) {
        Some(beta)
    } else {
        None
    }
}
