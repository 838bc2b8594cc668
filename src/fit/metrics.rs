//! Accuracy metrics for a forecasting run.
//!
//! Each scored unit (a usage target, or the whole LOOCV pass) contributes an
//! MSE and a variance of actuals. The summary reports their means and
//! `explained_variance = 1 - mse / variance`, which is defined as 0 when the
//! variance is 0.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::math::{mean_squared_error, population_variance};

/// Summary metrics; `None` fields mean "not applicable" (printed as N/A).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub mse: Option<f64>,
    pub variance: Option<f64>,
    pub explained_variance: Option<f64>,
    /// Number of scored units that contributed.
    pub scored: usize,
}

impl Metrics {
    pub fn unavailable() -> Self {
        Self {
            mse: None,
            variance: None,
            explained_variance: None,
            scored: 0,
        }
    }

    pub fn from_totals(mse: f64, variance: f64, scored: usize) -> Self {
        Self {
            mse: Some(mse),
            variance: Some(variance),
            explained_variance: Some(explained_variance(mse, variance)),
            scored,
        }
    }

    pub fn is_available(&self) -> bool {
        self.mse.is_some()
    }
}

/// `1 - mse/variance`, or 0 when the variance is zero or not finite.
pub fn explained_variance(mse: f64, variance: f64) -> f64 {
    if variance.is_finite() && variance != 0.0 && mse.is_finite() {
        1.0 - mse / variance
    } else {
        0.0
    }
}

/// `(mse, variance of actuals)` over paired values. Pairs with a non-finite
/// side are dropped; `None` if no pair survives.
pub fn score_pairs(actual: &[f64], predicted: &[f64]) -> Option<(f64, f64)> {
    let (a, p): (Vec<f64>, Vec<f64>) = actual
        .iter()
        .zip(predicted)
        .filter(|(a, p)| a.is_finite() && p.is_finite())
        .map(|(a, p)| (*a, *p))
        .unzip();
    let mse = mean_squared_error(&a, &p)?;
    let variance = population_variance(&a)?;
    Some((mse, variance))
}

/// Running sum of per-unit MSE and variance.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricAccumulator {
    total_mse: f64,
    total_variance: f64,
    count: usize,
}

impl MetricAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mse: f64, variance: f64) {
        self.total_mse += mse;
        self.total_variance += variance;
        self.count += 1;
    }

    /// Mean MSE / mean variance over the pushed units.
    pub fn finish(&self) -> Result<Metrics, ModelError> {
        if self.count == 0 {
            return Err(ModelError::NoValidMetrics);
        }
        let n = self.count as f64;
        Ok(Metrics::from_totals(
            self.total_mse / n,
            self.total_variance / n,
            self.count,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_variance_gives_zero_explained_variance() {
        let m = Metrics::from_totals(4.0, 0.0, 1);
        assert_eq!(m.explained_variance, Some(0.0));
        assert_eq!(explained_variance(f64::NAN, 1.0), 0.0);
    }

    #[test]
    fn accumulator_averages_units() {
        let mut acc = MetricAccumulator::new();
        acc.push(1.0, 4.0);
        acc.push(3.0, 4.0);
        let m = acc.finish().unwrap();
        assert_eq!(m.mse, Some(2.0));
        assert_eq!(m.variance, Some(4.0));
        assert_eq!(m.explained_variance, Some(0.5));
        assert_eq!(m.scored, 2);
    }

    #[test]
    fn empty_accumulator_has_no_valid_metrics() {
        assert_eq!(MetricAccumulator::new().finish(), Err(ModelError::NoValidMetrics));
        assert!(!Metrics::unavailable().is_available());
    }

    #[test]
    fn score_pairs_drops_non_finite() {
        assert_eq!(score_pairs(&[1.0, f64::NAN, 3.0], &[1.0, 2.0, 5.0]), Some((2.0, 1.0)));
        assert_eq!(score_pairs(&[f64::NAN], &[1.0]), None);
    }
}
