//! Fitting a linear model on a named subset of feature columns.
//!
//! Given:
//! - a training fold materialized as numeric columns (`FeatureFrame`)
//! - the response vector
//! - a feature subset
//!
//! we solve OLS with intercept and return a `FittedModel` that can score new
//! rows by column name.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Dataset, Row};
use crate::error::ModelError;
use crate::math::fit_with_intercept;

/// Numeric, column-major view of a training fold.
#[derive(Debug, Clone, Default)]
pub struct FeatureFrame {
    columns: HashMap<String, Vec<f64>>,
    n_rows: usize,
}

impl FeatureFrame {
    /// Materialize `names` from `dataset` (values coerced to numbers).
    pub fn from_dataset(dataset: &Dataset, names: &[String]) -> Self {
        let columns = names
            .iter()
            .map(|name| (name.clone(), dataset.numbers(name)))
            .collect();
        Self {
            columns,
            n_rows: dataset.len(),
        }
    }

    /// Build from already numeric columns. All columns must have `n_rows` values.
    pub fn from_columns(n_rows: usize, columns: Vec<(String, Vec<f64>)>) -> Result<Self, ModelError> {
        let mut map = HashMap::with_capacity(columns.len());
        for (name, values) in columns {
            if values.len() != n_rows {
                return Err(ModelError::InvalidInput(format!(
                    "Column '{name}' has {} values, expected {n_rows}.",
                    values.len()
                )));
            }
            map.insert(name, values);
        }
        Ok(Self {
            columns: map,
            n_rows,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// True when the column holds more than one distinct value.
    pub fn varies(&self, name: &str) -> bool {
        match self.column(name) {
            Some(values) => values.iter().any(|v| v.to_bits() != values[0].to_bits()),
            None => false,
        }
    }

    pub fn mean(&self, name: &str) -> Option<f64> {
        self.column(name).and_then(crate::math::mean)
    }
}

/// A fitted linear model over named features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    pub features: Vec<String>,
    pub intercept: f64,
    /// One coefficient per entry of `features`, in the same order.
    pub coefficients: Vec<f64>,
    pub aic: f64,
    pub rss: f64,
    pub n_obs: usize,
}

impl FittedModel {
    pub fn coefficient(&self, feature: &str) -> Option<f64> {
        self.features
            .iter()
            .position(|f| f == feature)
            .map(|idx| self.coefficients[idx])
    }

    /// Predict using a column lookup; features the lookup cannot supply are 0.0.
    pub fn predict_with<F>(&self, lookup: F) -> f64
    where
        F: Fn(&str) -> Option<f64>,
    {
        self.features
            .iter()
            .zip(&self.coefficients)
            .fold(self.intercept, |acc, (name, coef)| {
                acc + coef * lookup(name).unwrap_or(0.0)
            })
    }

    pub fn predict_row(&self, row: &Row) -> f64 {
        self.predict_with(|name| row.get(name).map(|v| v.coerce_f64()))
    }
}

/// Fit `y` on the intercept plus `features` taken from `frame`.
pub fn fit_features(frame: &FeatureFrame, y: &[f64], features: &[String]) -> Result<FittedModel, ModelError> {
    if y.len() != frame.n_rows() {
        return Err(ModelError::InvalidInput(format!(
            "Response has {} values but the training fold has {} rows.",
            y.len(),
            frame.n_rows()
        )));
    }

    let mut columns = Vec::with_capacity(features.len());
    for name in features {
        let col = frame
            .column(name)
            .ok_or_else(|| ModelError::MissingColumn(name.clone()))?;
        columns.push(col);
    }

    let solution = fit_with_intercept(y, &columns).ok_or_else(|| ModelError::singular(features))?;
    let aic = solution.aic();

    Ok(FittedModel {
        features: features.to_vec(),
        intercept: solution.beta[0],
        coefficients: solution.beta[1..].to_vec(),
        aic,
        rss: solution.rss,
        n_obs: solution.n_obs,
    })
}
