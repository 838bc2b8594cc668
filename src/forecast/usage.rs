//! Next-month ingredient usage forecast.
//!
//! For a target month `M`:
//! - train on every row whose month comes before `M`
//! - test on the rows recorded for `M` (may be empty for a future month)
//! - per usage column, run the stepwise selector over the other numeric
//!   columns, fit, predict and clip to the training range
//!
//! When `M` has no rows the forecast is made for one synthetic row holding the
//! training means of every predictor, and accuracy metrics are not available.

use std::collections::HashMap;

use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::ingredients::display_name;
use crate::domain::{AnalysisConfig, Dataset, Month, Row};
use crate::error::ModelError;
use crate::fit::{FeatureFrame, FittedModel, MetricAccumulator, Metrics, Selection, fit_features, score_pairs, stepwise_select};
use crate::math::{mean, min_max};

/// Forecast for one usage column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetForecast {
    pub target: String,
    pub display_name: String,
    pub selection: Selection,
    /// Final model; `None` when the training mean was used instead.
    pub model: Option<FittedModel>,
    pub train_mean: f64,
    pub train_min: f64,
    pub train_max: f64,
    /// One clipped prediction per test row (or one for the synthetic row).
    pub predictions: Vec<f64>,
    pub predicted_total: f64,
    /// Recorded total for the month; `None` when the month has no rows.
    pub actual_total: Option<f64>,
    pub mse: Option<f64>,
    pub variance: Option<f64>,
}

impl TargetForecast {
    pub fn used_mean_fallback(&self) -> bool {
        self.model.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageForecast {
    pub month: Month,
    pub train_rows: usize,
    pub test_rows: usize,
    pub predictors: Vec<String>,
    pub targets: Vec<TargetForecast>,
    pub metrics: Metrics,
    pub note: String,
}

/// Forecast every configured usage column for `month`.
pub fn forecast_usage(dataset: &Dataset, month: Month, config: &AnalysisConfig) -> Result<UsageForecast, ModelError> {
    dataset.require_column(&config.month_column)?;
    for target in &config.targets {
        dataset.require_column(target)?;
    }

    let month_of = |row: &Row| row.text(&config.month_column).and_then(Month::parse);
    let train = dataset.filter(|r| month_of(r).is_some_and(|m| m.ordinal() < month.ordinal()));
    if train.is_empty() {
        return Err(ModelError::InsufficientData(format!(
            "No historical data available before {month} to build the model."
        )));
    }
    let test = dataset.filter(|r| month_of(r) == Some(month));

    let predictors = predictor_columns(dataset, config);
    if predictors.is_empty() {
        warn!("No numeric predictor columns; every target falls back to its training mean.");
    }
    info!(
        "Forecasting {} targets for {month}: train_rows={} test_rows={} predictors={}",
        config.targets.len(),
        train.len(),
        test.len(),
        predictors.len()
    );

    let frame = FeatureFrame::from_dataset(&train, &predictors);
    let synthetic: HashMap<String, f64> = predictors
        .iter()
        .map(|p| (p.clone(), frame.mean(p).unwrap_or(0.0)))
        .collect();

    let targets: Vec<TargetForecast> = config
        .targets
        .par_iter()
        .map(|target| forecast_target(target, &train, &test, &frame, &predictors, &synthetic, config))
        .collect();

    let (metrics, note) = if test.is_empty() {
        (
            Metrics::unavailable(),
            format!("Prediction successful for {month}; no recorded usage to compare against."),
        )
    } else {
        let mut acc = MetricAccumulator::new();
        for t in &targets {
            if let (Some(mse), Some(variance)) = (t.mse, t.variance) {
                acc.push(mse, variance);
            }
        }
        match acc.finish() {
            Ok(m) => (m, format!("Stepwise prediction for {month} completed successfully.")),
            Err(err) => {
                warn!("{err}");
                (
                    Metrics::unavailable(),
                    "Prediction failed to produce valid metrics for any target.".to_string(),
                )
            }
        }
    };

    Ok(UsageForecast {
        month,
        train_rows: train.len(),
        test_rows: test.len(),
        predictors,
        targets,
        metrics,
        note,
    })
}

/// Numeric columns that are neither targets nor reserved.
pub fn predictor_columns(dataset: &Dataset, config: &AnalysisConfig) -> Vec<String> {
    dataset
        .numeric_columns()
        .into_iter()
        .filter(|c| !config.targets.contains(c) && !config.reserved_columns.contains(c))
        .collect()
}

fn forecast_target(
    target: &str,
    train: &Dataset,
    test: &Dataset,
    frame: &FeatureFrame,
    predictors: &[String],
    synthetic: &HashMap<String, f64>,
    config: &AnalysisConfig,
) -> TargetForecast {
    let y = train.numbers(target);
    // `train` is non-empty, so these are always present.
    let train_mean = mean(&y).unwrap_or(0.0);
    let (train_min, train_max) = min_max(&y).unwrap_or((train_mean, train_mean));

    let selection = stepwise_select(frame, &y, predictors, &config.selector);
    let model = if selection.features.is_empty() {
        None
    } else {
        match fit_features(frame, &y, &selection.features) {
            Ok(m) => Some(m),
            Err(err) => {
                warn!("Final fit for '{target}' failed ({err}); using the training mean.");
                None
            }
        }
    };

    let raw: Vec<f64> = if test.is_empty() {
        let p = match &model {
            Some(m) => m.predict_with(|c| synthetic.get(c).copied()),
            None => train_mean,
        };
        vec![p]
    } else {
        test.rows()
            .iter()
            .map(|row| match &model {
                Some(m) => m.predict_row(row),
                None => train_mean,
            })
            .collect()
    };
    let predictions: Vec<f64> = raw.into_iter().map(|p| p.clamp(train_min, train_max)).collect();
    let predicted_total = predictions.iter().sum();

    let (actual_total, mse, variance) = if test.is_empty() {
        (None, None, None)
    } else {
        let actual = test.numbers(target);
        let scored = score_pairs(&actual, &predictions);
        (
            Some(actual.iter().sum()),
            scored.map(|s| s.0),
            scored.map(|s| s.1),
        )
    };

    TargetForecast {
        target: target.to_string(),
        display_name: display_name(target),
        selection,
        model,
        train_mean,
        train_min,
        train_max,
        predictions,
        predicted_total,
        actual_total,
        mse,
        variance,
    }
}
