//! Per-item cost prediction with leave-one-item-out cross-validation.
//!
//! Rows are first collapsed to one profile per food item (mean cost, mean
//! usage of every ingredient). Each item is then predicted by a model that was
//! selected and fitted on all the other items only. Coefficients from every
//! fold are averaged into an ingredient importance table.

use std::collections::HashMap;

use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::ingredients::display_name;
use crate::domain::{AnalysisConfig, Dataset};
use crate::error::ModelError;
use crate::fit::{FeatureFrame, FittedModel, Metrics, Selection, fit_features, stepwise_select};
use crate::math::{mean, population_variance};

/// One food item after aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemProfile {
    pub item: String,
    /// Number of source rows averaged into this profile.
    pub rows: usize,
    pub cost: f64,
    /// Mean usage per ingredient, aligned with the configured targets.
    pub usage: Vec<f64>,
}

impl ItemProfile {
    pub fn total_usage(&self) -> f64 {
        self.usage.iter().sum()
    }
}

/// Held-out result for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemCost {
    pub item: String,
    pub actual: f64,
    pub predicted: f64,
    pub squared_error: f64,
    pub selection: Selection,
    pub model: Option<FittedModel>,
}

/// Average coefficient of one ingredient across folds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoefficientRow {
    pub column: String,
    pub display_name: String,
    pub mean_coefficient: f64,
    /// Number of folds in which the ingredient was selected.
    pub selected_in: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostPrediction {
    pub items: Vec<ItemCost>,
    /// Items dropped for having no ingredient usage or a non-positive cost.
    pub excluded_items: usize,
    pub metrics: Metrics,
    /// Sorted by `mean_coefficient`, largest first.
    pub coefficients: Vec<CoefficientRow>,
}

impl CostPrediction {
    /// Items ordered by squared error, worst first.
    pub fn ranked_by_error(&self) -> Vec<&ItemCost> {
        let mut ranked: Vec<&ItemCost> = self.items.iter().collect();
        ranked.sort_by(|a, b| {
            b.squared_error
                .partial_cmp(&a.squared_error)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }
}

/// Collapse rows into one profile per item and drop items without signal.
///
/// Returns the kept profiles (first-seen order) and the number excluded.
pub fn aggregate_items(dataset: &Dataset, config: &AnalysisConfig) -> (Vec<ItemProfile>, usize) {
    let n_ing = config.targets.len();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut sums: Vec<(String, usize, f64, Vec<f64>)> = Vec::new();

    for row in dataset.rows() {
        let Some(name) = row.text(&config.item_column) else {
            continue;
        };
        let key = name.to_lowercase();
        let slot = *index.entry(key).or_insert_with(|| {
            sums.push((name.to_string(), 0, 0.0, vec![0.0; n_ing]));
            sums.len() - 1
        });
        let entry = &mut sums[slot];
        entry.1 += 1;
        entry.2 += row.number(&config.cost_column);
        for (acc, column) in entry.3.iter_mut().zip(&config.targets) {
            *acc += row.number(column);
        }
    }

    let total = sums.len();
    let kept: Vec<ItemProfile> = sums
        .into_iter()
        .map(|(item, rows, cost, usage)| {
            let n = rows as f64;
            ItemProfile {
                item,
                rows,
                cost: cost / n,
                usage: usage.into_iter().map(|u| u / n).collect(),
            }
        })
        .filter(|p| p.total_usage() > 0.0 && p.cost > 0.0)
        .collect();
    let excluded = total - kept.len();
    (kept, excluded)
}

/// Leave-one-item-out cost prediction.
pub fn predict_costs(dataset: &Dataset, config: &AnalysisConfig) -> Result<CostPrediction, ModelError> {
    dataset.require_column(&config.item_column)?;
    dataset.require_column(&config.cost_column)?;
    for column in &config.targets {
        dataset.require_column(column)?;
    }

    let (profiles, excluded_items) = aggregate_items(dataset, config);
    if excluded_items > 0 {
        warn!("Excluded {excluded_items} items with no ingredient usage or non-positive cost.");
    }
    if profiles.len() < 2 {
        return Err(ModelError::InsufficientData(format!(
            "Cost prediction needs at least two items with ingredient usage and a positive cost; found {}.",
            profiles.len()
        )));
    }
    info!(
        "Cost LOOCV over {} items with {} candidate ingredients",
        profiles.len(),
        config.targets.len()
    );

    let folds: Vec<(ItemCost, Vec<f64>)> = (0..profiles.len())
        .into_par_iter()
        .map(|held_out| predict_held_out(&profiles, held_out, config))
        .collect::<Result<_, _>>()?;

    let actual: Vec<f64> = profiles.iter().map(|p| p.cost).collect();
    let squared: Vec<f64> = folds.iter().map(|(item, _)| item.squared_error).collect();
    let mse = mean(&squared).unwrap_or(0.0);
    let variance = population_variance(&actual).unwrap_or(0.0);
    let metrics = Metrics::from_totals(mse, variance, folds.len());

    let coefficients = coefficient_table(&config.targets, &folds);
    let items = folds.into_iter().map(|(item, _)| item).collect();

    Ok(CostPrediction {
        items,
        excluded_items,
        metrics,
        coefficients,
    })
}

/// Fit on every profile except `held_out` and predict it.
///
/// Returns the fold result and the coefficient of every candidate (0.0 when
/// not selected).
fn predict_held_out(
    profiles: &[ItemProfile],
    held_out: usize,
    config: &AnalysisConfig,
) -> Result<(ItemCost, Vec<f64>), ModelError> {
    let train: Vec<&ItemProfile> = profiles
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != held_out)
        .map(|(_, p)| p)
        .collect();
    let test = &profiles[held_out];

    let columns = config
        .targets
        .iter()
        .enumerate()
        .map(|(j, name)| (name.clone(), train.iter().map(|p| p.usage[j]).collect()))
        .collect();
    let frame = FeatureFrame::from_columns(train.len(), columns)?;
    let y: Vec<f64> = train.iter().map(|p| p.cost).collect();
    let train_mean = mean(&y).unwrap_or(0.0);

    let selection = stepwise_select(&frame, &y, &config.targets, &config.selector);
    let model = if selection.features.is_empty() {
        None
    } else {
        match fit_features(&frame, &y, &selection.features) {
            Ok(m) => Some(m),
            Err(err) => {
                warn!("Final fit for '{}' failed ({err}); using the training mean.", test.item);
                None
            }
        }
    };

    let lookup: HashMap<&str, f64> = config
        .targets
        .iter()
        .map(String::as_str)
        .zip(test.usage.iter().copied())
        .collect();
    let predicted = match &model {
        Some(m) => m.predict_with(|c| lookup.get(c).copied()),
        None => train_mean,
    };
    let coefficients = config
        .targets
        .iter()
        .map(|c| model.as_ref().and_then(|m| m.coefficient(c)).unwrap_or(0.0))
        .collect();

    let error = test.cost - predicted;
    Ok((
        ItemCost {
            item: test.item.clone(),
            actual: test.cost,
            predicted,
            squared_error: error * error,
            selection,
            model,
        },
        coefficients,
    ))
}

fn coefficient_table(candidates: &[String], folds: &[(ItemCost, Vec<f64>)]) -> Vec<CoefficientRow> {
    let n = folds.len().max(1) as f64;
    let mut rows: Vec<CoefficientRow> = candidates
        .iter()
        .enumerate()
        .map(|(j, column)| CoefficientRow {
            column: column.clone(),
            display_name: display_name(column),
            mean_coefficient: folds.iter().map(|(_, c)| c[j]).sum::<f64>() / n,
            selected_in: folds
                .iter()
                .filter(|(item, _)| item.selection.features.contains(column))
                .count(),
        })
        .collect();
    rows.sort_by(|a, b| {
        b.mean_coefficient
            .partial_cmp(&a.mean_coefficient)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Value;

    fn config(targets: &[&str]) -> AnalysisConfig {
        AnalysisConfig {
            targets: targets.iter().map(|s| s.to_string()).collect(),
            ..AnalysisConfig::default()
        }
    }

    fn items(names: &[&str], costs: &[f64], beef: &[f64], flour: &[f64]) -> Dataset {
        Dataset::from_columns(vec![
            ("itemname", names.iter().map(|n| Value::from(*n)).collect()),
            ("cost", costs.iter().map(|c| Value::from(*c)).collect()),
            ("braisedbeefusedg", beef.iter().map(|v| Value::from(*v)).collect()),
            ("flourg", flour.iter().map(|v| Value::from(*v)).collect()),
        ])
    }

    fn perfect() -> Dataset {
        items(
            &["Beef Noodle", "Beef Bowl", "Beef Bun", "Beef Roll"],
            &[10.0, 12.0, 11.0, 9.0],
            &[5.0, 6.0, 5.5, 4.5],
            &[1.0, 1.0, 1.0, 1.0],
        )
    }

    #[test]
    fn perfectly_correlated_ingredient_is_always_selected() {
        let out = predict_costs(&perfect(), &config(&["braisedbeefusedg", "flourg"])).unwrap();
        assert_eq!(out.items.len(), 4);
        for item in &out.items {
            assert_eq!(item.selection.features, vec!["braisedbeefusedg".to_string()]);
            assert!((item.predicted - item.actual).abs() < 1e-6);
        }
        assert!(out.metrics.mse.unwrap() < 1e-9);
        assert!((out.metrics.variance.unwrap() - 1.25).abs() < 1e-12);
        assert!(out.metrics.explained_variance.unwrap() > 0.999);
    }

    #[test]
    fn coefficient_table_is_ranked_and_zero_filled() {
        let out = predict_costs(&perfect(), &config(&["flourg", "braisedbeefusedg"])).unwrap();
        assert_eq!(out.coefficients[0].column, "braisedbeefusedg");
        assert_eq!(out.coefficients[0].display_name, "Braised Beef");
        assert!((out.coefficients[0].mean_coefficient - 2.0).abs() < 1e-6);
        assert_eq!(out.coefficients[0].selected_in, 4);
        assert_eq!(out.coefficients[1].mean_coefficient, 0.0);
        assert_eq!(out.coefficients[1].selected_in, 0);
    }

    #[test]
    fn rows_are_averaged_per_item() {
        let ds = items(
            &["Bowl", " bowl ", "Bun"],
            &[10.0, 12.0, 4.0],
            &[2.0, 4.0, 1.0],
            &[0.0, 0.0, 0.0],
        );
        let (profiles, excluded) = aggregate_items(&ds, &config(&["braisedbeefusedg", "flourg"]));
        assert_eq!(excluded, 0);
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].item, "Bowl");
        assert_eq!(profiles[0].rows, 2);
        assert_eq!(profiles[0].cost, 11.0);
        assert_eq!(profiles[0].usage, vec![3.0, 0.0]);
    }

    #[test]
    fn items_without_usage_or_cost_are_excluded() {
        let ds = items(
            &["Soda", "Free Water", "Bowl", "Bun", "Roll"],
            &[2.0, 0.0, 10.0, 4.0, 7.0],
            &[0.0, 3.0, 2.0, 1.0, 1.5],
            &[0.0, 0.0, 0.0, 0.0, 0.0],
        );
        let out = predict_costs(&ds, &config(&["braisedbeefusedg", "flourg"])).unwrap();
        assert_eq!(out.excluded_items, 2);
        let names: Vec<&str> = out.items.iter().map(|i| i.item.as_str()).collect();
        assert_eq!(names, vec!["Bowl", "Bun", "Roll"]);
    }

    #[test]
    fn held_out_prediction_ignores_its_own_cost() {
        let cfg = config(&["braisedbeefusedg", "flourg"]);
        let base = items(
            &["A", "B", "C", "D", "E"],
            &[10.0, 12.5, 11.0, 9.0, 14.0],
            &[5.0, 6.0, 5.5, 4.5, 7.5],
            &[1.0, 2.0, 1.5, 1.0, 3.0],
        );
        let bumped = items(
            &["A", "B", "C", "D", "E"],
            &[30.0, 12.5, 11.0, 9.0, 14.0],
            &[5.0, 6.0, 5.5, 4.5, 7.5],
            &[1.0, 2.0, 1.5, 1.0, 3.0],
        );
        let a = predict_costs(&base, &cfg).unwrap();
        let b = predict_costs(&bumped, &cfg).unwrap();
        assert_eq!(a.items[0].predicted, b.items[0].predicted);
        assert_ne!(a.items[0].actual, b.items[0].actual);
    }

    #[test]
    fn adding_an_item_on_the_line_keeps_other_predictions() {
        let cfg = config(&["braisedbeefusedg"]);
        let four = predict_costs(&perfect(), &cfg).unwrap();
        let five = items(
            &["Beef Noodle", "Beef Bowl", "Beef Bun", "Beef Roll", "Beef Plate"],
            &[10.0, 12.0, 11.0, 9.0, 16.0],
            &[5.0, 6.0, 5.5, 4.5, 8.0],
            &[1.0, 1.0, 1.0, 1.0, 1.0],
        );
        let five = predict_costs(&five, &cfg).unwrap();
        for (x, y) in four.items.iter().zip(&five.items) {
            assert_eq!(x.item, y.item);
            assert!((x.predicted - y.predicted).abs() < 1e-6);
        }
    }

    #[test]
    fn ranked_by_error_puts_worst_first() {
        let cfg = config(&["braisedbeefusedg", "flourg"]);
        let ds = items(
            &["A", "B", "C", "D", "E"],
            &[10.0, 12.5, 11.0, 9.0, 20.0],
            &[5.0, 6.0, 5.5, 4.5, 7.5],
            &[1.0, 2.0, 1.5, 1.0, 3.0],
        );
        let out = predict_costs(&ds, &cfg).unwrap();
        let ranked = out.ranked_by_error();
        for pair in ranked.windows(2) {
            assert!(pair[0].squared_error >= pair[1].squared_error);
        }
    }

    #[test]
    fn single_item_is_insufficient() {
        let ds = items(&["Bowl"], &[10.0], &[2.0], &[1.0]);
        let err = predict_costs(&ds, &config(&["braisedbeefusedg", "flourg"])).unwrap_err();
        assert!(matches!(err, ModelError::InsufficientData(_)));
    }

    #[test]
    fn missing_cost_column_is_reported() {
        let ds = Dataset::from_columns(vec![
            ("itemname", vec!["A".into()]),
            ("braisedbeefusedg", vec![1.0.into()]),
        ]);
        let err = predict_costs(&ds, &config(&["braisedbeefusedg"])).unwrap_err();
        assert_eq!(err, ModelError::MissingColumn("cost".to_string()));
    }
}
