//! Monthly ingredient usage versus restocking.
//!
//! Usage for a month is the per-item recipe amount times the number of items
//! sold, summed over the month's rows. Gram-measured ingredients are reported
//! in pounds so they line up with shipment quantities.

pub mod bestsellers;
pub mod timeline;

pub use bestsellers::{Bestseller, Bestsellers, DEFAULT_TOP_ITEMS, IngredientFrequency, bestsellers};
pub use timeline::{Timeline, TimelinePoint, timeline};

use log::info;
use serde::{Deserialize, Serialize};

use crate::domain::ingredients::{INGREDIENTS, Ingredient, LB_TO_GRAM, Unit};
use crate::domain::{AnalysisConfig, Dataset, Month, Row};
use crate::error::ModelError;
use crate::io::ingest::Shipment;

/// Restocking stays sane while usage is at least this share of what arrives.
pub const ORDER_LESS_RATIO: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderAction {
    OrderLess,
    OrderMore,
}

impl OrderAction {
    pub fn label(self) -> &'static str {
        match self {
            OrderAction::OrderLess => "order less",
            OrderAction::OrderMore => "order more",
        }
    }

    /// No action without a shipment to adjust.
    fn for_totals(used: f64, shipped: f64) -> Option<OrderAction> {
        if shipped <= 0.0 {
            None
        } else if used < ORDER_LESS_RATIO * shipped {
            Some(OrderAction::OrderLess)
        } else if used > shipped {
            Some(OrderAction::OrderMore)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRow {
    pub column: String,
    pub display_name: String,
    /// "Pounds" or "Pieces".
    pub unit: String,
    pub used: f64,
    pub shipped: f64,
    pub action: Option<OrderAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryReport {
    pub month: Month,
    pub rows_in_month: usize,
    pub rows: Vec<InventoryRow>,
}

impl InventoryReport {
    /// Rows that need a restocking change.
    pub fn flagged(&self) -> impl Iterator<Item = &InventoryRow> {
        self.rows.iter().filter(|r| r.action.is_some())
    }
}

/// Compare `month`'s ingredient usage with monthly shipments.
///
/// Only catalog ingredients present as columns are reported.
pub fn compare_usage(
    dataset: &Dataset,
    shipments: &[Shipment],
    month: Month,
    config: &AnalysisConfig,
) -> Result<InventoryReport, ModelError> {
    dataset.require_column(&config.month_column)?;
    let in_month = dataset.filter(|r| r.text(&config.month_column).and_then(Month::parse) == Some(month));
    if in_month.is_empty() {
        return Err(ModelError::InsufficientData(format!(
            "No usage recorded for {month}."
        )));
    }

    let rows: Vec<InventoryRow> = INGREDIENTS
        .iter()
        .filter(|ing| dataset.has_column(ing.column))
        .map(|ing| {
            let used = usage_total(&in_month, ing, &config.count_column);
            let shipped = shipped_total(shipments, ing);
            InventoryRow {
                column: ing.column.to_string(),
                display_name: ing.display_name.to_string(),
                unit: ing.unit.report_label().to_string(),
                used,
                shipped,
                action: OrderAction::for_totals(used, shipped),
            }
        })
        .collect();

    let report = InventoryReport {
        month,
        rows_in_month: in_month.len(),
        rows,
    };
    info!(
        "Inventory for {month}: {} rows, {} ingredients, {} flagged",
        report.rows_in_month,
        report.rows.len(),
        report.flagged().count()
    );
    Ok(report)
}

fn usage_total(rows: &Dataset, ing: &Ingredient, count_column: &str) -> f64 {
    let total: f64 = rows
        .rows()
        .iter()
        .map(|r| r.number(ing.column) * sold_count(r, count_column))
        .sum();
    match ing.unit {
        Unit::Grams => total / LB_TO_GRAM,
        Unit::Pieces => total,
    }
}

/// Items sold on a row; a missing count means one.
fn sold_count(row: &Row, count_column: &str) -> f64 {
    row.get(count_column).and_then(|v| v.as_f64()).unwrap_or(1.0)
}

fn shipped_total(shipments: &[Shipment], ing: &Ingredient) -> f64 {
    let Some(key) = ing.shipment_key else {
        return 0.0;
    };
    shipments
        .iter()
        .filter(|s| s.ingredient == key)
        .map(Shipment::monthly_total)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Value;

    fn shipment(ingredient: &str, quantity: f64, shipments: f64, frequency: &str) -> Shipment {
        Shipment {
            ingredient: ingredient.to_string(),
            quantity,
            shipments,
            frequency: frequency.to_string(),
        }
    }

    fn dataset() -> Dataset {
        Dataset::from_columns(vec![
            ("month", vec!["May".into(), "May".into(), "June".into()]),
            ("count", vec![10.0.into(), Value::Missing, 7.0.into()]),
            ("riceg", vec![453.592.into(), 907.184.into(), 1000.0.into()]),
            ("eggcount", vec![2.0.into(), 1.0.into(), 1.0.into()]),
            ("carrotg", vec![0.0.into(), 0.0.into(), 0.0.into()]),
        ])
    }

    #[test]
    fn usage_is_scaled_by_count_and_converted_to_pounds() {
        let report = compare_usage(&dataset(), &[], Month::May, &AnalysisConfig::default()).unwrap();
        assert_eq!(report.rows_in_month, 2);
        let rice = report.rows.iter().find(|r| r.column == "riceg").unwrap();
        assert!((rice.used - 12.0).abs() < 1e-9);
        assert_eq!(rice.unit, "Pounds");
        let egg = report.rows.iter().find(|r| r.column == "eggcount").unwrap();
        assert_eq!(egg.used, 21.0);
        assert_eq!(egg.unit, "Pieces");
    }

    #[test]
    fn actions_follow_the_thresholds() {
        let shipments = vec![
            shipment("rice", 10.0, 1.0, "weekly"),
            shipment("egg", 5.0, 1.0, "monthly"),
        ];
        let report = compare_usage(&dataset(), &shipments, Month::May, &AnalysisConfig::default()).unwrap();
        let by = |c: &str| report.rows.iter().find(|r| r.column == c).unwrap().clone();

        // 12 lb used of 40 lb shipped.
        assert_eq!(by("riceg").shipped, 40.0);
        assert_eq!(by("riceg").action, Some(OrderAction::OrderLess));
        // 21 eggs used of 5 shipped.
        assert_eq!(by("eggcount").action, Some(OrderAction::OrderMore));
        // Nothing used, nothing shipped, no key.
        assert_eq!(by("carrotg").action, None);
        assert_eq!(report.flagged().count(), 2);
    }

    #[test]
    fn shared_shipment_key_is_attributed_to_each_column() {
        let ds = Dataset::from_columns(vec![
            ("month", vec!["May".into()]),
            ("braisedchickeng", vec![0.0.into()]),
            ("chickenthighpcs", vec![3.0.into()]),
        ]);
        let shipments = vec![shipment("chicken", 2.0, 1.0, "biweekly")];
        let report = compare_usage(&ds, &shipments, Month::May, &AnalysisConfig::default()).unwrap();
        assert_eq!(report.rows.len(), 2);
        assert!(report.rows.iter().all(|r| r.shipped == 4.0));
    }

    #[test]
    fn used_but_never_shipped_has_no_action() {
        let ds = Dataset::from_columns(vec![
            ("month", vec!["May".into()]),
            ("count", vec![10.0.into()]),
            ("braisedporkg", vec![100.0.into()]),
        ]);
        let report = compare_usage(&ds, &[], Month::May, &AnalysisConfig::default()).unwrap();
        let pork = &report.rows[0];
        assert!((pork.used - 1000.0 / LB_TO_GRAM).abs() < 1e-9);
        assert_eq!(pork.shipped, 0.0);
        assert_eq!(pork.action, None);
        assert_eq!(report.flagged().count(), 0);
    }

    #[test]
    fn month_without_rows_is_insufficient() {
        let err = compare_usage(&dataset(), &[], Month::July, &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, ModelError::InsufficientData(_)));
    }
}
