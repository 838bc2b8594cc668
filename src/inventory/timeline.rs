//! Month-by-month usage of one restocked ingredient against its shipments.

use log::info;
use serde::{Deserialize, Serialize};

use crate::domain::ingredients::{INGREDIENTS, Ingredient};
use crate::domain::{AnalysisConfig, Dataset, Month};
use crate::error::ModelError;
use crate::io::ingest::{Shipment, normalize_header_name};

use super::{shipped_total, usage_total};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub month: Month,
    pub used: f64,
    /// Monthly shipment total; the same for every month.
    pub shipped: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    /// Normalized shipment key, e.g. `chicken`.
    pub ingredient: String,
    /// Usage columns restocked under the key.
    pub columns: Vec<String>,
    /// "Pounds", "Pieces", or "Mixed" when the columns disagree.
    pub unit: String,
    /// One point per month with data, in calendar order.
    pub points: Vec<TimelinePoint>,
}

/// Build the used-vs-shipped series for the shipment ingredient `key`.
///
/// `key` is normalized like a shipment sheet name ("Rice Noodles" and
/// `ricenoodles` are the same). Rows whose month label does not parse are
/// left out.
pub fn timeline(
    dataset: &Dataset,
    shipments: &[Shipment],
    key: &str,
    config: &AnalysisConfig,
) -> Result<Timeline, ModelError> {
    let key = normalize_header_name(key);
    let restocked: Vec<&Ingredient> = INGREDIENTS
        .iter()
        .filter(|ing| ing.shipment_key == Some(key.as_str()))
        .collect();
    if restocked.is_empty() {
        return Err(ModelError::InvalidInput(format!(
            "No usage columns are restocked as '{key}'."
        )));
    }
    dataset.require_column(&config.month_column)?;

    let present: Vec<&Ingredient> = restocked
        .into_iter()
        .filter(|ing| dataset.has_column(ing.column))
        .collect();
    let Some(first) = present.first() else {
        return Err(ModelError::MissingColumn(format!("usage column for '{key}'")));
    };
    let unit = if present.iter().all(|ing| ing.unit == first.unit) {
        first.unit.report_label()
    } else {
        "Mixed"
    };

    // Every column here shares the key, so any one of them gives the total.
    let shipped = shipped_total(shipments, first);

    let points: Vec<TimelinePoint> = Month::ALL
        .into_iter()
        .filter_map(|month| {
            let in_month = dataset.filter(|r| r.text(&config.month_column).and_then(Month::parse) == Some(month));
            if in_month.is_empty() {
                return None;
            }
            let used: f64 = present
                .iter()
                .map(|ing| usage_total(&in_month, ing, &config.count_column))
                .sum();
            Some(TimelinePoint { month, used, shipped })
        })
        .collect();

    if points.is_empty() {
        return Err(ModelError::InsufficientData(
            "No rows carry a recognizable month.".to_string(),
        ));
    }

    info!(
        "Timeline for '{key}': {} months, {} columns, {shipped:.2} shipped per month",
        points.len(),
        present.len()
    );

    Ok(Timeline {
        ingredient: key,
        columns: present.iter().map(|ing| ing.column.to_string()).collect(),
        unit: unit.to_string(),
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ingredients::LB_TO_GRAM;

    fn shipment(ingredient: &str, quantity: f64, frequency: &str) -> Shipment {
        Shipment {
            ingredient: ingredient.to_string(),
            quantity,
            shipments: 1.0,
            frequency: frequency.to_string(),
        }
    }

    fn dataset() -> Dataset {
        Dataset::from_columns(vec![
            (
                "month",
                vec!["July".into(), "May".into(), "May".into(), "Smarch".into(), "June".into()],
            ),
            ("count", vec![2.0.into(), 10.0.into(), 5.0.into(), 100.0.into(), 1.0.into()]),
            (
                "riceg",
                vec![453.592.into(), 453.592.into(), 0.0.into(), 453.592.into(), 907.184.into()],
            ),
            ("braisedchickeng", vec![0.0.into(), 453.592.into(), 0.0.into(), 0.0.into(), 0.0.into()]),
            ("chickenthighpcs", vec![1.0.into(), 0.0.into(), 2.0.into(), 0.0.into(), 0.0.into()]),
        ])
    }

    #[test]
    fn months_are_in_calendar_order_with_constant_shipped() {
        let shipments = vec![shipment("rice", 10.0, "weekly"), shipment("egg", 3.0, "monthly")];
        let line = timeline(&dataset(), &shipments, "Rice", &AnalysisConfig::default()).unwrap();
        assert_eq!(line.ingredient, "rice");
        assert_eq!(line.columns, vec!["riceg"]);
        assert_eq!(line.unit, "Pounds");

        let months: Vec<Month> = line.points.iter().map(|p| p.month).collect();
        assert_eq!(months, vec![Month::May, Month::June, Month::July]);
        let used: Vec<f64> = line.points.iter().map(|p| p.used).collect();
        for (got, want) in used.iter().zip([10.0, 2.0, 2.0]) {
            assert!((got - want).abs() < 1e-9);
        }
        assert!(line.points.iter().all(|p| p.shipped == 40.0));
    }

    #[test]
    fn shared_key_sums_every_restocked_column() {
        let line = timeline(&dataset(), &[], "chicken", &AnalysisConfig::default()).unwrap();
        assert_eq!(line.columns, vec!["braisedchickeng", "chickenthighpcs"]);
        assert_eq!(line.unit, "Mixed");
        let may = line.points.iter().find(|p| p.month == Month::May).unwrap();
        // 1 lb x 10 braised, plus 2 thighs x 5.
        assert!((may.used - (453.592 * 10.0 / LB_TO_GRAM + 10.0)).abs() < 1e-9);
        assert_eq!(may.shipped, 0.0);
    }

    #[test]
    fn unknown_key_is_invalid_input() {
        let err = timeline(&dataset(), &[], "saffron", &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, ModelError::InvalidInput(_)));
    }

    #[test]
    fn restocked_key_without_columns_is_missing() {
        let err = timeline(&dataset(), &[], "egg", &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, ModelError::MissingColumn(_)));
    }
}
