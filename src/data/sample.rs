//! Synthetic merged item table generation.
//!
//! Each generated item has a fixed recipe (per-item ingredient amounts) and a
//! unit cost driven by that recipe. Monthly rows vary the number sold around
//! a per-item demand level with a mild upward season.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::ingredients::{INGREDIENTS, Unit};
use crate::domain::{Dataset, Month, Row, Value};
use crate::error::AppError;

const MENU: [&str; 12] = [
    "Beef Noodle Soup",
    "Braised Chicken Rice",
    "Braised Pork Bun",
    "Egg Fried Rice",
    "Fried Chicken Wings",
    "Spicy Ramen",
    "Rice Noodle Bowl",
    "Scallion Pancake",
    "Pickle Cabbage Plate",
    "Bok Choy Stir Fry",
    "Tapioca Dessert",
    "Chicken Thigh Plate",
];

/// Share of catalog ingredients a recipe draws on.
const RECIPE_DENSITY: f64 = 0.3;

#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub seed: u64,
    pub items: usize,
    pub months: Vec<Month>,
    /// Standard deviation of the unit cost noise.
    pub cost_noise: f64,
    /// Standard deviation of the monthly count noise.
    pub count_noise: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            seed: 7,
            items: MENU.len(),
            months: vec![
                Month::May,
                Month::June,
                Month::July,
                Month::August,
                Month::September,
                Month::October,
            ],
            cost_noise: 0.15,
            count_noise: 6.0,
        }
    }
}

struct ItemPlan {
    name: String,
    recipe: Vec<f64>,
    cost: f64,
    price: f64,
    demand: f64,
}

/// Generate the merged item table: one row per item per month.
pub fn generate_items(config: &SampleConfig) -> Result<Dataset, AppError> {
    if config.items == 0 {
        return Err(AppError::new(2, "Sample item count must be > 0."));
    }
    if config.months.is_empty() {
        return Err(AppError::new(2, "Sample needs at least one month."));
    }
    if !(config.cost_noise.is_finite() && config.cost_noise >= 0.0)
        || !(config.count_noise.is_finite() && config.count_noise >= 0.0)
    {
        return Err(AppError::new(2, "Invalid sample noise settings."));
    }

    let mut rng = StdRng::seed_from_u64(sample_seed(config));
    let cost_noise = Normal::new(0.0, config.cost_noise)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;
    let count_noise = Normal::new(0.0, config.count_noise)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    // Per-unit ingredient prices shared by every item.
    let unit_prices: Vec<f64> = INGREDIENTS
        .iter()
        .map(|ing| match ing.unit {
            Unit::Grams => rng.gen_range(0.004..0.02),
            Unit::Pieces => rng.gen_range(0.15..0.9),
        })
        .collect();

    let plans: Vec<ItemPlan> = (0..config.items)
        .map(|i| {
            let recipe = sample_recipe(&mut rng);
            let base: f64 = recipe.iter().zip(&unit_prices).map(|(a, p)| a * p).sum();
            let cost = (0.5 + base + cost_noise.sample(&mut rng)).max(0.1);
            ItemPlan {
                name: item_name(i),
                recipe,
                cost,
                price: cost * rng.gen_range(2.5..3.5),
                demand: rng.gen_range(20.0..120.0),
            }
        })
        .collect();

    let mut columns: Vec<String> = ["itemname", "month", "monthnumerical", "count", "amount", "cost"]
        .iter()
        .map(|c| c.to_string())
        .collect();
    columns.extend(INGREDIENTS.iter().map(|ing| ing.column.to_string()));

    let mut rows = Vec::with_capacity(plans.len() * config.months.len());
    for (m, month) in config.months.iter().enumerate() {
        let season = 1.0 + 0.05 * m as f64;
        for plan in &plans {
            let count = (plan.demand * season + count_noise.sample(&mut rng)).round().max(0.0);
            let mut row = Row::new()
                .with("itemname", plan.name.as_str())
                .with("month", month.name())
                .with("monthnumerical", f64::from(month.ordinal()))
                .with("count", count)
                .with("amount", round_cents(count * plan.price))
                .with("cost", round_cents(plan.cost));
            for (ing, amount) in INGREDIENTS.iter().zip(&plan.recipe) {
                row.insert(ing.column, *amount);
            }
            rows.push(row);
        }
    }

    Ok(Dataset::new(columns, rows))
}

/// Write a dataset back out as an ingestable CSV.
pub fn write_item_csv(path: &Path, dataset: &Dataset) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(4, format!("Failed to create CSV '{}': {e}", path.display())))?;

    writer
        .write_record(dataset.columns())
        .map_err(|e| AppError::new(4, format!("Failed to write CSV header: {e}")))?;
    for row in dataset.rows() {
        let record: Vec<String> = dataset
            .columns()
            .iter()
            .map(|c| match row.get(c) {
                Some(Value::Number(v)) => v.to_string(),
                Some(Value::Text(s)) => s.clone(),
                Some(Value::Missing) | None => String::new(),
            })
            .collect();
        writer
            .write_record(&record)
            .map_err(|e| AppError::new(4, format!("Failed to write CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush CSV: {e}")))?;
    Ok(())
}

/// Recipe amounts per catalog ingredient; never empty.
fn sample_recipe(rng: &mut StdRng) -> Vec<f64> {
    let mut recipe: Vec<f64> = INGREDIENTS
        .iter()
        .map(|ing| {
            if rng.r#gen::<f64>() >= RECIPE_DENSITY {
                return 0.0;
            }
            match ing.unit {
                Unit::Grams => rng.gen_range(20.0_f64..200.0).round(),
                Unit::Pieces => f64::from(rng.gen_range(1u32..=4)),
            }
        })
        .collect();
    if recipe.iter().all(|a| *a == 0.0) {
        let pick = rng.gen_range(0..recipe.len());
        recipe[pick] = 1.0;
    }
    recipe
}

fn item_name(i: usize) -> String {
    let base = MENU[i % MENU.len()];
    match i / MENU.len() {
        0 => base.to_string(),
        round => format!("{base} {}", round + 1),
    }
}

fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn sample_seed(config: &SampleConfig) -> u64 {
    let mut hasher = DefaultHasher::new();
    config.seed.hash(&mut hasher);
    config.items.hash(&mut hasher);
    config.months.hash(&mut hasher);
    config.cost_noise.to_bits().hash(&mut hasher);
    config.count_noise.to_bits().hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use crate::domain::AnalysisConfig;
    use crate::forecast::{forecast_usage, predict_costs};
    use crate::io::ingest::load_item_table;

    #[test]
    fn same_seed_same_table() {
        let a = generate_items(&SampleConfig::default()).unwrap();
        let b = generate_items(&SampleConfig::default()).unwrap();
        assert_eq!(a.columns(), b.columns());
        assert_eq!(a.rows(), b.rows());

        let other = generate_items(&SampleConfig {
            seed: 8,
            ..SampleConfig::default()
        })
        .unwrap();
        assert_ne!(a.rows(), other.rows());
    }

    #[test]
    fn one_row_per_item_and_month() {
        let config = SampleConfig::default();
        let ds = generate_items(&config).unwrap();
        assert_eq!(ds.len(), config.items * config.months.len());
        let months: BTreeSet<u64> = ds.numbers("monthnumerical").iter().map(|m| m.to_bits()).collect();
        assert_eq!(months.len(), 6);
        assert_eq!(ds.columns().len(), 6 + INGREDIENTS.len());
        for row in ds.rows() {
            assert!(row.number("cost") > 0.0);
            assert!(row.number("count") >= 0.0);
        }
    }

    #[test]
    fn zero_items_is_rejected() {
        let err = generate_items(&SampleConfig {
            items: 0,
            ..SampleConfig::default()
        })
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn item_names_stay_unique_past_the_menu() {
        assert_eq!(item_name(0), "Beef Noodle Soup");
        assert_eq!(item_name(12), "Beef Noodle Soup 2");
    }

    #[test]
    fn written_table_loads_back() {
        let ds = generate_items(&SampleConfig::default()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("item.csv");
        write_item_csv(&path, &ds).unwrap();

        let table = load_item_table(&path).unwrap();
        assert_eq!(table.dataset.columns(), ds.columns());
        assert_eq!(table.dataset.len(), ds.len());
        assert!(table.row_errors.is_empty());
        assert!(!table.cost_derived);
    }

    #[test]
    fn generated_table_runs_end_to_end() {
        let ds = generate_items(&SampleConfig::default()).unwrap();
        let config = AnalysisConfig::default();

        let forecast = forecast_usage(&ds, Month::October, &config).unwrap();
        assert_eq!(forecast.test_rows, 12);
        assert!(forecast.metrics.is_available());

        let costs = predict_costs(&ds, &config).unwrap();
        assert_eq!(costs.items.len(), 12);
        assert!(costs.metrics.mse.unwrap().is_finite());
        let again = predict_costs(&ds, &config).unwrap();
        assert_eq!(costs, again);
    }
}
