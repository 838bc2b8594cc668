//! Top-selling items and the ingredients they draw on.
//!
//! Items are ranked by summed sales `amount` over the selected month (or the
//! whole table). Each ranked item lists the catalog ingredients its recipe
//! uses, and the frequency table counts how many ranked items use each one.

use std::collections::HashMap;

use log::info;
use serde::{Deserialize, Serialize};

use crate::domain::ingredients::INGREDIENTS;
use crate::domain::{AnalysisConfig, Dataset, Month, Row};
use crate::error::ModelError;

/// Default length of the bestseller list.
pub const DEFAULT_TOP_ITEMS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bestseller {
    pub item: String,
    /// Summed sales amount over the selected rows.
    pub amount: f64,
    /// Display names of ingredients with positive usage, in catalog order.
    pub ingredients: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientFrequency {
    pub ingredient: String,
    /// Number of listed items that use the ingredient.
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bestsellers {
    /// `None` means all months.
    pub month: Option<Month>,
    pub items: Vec<Bestseller>,
    pub frequencies: Vec<IngredientFrequency>,
}

impl Bestsellers {
    pub fn scope_label(&self) -> String {
        match self.month {
            Some(m) => m.to_string(),
            None => "All Months".to_string(),
        }
    }
}

struct ItemTotals {
    item: String,
    amount: f64,
    usage: Vec<f64>,
}

/// Rank items by sales amount and list the ingredients of the top `n`.
///
/// Items are grouped by trimmed, case-insensitive name; the first spelling
/// seen is kept. Equal amounts keep first-seen order.
pub fn bestsellers(
    dataset: &Dataset,
    month: Option<Month>,
    n: usize,
    config: &AnalysisConfig,
) -> Result<Bestsellers, ModelError> {
    dataset.require_column(&config.item_column)?;
    dataset.require_column(&config.amount_column)?;
    if month.is_some() {
        dataset.require_column(&config.month_column)?;
    }

    let columns: Vec<_> = INGREDIENTS
        .iter()
        .filter(|ing| dataset.has_column(ing.column))
        .collect();

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut totals: Vec<ItemTotals> = Vec::new();
    let in_scope = |row: &&Row| month.is_none() || row.text(&config.month_column).and_then(Month::parse) == month;
    for row in dataset.rows().iter().filter(in_scope) {
        let Some(name) = row.text(&config.item_column) else {
            continue;
        };
        let slot = *index.entry(name.to_lowercase()).or_insert_with(|| {
            totals.push(ItemTotals {
                item: name.to_string(),
                amount: 0.0,
                usage: vec![0.0; columns.len()],
            });
            totals.len() - 1
        });
        let entry = &mut totals[slot];
        entry.amount += row.number(&config.amount_column);
        for (acc, ing) in entry.usage.iter_mut().zip(&columns) {
            *acc += row.number(ing.column);
        }
    }

    if totals.is_empty() {
        let scope = month.map_or_else(|| "the item table".to_string(), |m| m.to_string());
        return Err(ModelError::InsufficientData(format!(
            "No sales recorded for {scope}."
        )));
    }

    // Stable sort keeps first-seen order on ties.
    totals.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    totals.truncate(n);

    let items: Vec<Bestseller> = totals
        .into_iter()
        .map(|t| Bestseller {
            item: t.item,
            amount: t.amount,
            ingredients: columns
                .iter()
                .zip(&t.usage)
                .filter(|(_, used)| **used > 0.0)
                .map(|(ing, _)| ing.display_name.to_string())
                .collect(),
        })
        .collect();

    let frequencies = ingredient_frequencies(&items);
    info!(
        "Bestsellers ({}): {} items, {} distinct ingredients",
        month.map_or("all months", Month::name),
        items.len(),
        frequencies.len()
    );

    Ok(Bestsellers {
        month,
        items,
        frequencies,
    })
}

/// Count items per ingredient, most used first; ties keep first appearance.
fn ingredient_frequencies(items: &[Bestseller]) -> Vec<IngredientFrequency> {
    let mut frequencies: Vec<IngredientFrequency> = Vec::new();
    for name in items.iter().flat_map(|i| &i.ingredients) {
        match frequencies.iter_mut().find(|f| &f.ingredient == name) {
            Some(f) => f.count += 1,
            None => frequencies.push(IngredientFrequency {
                ingredient: name.clone(),
                count: 1,
            }),
        }
    }
    frequencies.sort_by(|a, b| b.count.cmp(&a.count));
    frequencies
}
