//! Ingredient catalog.
//!
//! The merged item table carries one usage column per tracked ingredient
//! (amount used per sold item). Column names are the normalized headers of
//! the ingredient sheet; the unit suffix in the name (`g`, `count`, `pcs`) is
//! part of the column identity.

use serde::{Deserialize, Serialize};

/// Grams per pound, for reporting gram-measured ingredients in pounds.
pub const LB_TO_GRAM: f64 = 453.592;

/// How an ingredient is measured in the item table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Grams,
    Pieces,
}

impl Unit {
    /// Label used for reported totals (grams are reported in pounds).
    pub fn report_label(self) -> &'static str {
        match self {
            Unit::Grams => "Pounds",
            Unit::Pieces => "Pieces",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ingredient {
    pub column: &'static str,
    pub display_name: &'static str,
    pub unit: Unit,
    /// Normalized ingredient name in the shipment sheet, if it is restocked.
    pub shipment_key: Option<&'static str>,
}

pub const INGREDIENTS: [Ingredient; 18] = [
    Ingredient { column: "braisedbeefusedg", display_name: "Braised Beef", unit: Unit::Grams, shipment_key: Some("beef") },
    Ingredient { column: "braisedchickeng", display_name: "Braised Chicken", unit: Unit::Grams, shipment_key: Some("chicken") },
    Ingredient { column: "braisedporkg", display_name: "Braised Pork", unit: Unit::Grams, shipment_key: None },
    Ingredient { column: "eggcount", display_name: "Egg", unit: Unit::Pieces, shipment_key: Some("egg") },
    Ingredient { column: "riceg", display_name: "Rice", unit: Unit::Grams, shipment_key: Some("rice") },
    Ingredient { column: "ramencount", display_name: "Ramen", unit: Unit::Pieces, shipment_key: Some("ramen") },
    Ingredient { column: "ricenoodlesg", display_name: "Rice Noodles", unit: Unit::Grams, shipment_key: Some("ricenoodles") },
    Ingredient { column: "chickenthighpcs", display_name: "Chicken Thigh", unit: Unit::Pieces, shipment_key: Some("chicken") },
    Ingredient { column: "chickenwingspcs", display_name: "Chicken Wings", unit: Unit::Pieces, shipment_key: Some("chickenwings") },
    Ingredient { column: "flourg", display_name: "Flour", unit: Unit::Grams, shipment_key: Some("flour") },
    Ingredient { column: "picklecabbage", display_name: "Pickle Cabbage", unit: Unit::Pieces, shipment_key: None },
    Ingredient { column: "greenonion", display_name: "Green Onion", unit: Unit::Grams, shipment_key: Some("greenonion") },
    Ingredient { column: "cilantro", display_name: "Cilantro", unit: Unit::Grams, shipment_key: Some("cilantro") },
    Ingredient { column: "whiteonion", display_name: "White Onion", unit: Unit::Pieces, shipment_key: Some("whiteonion") },
    Ingredient { column: "peasg", display_name: "Peas", unit: Unit::Grams, shipment_key: Some("peascarrot") },
    Ingredient { column: "carrotg", display_name: "Carrot", unit: Unit::Grams, shipment_key: None },
    Ingredient { column: "bokchoyg", display_name: "Bok Choy", unit: Unit::Grams, shipment_key: Some("bokchoy") },
    Ingredient { column: "tapiocastarch", display_name: "Tapioca Starch", unit: Unit::Pieces, shipment_key: Some("tapiocastarch") },
];

/// Catalog entry for a usage column.
pub fn lookup(column: &str) -> Option<&'static Ingredient> {
    INGREDIENTS.iter().find(|i| i.column == column)
}

/// Human-readable name for a column; unknown columns are returned as-is.
pub fn display_name(column: &str) -> String {
    lookup(column)
        .map(|i| i.display_name.to_string())
        .unwrap_or_else(|| column.to_string())
}
