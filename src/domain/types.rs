//! Shared domain types.
//!
//! This module defines:
//!
//! - calendar months as they appear in the sales exports (`Month`)
//! - selector knobs (`SelectorOptions`)
//! - the column layout an analysis run expects (`AnalysisConfig`)

use serde::{Deserialize, Serialize};

use crate::domain::ingredients::INGREDIENTS;
use crate::error::ModelError;

/// Calendar month of a sales export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// Parse a month label. Accepts full names, three-letter abbreviations
    /// and `sept`, case-insensitively.
    pub fn parse(label: &str) -> Option<Month> {
        let key = label.trim().to_ascii_lowercase();
        if key.is_empty() {
            return None;
        }
        if key == "sept" {
            return Some(Month::September);
        }
        Month::ALL.into_iter().find(|m| {
            let name = m.name().to_ascii_lowercase();
            key == name || (key.len() == 3 && name.starts_with(&key))
        })
    }

    /// Like `parse`, but with an error suitable for the caller.
    pub fn from_label(label: &str) -> Result<Month, ModelError> {
        Month::parse(label)
            .ok_or_else(|| ModelError::InvalidInput(format!("Invalid month selected: {label}")))
    }

    /// 1-based calendar ordinal (May = 5).
    pub fn ordinal(self) -> u32 {
        self as u32 + 1
    }

    /// Canonical label as used in the exports ("August").
    pub fn name(self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }
}

impl std::fmt::Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Default cap on accepted selector moves.
pub const DEFAULT_MAX_STEPS: usize = 256;

/// Knobs for the stepwise search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorOptions {
    /// Upper bound on accepted add/remove moves.
    pub max_steps: usize,
}

impl Default for SelectorOptions {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

/// Column layout and model settings for one analysis run.
///
/// Column names are the normalized header names produced by ingest
/// (lowercase letters only).
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub month_column: String,
    pub item_column: String,
    pub cost_column: String,
    pub count_column: String,
    /// Sales total per row, used to rank bestsellers.
    pub amount_column: String,
    /// Usage columns modeled by the forecaster and used as cost features.
    pub targets: Vec<String>,
    /// Numeric columns that must never be used as predictors.
    pub reserved_columns: Vec<String>,
    pub selector: SelectorOptions,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            month_column: "month".to_string(),
            item_column: "itemname".to_string(),
            cost_column: "cost".to_string(),
            count_column: "count".to_string(),
            amount_column: "amount".to_string(),
            targets: INGREDIENTS.iter().map(|i| i.column.to_string()).collect(),
            reserved_columns: vec!["monthnumerical".to_string(), "monthnum".to_string()],
            selector: SelectorOptions::default(),
        }
    }
}
