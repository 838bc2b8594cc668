//! The observation table the models consume.
//!
//! A `Dataset` is an ordered list of rows keyed by normalized column name.
//! Values keep whatever type the ingest layer found; the numeric views used by
//! the regression code coerce `Missing`, non-numeric text and non-finite
//! numbers to `0.0`.

use std::collections::HashMap;

use crate::error::ModelError;

/// A single cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Missing,
}

impl Value {
    /// Parse a raw CSV cell.
    ///
    /// Empty cells are `Missing`. Currency formatting (`$1,234.50`) is accepted
    /// as a number.
    pub fn parse(raw: &str) -> Value {
        let s = raw.trim();
        if s.is_empty() {
            return Value::Missing;
        }
        if let Ok(v) = s.parse::<f64>() {
            return Value::Number(v);
        }
        let cleaned: String = s
            .chars()
            .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
            .collect();
        if !cleaned.is_empty() && cleaned.len() < s.len() {
            if let Ok(v) = cleaned.parse::<f64>() {
                return Value::Number(v);
            }
        }
        Value::Text(s.to_string())
    }

    /// Numeric view of the cell, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) if v.is_finite() => Some(*v),
            Value::Number(_) | Value::Missing => None,
            Value::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }

    /// Numeric view with missing/non-numeric values treated as zero.
    pub fn coerce_f64(&self) -> f64 {
        self.as_f64().unwrap_or(0.0)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

/// One observation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: HashMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    /// Numeric value of `column`; absent, missing or non-numeric cells are `0.0`.
    pub fn number(&self, column: &str) -> f64 {
        self.values.get(column).map(Value::coerce_f64).unwrap_or(0.0)
    }

    /// Trimmed, non-empty text value of `column`.
    pub fn text(&self, column: &str) -> Option<&str> {
        self.values
            .get(column)
            .and_then(Value::as_text)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Ordered collection of rows plus the column order they were loaded with.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// Build a dataset from column-major data. Short columns are padded with
    /// `Missing`.
    pub fn from_columns(columns: Vec<(&str, Vec<Value>)>) -> Self {
        let n = columns.iter().map(|(_, v)| v.len()).max().unwrap_or(0);
        let names: Vec<String> = columns.iter().map(|(name, _)| name.to_string()).collect();
        let mut rows = vec![Row::new(); n];
        for (name, values) in columns {
            for (i, row) in rows.iter_mut().enumerate() {
                let value = values.get(i).cloned().unwrap_or(Value::Missing);
                row.insert(name, value);
            }
        }
        Self::new(names, rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn require_column(&self, name: &str) -> Result<(), ModelError> {
        if self.has_column(name) {
            Ok(())
        } else {
            Err(ModelError::MissingColumn(name.to_string()))
        }
    }

    /// A column is numeric when no row holds non-numeric text in it and at
    /// least one row holds a number.
    pub fn is_numeric_column(&self, name: &str) -> bool {
        let mut seen_number = false;
        for row in &self.rows {
            match row.get(name) {
                Some(Value::Number(_)) => seen_number = true,
                Some(Value::Text(s)) => {
                    if s.trim().parse::<f64>().is_err() {
                        return false;
                    }
                    seen_number = true;
                }
                Some(Value::Missing) | None => {}
            }
        }
        seen_number
    }

    /// Numeric columns in load order.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| self.is_numeric_column(c))
            .cloned()
            .collect()
    }

    /// Copy of the rows for which `keep` returns true.
    pub fn filter<F>(&self, keep: F) -> Dataset
    where
        F: Fn(&Row) -> bool,
    {
        let rows = self.rows.iter().filter(|r| keep(r)).cloned().collect();
        Dataset::new(self.columns.clone(), rows)
    }

    /// Coerced numeric values of `column`, one per row.
    pub fn numbers(&self, column: &str) -> Vec<f64> {
        self.rows.iter().map(|r| r.number(column)).collect()
    }
}
