//! CSV ingest and normalization.
//!
//! Turns the merged item sheet and the shipment sheet into typed tables:
//! - headers are normalized to lowercase letters only, so
//!   "Braised Beef Used (g)" becomes `braisedbeefusedg`
//! - cells keep their type (`Number`, `Text`, `Missing`) for the models to
//!   coerce as they need
//! - bad rows are skipped and reported, never fatal on their own
//!
//! No fitting logic here.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::domain::{Dataset, Row, Value};
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output for the item table.
#[derive(Debug, Clone)]
pub struct IngestedTable {
    pub dataset: Dataset,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    /// True when `cost` was not in the file and was derived as amount / count.
    pub cost_derived: bool,
}

/// One line of the shipment sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    /// Normalized ingredient key (lowercase letters only).
    pub ingredient: String,
    pub quantity: f64,
    pub shipments: f64,
    pub frequency: String,
}

impl Shipment {
    /// Deliveries per month implied by the frequency label.
    pub fn frequency_factor(&self) -> f64 {
        match normalize_header_name(&self.frequency).as_str() {
            "weekly" => 4.0,
            "biweekly" => 2.0,
            _ => 1.0,
        }
    }

    pub fn monthly_total(&self) -> f64 {
        self.quantity * self.shipments * self.frequency_factor()
    }
}

/// Load the merged item table.
pub fn load_item_table(path: &Path) -> Result<IngestedTable, AppError> {
    let (headers, mut reader) = open_csv(path)?;
    let (columns, header_map) = build_header_map(&headers);

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let mut row = Row::new();
        let mut blank = true;
        for name in &columns {
            let value = header_map
                .get(name)
                .and_then(|i| record.get(*i))
                .map(Value::parse)
                .unwrap_or(Value::Missing);
            blank &= value.is_missing();
            row.insert(name.clone(), value);
        }
        if blank {
            row_errors.push(RowError {
                line,
                message: "Empty row.".to_string(),
            });
            continue;
        }
        rows.push(row);
    }

    if !row_errors.is_empty() {
        warn!("Skipped {} rows of '{}'", row_errors.len(), path.display());
    }
    if rows.is_empty() {
        return Err(AppError::new(
            3,
            format!("No usable rows in '{}'.", path.display()),
        ));
    }

    let mut columns = columns;
    let cost_derived = derive_cost(&mut columns, &mut rows);
    if cost_derived {
        info!("Derived `cost` as amount / count");
    }
    info!("Loaded {} item rows ({} columns) from '{}'", rows.len(), columns.len(), path.display());

    Ok(IngestedTable {
        dataset: Dataset::new(columns, rows),
        row_errors,
        rows_read,
        cost_derived,
    })
}

/// Load the shipment sheet.
///
/// Rows without an ingredient are skipped; missing numbers count as zero.
pub fn load_shipments(path: &Path) -> Result<Vec<Shipment>, AppError> {
    let (headers, mut reader) = open_csv(path)?;
    let (_, header_map) = build_header_map(&headers);

    for required in ["ingredient", "quantitypershipment", "numberofshipments", "frequency"] {
        if !header_map.contains_key(required) {
            return Err(AppError::new(
                2,
                format!("Missing required shipment column: `{required}`"),
            ));
        }
    }

    let mut shipments = Vec::new();
    let mut skipped = 0usize;
    for result in reader.records() {
        let Ok(record) = result else {
            skipped += 1;
            continue;
        };
        let Some(ingredient) = get_optional(&record, &header_map, "ingredient") else {
            skipped += 1;
            continue;
        };
        let number = |name: &str| {
            get_optional(&record, &header_map, name)
                .map(Value::parse)
                .map(|v| v.coerce_f64())
                .unwrap_or(0.0)
        };
        shipments.push(Shipment {
            ingredient: normalize_header_name(ingredient),
            quantity: number("quantitypershipment"),
            shipments: number("numberofshipments"),
            frequency: get_optional(&record, &header_map, "frequency")
                .unwrap_or_default()
                .to_string(),
        });
    }
    if skipped > 0 {
        warn!("Skipped {skipped} shipment rows of '{}'", path.display());
    }
    Ok(shipments)
}

/// Lowercase letters only; also strips a UTF-8 BOM.
pub fn normalize_header_name(name: &str) -> String {
    name.trim()
        .trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn open_csv(path: &Path) -> Result<(StringRecord, csv::Reader<File>), AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    Ok((headers, reader))
}

/// Column order plus name -> index. The first of duplicate names wins.
fn build_header_map(headers: &StringRecord) -> (Vec<String>, HashMap<String, usize>) {
    let mut columns = Vec::new();
    let mut map = HashMap::new();
    for (idx, raw) in headers.iter().enumerate() {
        let name = normalize_header_name(raw);
        if name.is_empty() || map.contains_key(&name) {
            continue;
        }
        map.insert(name.clone(), idx);
        columns.push(name);
    }
    (columns, map)
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

/// Add `cost = amount / count` when the sheet has no cost column.
fn derive_cost(columns: &mut Vec<String>, rows: &mut [Row]) -> bool {
    let has = |c: &str| columns.iter().any(|x| x == c);
    if has("cost") || !has("amount") || !has("count") {
        return false;
    }
    for row in rows.iter_mut() {
        let count = row.number("count");
        let cost = if count != 0.0 { row.number("amount") / count } else { 0.0 };
        row.insert("cost", cost);
    }
    columns.push("cost".to_string());
    true
}
