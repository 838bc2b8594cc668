//! Export run results.
//!
//! - JSON: any result wrapped in a small envelope (`tool`, `generated_at`,
//!   `kind`, `result`)
//! - CSV: per-item cost predictions, easy to open in a spreadsheet

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::AppError;
use crate::forecast::CostPrediction;

pub const TOOL_NAME: &str = "pantry";

#[derive(Debug, Serialize)]
pub struct ExportEnvelope<'a, T: Serialize> {
    pub tool: &'static str,
    pub generated_at: DateTime<Utc>,
    /// `forecast`, `costs` or `inventory`.
    pub kind: &'a str,
    pub result: &'a T,
}

/// Write `result` as pretty JSON.
pub fn write_json<T: Serialize>(path: &Path, kind: &str, result: &T) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export JSON '{}': {e}", path.display())))?;

    let envelope = ExportEnvelope {
        tool: TOOL_NAME,
        generated_at: Utc::now(),
        kind,
        result,
    };
    serde_json::to_writer_pretty(file, &envelope)
        .map_err(|e| AppError::new(4, format!("Failed to write export JSON: {e}")))?;

    Ok(())
}

/// Write per-item cost predictions to a CSV file, in item order.
pub fn write_costs_csv(path: &Path, prediction: &CostPrediction) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writer
        .write_record(["item", "actual", "predicted", "squared_error", "selected_features"])
        .map_err(|e| AppError::new(4, format!("Failed to write export CSV header: {e}")))?;

    for item in &prediction.items {
        writer
            .write_record([
                item.item.clone(),
                format!("{:.4}", item.actual),
                format!("{:.4}", item.predicted),
                format!("{:.6}", item.squared_error),
                item.selection.features.join(";"),
            ])
            .map_err(|e| AppError::new(4, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AnalysisConfig, Dataset, Value};
    use crate::forecast::predict_costs;

    fn prediction() -> CostPrediction {
        let ds = Dataset::from_columns(vec![
            (
                "itemname",
                vec!["Beef Noodle, Large".into(), "Beef Bowl".into(), "Beef Bun".into(), "Beef Roll".into()],
            ),
            ("cost", vec![10.0.into(), 12.0.into(), 11.0.into(), 9.0.into()]),
            (
                "braisedbeefusedg",
                vec![Value::from(5.0), 6.0.into(), 5.5.into(), 4.5.into()],
            ),
        ]);
        let config = AnalysisConfig {
            targets: vec!["braisedbeefusedg".to_string()],
            ..AnalysisConfig::default()
        };
        predict_costs(&ds, &config).unwrap()
    }

    #[test]
    fn json_envelope_wraps_result() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("costs.json");
        write_json(&path, "costs", &prediction()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let v: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["tool"], "pantry");
        assert_eq!(v["kind"], "costs");
        assert!(v["generated_at"].is_string());
        assert_eq!(v["result"]["items"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn costs_csv_has_one_row_per_item() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("costs.csv");
        write_costs_csv(&path, &prediction()).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.get(4), Some("selected_features"));
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].get(0), Some("Beef Noodle, Large"));
        assert_eq!(records[0].get(1), Some("10.0000"));
        assert_eq!(records[0].get(4), Some("braisedbeefusedg"));
    }

    #[test]
    fn unwritable_path_is_exit_4() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.json");
        let err = write_json(&path, "costs", &prediction()).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }
}
