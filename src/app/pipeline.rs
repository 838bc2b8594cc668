//! Shared "load then analyze" logic behind each CLI command.
//!
//! Each run keeps the ingest result next to the analysis so callers can
//! report skipped rows alongside the model output.

use std::path::Path;

use log::warn;

use crate::domain::{AnalysisConfig, Month};
use crate::error::AppError;
use crate::forecast::{CostPrediction, UsageForecast, forecast_usage, predict_costs};
use crate::inventory::{Bestsellers, InventoryReport, Timeline, bestsellers, compare_usage, timeline};
use crate::io::ingest::{IngestedTable, Shipment, load_item_table, load_shipments};

#[derive(Debug, Clone)]
pub struct ForecastRun {
    pub table: IngestedTable,
    pub forecast: UsageForecast,
}

#[derive(Debug, Clone)]
pub struct CostRun {
    pub table: IngestedTable,
    pub prediction: CostPrediction,
}

#[derive(Debug, Clone)]
pub struct InventoryRun {
    pub table: IngestedTable,
    pub shipments: Vec<Shipment>,
    pub report: InventoryReport,
}

#[derive(Debug, Clone)]
pub struct BestsellerRun {
    pub table: IngestedTable,
    pub bestsellers: Bestsellers,
}

#[derive(Debug, Clone)]
pub struct TimelineRun {
    pub table: IngestedTable,
    pub shipments: Vec<Shipment>,
    pub timeline: Timeline,
}

/// Load the item table and surface skipped rows.
pub fn load_items(path: &Path) -> Result<IngestedTable, AppError> {
    let table = load_item_table(path)?;
    for e in table.row_errors.iter().take(5) {
        warn!("line {}: {}", e.line, e.message);
    }
    Ok(table)
}

pub fn run_forecast(items: &Path, month: Month, config: &AnalysisConfig) -> Result<ForecastRun, AppError> {
    let table = load_items(items)?;
    let forecast = forecast_usage(&table.dataset, month, config)?;
    Ok(ForecastRun { table, forecast })
}

pub fn run_costs(items: &Path, config: &AnalysisConfig) -> Result<CostRun, AppError> {
    let table = load_items(items)?;
    let prediction = predict_costs(&table.dataset, config)?;
    Ok(CostRun { table, prediction })
}

pub fn run_inventory(
    items: &Path,
    shipments: &Path,
    month: Month,
    config: &AnalysisConfig,
) -> Result<InventoryRun, AppError> {
    let table = load_items(items)?;
    let shipments = load_shipments(shipments)?;
    let report = compare_usage(&table.dataset, &shipments, month, config)?;
    Ok(InventoryRun {
        table,
        shipments,
        report,
    })
}

pub fn run_bestsellers(
    items: &Path,
    month: Option<Month>,
    top: usize,
    config: &AnalysisConfig,
) -> Result<BestsellerRun, AppError> {
    let table = load_items(items)?;
    let bestsellers = bestsellers(&table.dataset, month, top, config)?;
    Ok(BestsellerRun { table, bestsellers })
}

pub fn run_timeline(
    items: &Path,
    shipments: &Path,
    ingredient: &str,
    config: &AnalysisConfig,
) -> Result<TimelineRun, AppError> {
    let table = load_items(items)?;
    let shipments = load_shipments(shipments)?;
    let timeline = timeline(&table.dataset, &shipments, ingredient, config)?;
    Ok(TimelineRun {
        table,
        shipments,
        timeline,
    })
}
