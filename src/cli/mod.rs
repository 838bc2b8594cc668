//! Command-line parsing for the pantry analytics tool.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! modeling code. Dispatch lives in `app`.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::domain::DEFAULT_MAX_STEPS;
use crate::inventory::DEFAULT_TOP_ITEMS;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "pantry",
    version,
    about = "Ingredient usage forecasting and item cost analysis for a restaurant"
)]
pub struct Cli {
    /// More log output (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Safety bound on accepted moves per stepwise selection run.
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_STEPS)]
    pub max_steps: usize,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Forecast ingredient usage for a month from the months before it.
    Forecast(ForecastArgs),
    /// Predict each item's cost from its ingredients (leave-one-item-out).
    Costs(CostArgs),
    /// Compare a month's ingredient usage with monthly shipments.
    Inventory(InventoryArgs),
    /// Rank items by sales and list the ingredients they use.
    Bestsellers(BestsellerArgs),
    /// Track one shipped ingredient's monthly usage against its shipments.
    Timeline(TimelineArgs),
    /// Write a synthetic item table to try the other commands on.
    Demo(DemoArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct ForecastArgs {
    /// Month to forecast (e.g. "August", "aug").
    #[arg(short, long)]
    pub month: String,

    /// Merged item table. Defaults to `PANTRY_ITEMS`, then data/processed/item.csv.
    #[arg(long, value_name = "CSV")]
    pub items: Option<PathBuf>,

    /// Render predicted vs recorded totals as a bar chart.
    #[arg(long)]
    pub plot: bool,

    /// Bar chart width (columns).
    #[arg(long, default_value_t = 50)]
    pub width: usize,

    /// Export the forecast to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct CostArgs {
    /// Merged item table. Defaults to `PANTRY_ITEMS`, then data/processed/item.csv.
    #[arg(long, value_name = "CSV")]
    pub items: Option<PathBuf>,

    /// Rows shown in the ingredient and error tables.
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Render predicted vs actual item costs as a bar chart.
    #[arg(long)]
    pub plot: bool,

    /// Bar chart width (columns).
    #[arg(long, default_value_t = 50)]
    pub width: usize,

    /// Export the full prediction to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,

    /// Export per-item predictions to CSV.
    #[arg(long = "export-csv", value_name = "CSV")]
    pub export_csv: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct InventoryArgs {
    /// Month to inspect.
    #[arg(short, long)]
    pub month: String,

    /// Merged item table. Defaults to `PANTRY_ITEMS`, then data/processed/item.csv.
    #[arg(long, value_name = "CSV")]
    pub items: Option<PathBuf>,

    /// Shipment sheet. Defaults to `PANTRY_SHIPMENTS`, then data/processed/ship.csv.
    #[arg(long, value_name = "CSV")]
    pub shipments: Option<PathBuf>,

    /// Export the comparison to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct BestsellerArgs {
    /// Only count sales from this month. All months when omitted.
    #[arg(short, long)]
    pub month: Option<String>,

    /// Merged item table. Defaults to `PANTRY_ITEMS`, then data/processed/item.csv.
    #[arg(long, value_name = "CSV")]
    pub items: Option<PathBuf>,

    /// Number of items to list.
    #[arg(long, default_value_t = DEFAULT_TOP_ITEMS)]
    pub top: usize,

    /// Render sales per item as a bar chart.
    #[arg(long)]
    pub plot: bool,

    /// Bar chart width (columns).
    #[arg(long, default_value_t = 50)]
    pub width: usize,

    /// Export the ranking to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct TimelineArgs {
    /// Ingredient as named in the shipment sheet (e.g. "rice", "Rice Noodles").
    #[arg(short, long)]
    pub ingredient: String,

    /// Merged item table. Defaults to `PANTRY_ITEMS`, then data/processed/item.csv.
    #[arg(long, value_name = "CSV")]
    pub items: Option<PathBuf>,

    /// Shipment sheet. Defaults to `PANTRY_SHIPMENTS`, then data/processed/ship.csv.
    #[arg(long, value_name = "CSV")]
    pub shipments: Option<PathBuf>,

    /// Render used vs shipped per month as a bar chart.
    #[arg(long)]
    pub plot: bool,

    /// Bar chart width (columns).
    #[arg(long, default_value_t = 50)]
    pub width: usize,

    /// Export the series to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct DemoArgs {
    /// Output CSV path.
    #[arg(long, value_name = "CSV")]
    pub out: PathBuf,

    /// Random seed.
    #[arg(long, default_value_t = 7)]
    pub seed: u64,

    /// Number of menu items.
    #[arg(long, default_value_t = 12)]
    pub items: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_costs_with_global_flags() {
        let cli = Cli::parse_from(["pantry", "costs", "--top", "5", "-vv", "--max-steps", "12"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.max_steps, 12);
        match cli.command {
            Command::Costs(args) => {
                assert_eq!(args.top, 5);
                assert!(args.items.is_none());
                assert!(!args.plot);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn forecast_requires_a_month() {
        assert!(Cli::try_parse_from(["pantry", "forecast"]).is_err());
        let cli = Cli::try_parse_from(["pantry", "forecast", "--month", "aug", "--plot"]).unwrap();
        assert_eq!(cli.max_steps, DEFAULT_MAX_STEPS);
        assert!(matches!(cli.command, Command::Forecast(ForecastArgs { plot: true, .. })));
    }

    #[test]
    fn bestsellers_month_is_optional() {
        let cli = Cli::parse_from(["pantry", "bestsellers"]);
        match cli.command {
            Command::Bestsellers(args) => {
                assert_eq!(args.month, None);
                assert_eq!(args.top, DEFAULT_TOP_ITEMS);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        let cli = Cli::parse_from(["pantry", "bestsellers", "-m", "june", "--top", "3"]);
        assert!(matches!(
            cli.command,
            Command::Bestsellers(BestsellerArgs { top: 3, month: Some(ref m), .. }) if m == "june"
        ));
    }

    #[test]
    fn timeline_requires_an_ingredient() {
        assert!(Cli::try_parse_from(["pantry", "timeline"]).is_err());
        let cli = Cli::parse_from(["pantry", "timeline", "--ingredient", "Rice Noodles", "--plot"]);
        assert!(matches!(cli.command, Command::Timeline(TimelineArgs { plot: true, .. })));
    }
}
