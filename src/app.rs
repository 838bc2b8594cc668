//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and sets up logging
//! - parses CLI arguments
//! - runs the requested analysis
//! - prints reports/plots
//! - writes optional exports

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::cli::{BestsellerArgs, Cli, Command, CostArgs, DemoArgs, ForecastArgs, InventoryArgs, TimelineArgs};
use crate::domain::{AnalysisConfig, Month, SelectorOptions};
use crate::error::AppError;

pub mod pipeline;

pub const ITEMS_ENV: &str = "PANTRY_ITEMS";
pub const SHIPMENTS_ENV: &str = "PANTRY_SHIPMENTS";
pub const DEFAULT_ITEMS_PATH: &str = "data/processed/item.csv";
pub const DEFAULT_SHIPMENTS_PATH: &str = "data/processed/ship.csv";

/// Entry point for the `pantry` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = analysis_config_from_args(&cli);
    match cli.command {
        Command::Forecast(args) => handle_forecast(&args, &config),
        Command::Costs(args) => handle_costs(&args, &config),
        Command::Inventory(args) => handle_inventory(&args, &config),
        Command::Bestsellers(args) => handle_bestsellers(&args, &config),
        Command::Timeline(args) => handle_timeline(&args, &config),
        Command::Demo(args) => handle_demo(&args),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}

pub fn analysis_config_from_args(cli: &Cli) -> AnalysisConfig {
    AnalysisConfig {
        selector: SelectorOptions {
            max_steps: cli.max_steps,
        },
        ..AnalysisConfig::default()
    }
}

/// CLI path, else the environment variable, else the fallback.
pub fn resolve_data_path(arg: Option<&Path>, env_var: &str, fallback: &str) -> PathBuf {
    arg.map(Path::to_path_buf)
        .or_else(|| {
            std::env::var_os(env_var)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        })
        .unwrap_or_else(|| PathBuf::from(fallback))
}

fn handle_forecast(args: &ForecastArgs, config: &AnalysisConfig) -> Result<(), AppError> {
    let month = Month::from_label(&args.month)?;
    let items = resolve_data_path(args.items.as_deref(), ITEMS_ENV, DEFAULT_ITEMS_PATH);
    let run = pipeline::run_forecast(&items, month, config)?;

    println!("{}", crate::report::format_forecast(&run.forecast));

    if args.plot {
        let bars = crate::plot::forecast_bars(&run.forecast);
        let title = format!("usage totals for {month}");
        println!("{}", crate::plot::render_bar_chart(&title, crate::plot::ACTUAL_VS_PREDICTED, &bars, args.width));
    }
    if let Some(path) = &args.export {
        crate::io::export::write_json(path, "forecast", &run.forecast)?;
    }
    Ok(())
}

fn handle_costs(args: &CostArgs, config: &AnalysisConfig) -> Result<(), AppError> {
    let items = resolve_data_path(args.items.as_deref(), ITEMS_ENV, DEFAULT_ITEMS_PATH);
    let run = pipeline::run_costs(&items, config)?;

    println!("{}", crate::report::format_costs(&run.prediction, args.top));

    if args.plot {
        let bars = crate::plot::cost_bars(&run.prediction);
        let chart = crate::plot::render_bar_chart("item cost", crate::plot::ACTUAL_VS_PREDICTED, &bars, args.width);
        println!("{chart}");
    }
    if let Some(path) = &args.export {
        crate::io::export::write_json(path, "costs", &run.prediction)?;
    }
    if let Some(path) = &args.export_csv {
        crate::io::export::write_costs_csv(path, &run.prediction)?;
    }
    Ok(())
}

fn handle_inventory(args: &InventoryArgs, config: &AnalysisConfig) -> Result<(), AppError> {
    let month = Month::from_label(&args.month)?;
    let items = resolve_data_path(args.items.as_deref(), ITEMS_ENV, DEFAULT_ITEMS_PATH);
    let shipments = resolve_data_path(args.shipments.as_deref(), SHIPMENTS_ENV, DEFAULT_SHIPMENTS_PATH);
    let run = pipeline::run_inventory(&items, &shipments, month, config)?;

    println!("{}", crate::report::format_inventory(&run.report));

    if let Some(path) = &args.export {
        crate::io::export::write_json(path, "inventory", &run.report)?;
    }
    Ok(())
}

fn handle_bestsellers(args: &BestsellerArgs, config: &AnalysisConfig) -> Result<(), AppError> {
    let month = args.month.as_deref().map(Month::from_label).transpose()?;
    let items = resolve_data_path(args.items.as_deref(), ITEMS_ENV, DEFAULT_ITEMS_PATH);
    let run = pipeline::run_bestsellers(&items, month, args.top, config)?;

    println!("{}", crate::report::format_bestsellers(&run.bestsellers));

    if args.plot {
        let bars = crate::plot::bestseller_bars(&run.bestsellers);
        let title = format!("sales for {}", run.bestsellers.scope_label());
        println!("{}", crate::plot::render_bar_chart(&title, crate::plot::SALES, &bars, args.width));
    }
    if let Some(path) = &args.export {
        crate::io::export::write_json(path, "bestsellers", &run.bestsellers)?;
    }
    Ok(())
}

fn handle_timeline(args: &TimelineArgs, config: &AnalysisConfig) -> Result<(), AppError> {
    let items = resolve_data_path(args.items.as_deref(), ITEMS_ENV, DEFAULT_ITEMS_PATH);
    let shipments = resolve_data_path(args.shipments.as_deref(), SHIPMENTS_ENV, DEFAULT_SHIPMENTS_PATH);
    let run = pipeline::run_timeline(&items, &shipments, &args.ingredient, config)?;

    println!("{}", crate::report::format_timeline(&run.timeline));

    if args.plot {
        let bars = crate::plot::timeline_bars(&run.timeline);
        let title = format!("{} used vs shipped", run.timeline.ingredient);
        println!("{}", crate::plot::render_bar_chart(&title, crate::plot::USED_VS_SHIPPED, &bars, args.width));
    }
    if let Some(path) = &args.export {
        crate::io::export::write_json(path, "timeline", &run.timeline)?;
    }
    Ok(())
}

fn handle_demo(args: &DemoArgs) -> Result<(), AppError> {
    let sample = crate::data::SampleConfig {
        seed: args.seed,
        items: args.items,
        ..crate::data::SampleConfig::default()
    };
    let dataset = crate::data::generate_items(&sample)?;
    crate::data::write_item_csv(&args.out, &dataset)?;
    println!("Wrote {} rows to {}", dataset.len(), args.out.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins() {
        let path = resolve_data_path(Some(Path::new("mine.csv")), ITEMS_ENV, DEFAULT_ITEMS_PATH);
        assert_eq!(path, PathBuf::from("mine.csv"));
    }

    #[test]
    fn unset_env_falls_back() {
        let path = resolve_data_path(None, "PANTRY_TEST_NEVER_SET", DEFAULT_SHIPMENTS_PATH);
        assert_eq!(path, PathBuf::from("data/processed/ship.csv"));
    }

    #[test]
    fn max_steps_flows_into_config() {
        let cli = Cli::parse_from(["pantry", "--max-steps", "3", "demo", "--out", "x.csv"]);
        let config = analysis_config_from_args(&cli);
        assert_eq!(config.selector.max_steps, 3);
        assert_eq!(config.targets.len(), 18);
    }
}
