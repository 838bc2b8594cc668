//! `pantry-analytics` library crate.
//!
//! The binary (`pantry`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the forecasting code stays separate from file formats and terminal output

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod forecast;
pub mod inventory;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
