//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the observation table (`Dataset`, `Row`, `Value`)
//! - months, selector options and the analysis column layout
//! - the ingredient catalog

pub mod dataset;
pub mod ingredients;
pub mod types;

pub use dataset::*;
pub use types::*;
