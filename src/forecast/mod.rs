//! Forecasting on top of the stepwise selector.
//!
//! - next-month ingredient usage (`usage`)
//! - per-item cost with leave-one-item-out validation (`cost`)

pub mod cost;
pub mod usage;

pub use cost::*;
pub use usage::*;
