//! Regression fitting orchestration.
//!
//! Responsibilities:
//!
//! - fit OLS models on named feature subsets (`fitter`)
//! - stepwise AIC feature selection (`selection`)
//! - accuracy metric aggregation (`metrics`)

pub mod fitter;
pub mod metrics;
pub mod selection;

pub use fitter::*;
pub use metrics::*;
pub use selection::*;
