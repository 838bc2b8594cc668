//! Reporting utilities: formatted terminal output for each analysis.

pub mod format;

pub use format::*;
