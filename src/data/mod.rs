//! Data sources that do not come from user files.
//!
//! - seeded synthetic item tables for demos and tests (`sample`)

pub mod sample;

pub use sample::*;
