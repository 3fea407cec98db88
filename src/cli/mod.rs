//! Command-line interface for Catalog Harvest.

mod commands;
pub mod status;
pub mod progress;

pub use commands::{is_verbose, run};
