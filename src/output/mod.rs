//! Output module for reporting run results and stored data
//!
//! This module handles:
//! - Printing the summary of a finished run
//! - Loading and printing statistics from an existing database

mod report;
pub mod stats;

pub use report::{format_run_report, print_run_report};
pub use stats::{load_statistics, print_statistics, StoreStatistics};
