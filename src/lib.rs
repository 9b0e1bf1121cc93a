//! Guild Log Analysis
//!
//! Per-player raid encounter metrics from Warcraft Logs reports, compared
//! against the previous report and rendered as table plots.

pub mod analysis;
pub mod analyzer;
pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod plotting;
pub mod types;
pub mod utils;
