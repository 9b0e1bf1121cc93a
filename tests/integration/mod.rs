//! Integration Tests Module
//!
//! End-to-end runs from report data to written plots and exports.
