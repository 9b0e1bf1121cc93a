//! Shared helpers for number formatting, file naming and report dates

pub mod format;
pub mod naming;
pub mod time;
