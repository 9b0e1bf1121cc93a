//! Report timestamp helpers
//!
//! Warcraft Logs reports carry their start time as Unix milliseconds.

use chrono::{TimeZone, Utc};

/// Convert Unix milliseconds to an ISO 8601 date (YYYY-MM-DD)
///
/// Returns "1970-01-01" for out-of-range timestamps.
///
/// # Examples
/// ```
/// use guild_log_analysis::utils::time::millis_to_iso;
/// assert_eq!(millis_to_iso(0), "1970-01-01");
/// assert_eq!(millis_to_iso(1_704_067_200_000), "2024-01-01");
/// ```
pub fn millis_to_iso(timestamp_ms: i64) -> String {
    format_millis(timestamp_ms, "%Y-%m-%d", "1970-01-01")
}

/// Convert Unix milliseconds to the display date used in plot subtitles (DD.MM.YYYY)
///
/// # Examples
/// ```
/// use guild_log_analysis::utils::time::millis_to_display;
/// assert_eq!(millis_to_display(1_704_067_200_000), "01.01.2024");
/// ```
pub fn millis_to_display(timestamp_ms: i64) -> String {
    format_millis(timestamp_ms, "%d.%m.%Y", "01.01.1970")
}

fn format_millis(timestamp_ms: i64, pattern: &str, fallback: &str) -> String {
    Utc.timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|dt| dt.format(pattern).to_string())
        .unwrap_or_else(|| fallback.to_string())
}

/// Milliseconds to seconds as float
pub fn millis_to_seconds(duration_ms: i64) -> f64 {
    duration_ms as f64 / 1000.0
}
