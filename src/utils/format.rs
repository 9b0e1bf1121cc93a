//! Display formatting for table values and change figures
//!
//! Large values are abbreviated with `k`/`m`/`b` suffixes so that damage totals
//! fit the value column; whole numbers are printed without decimals.

/// Format a value for a table cell
///
/// # Examples
/// ```
/// use guild_log_analysis::utils::format::format_number;
/// assert_eq!(format_number(8.0), "8");
/// assert_eq!(format_number(2.5), "2.50");
/// assert_eq!(format_number(1_234.0), "1.23k");
/// assert_eq!(format_number(2_500_000.0), "2.50m");
/// assert_eq!(format_number(3_000_000_000.0), "3.00b");
/// ```
pub fn format_number(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1e9 {
        format!("{:.2}b", value / 1e9)
    } else if magnitude >= 1e6 {
        format!("{:.2}m", value / 1e6)
    } else if magnitude >= 1e3 {
        format!("{:.2}k", value / 1e3)
    } else if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

/// Format a percentage with one decimal
///
/// # Examples
/// ```
/// use guild_log_analysis::utils::format::format_percentage;
/// assert_eq!(format_percentage(75.0), "75.0%");
/// assert_eq!(format_percentage(33.333), "33.3%");
/// ```
pub fn format_percentage(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Format a signed change as `+ x` / `- x`, or `0` when unchanged
///
/// Values are rounded to two decimals first so that float noise from
/// normalization never prints as a change.
///
/// # Examples
/// ```
/// use guild_log_analysis::utils::format::format_change;
/// assert_eq!(format_change(16.0, false), "+ 16");
/// assert_eq!(format_change(-2.5, false), "- 2.50");
/// assert_eq!(format_change(0.0001, false), "0");
/// assert_eq!(format_change(12.5, true), "+ 12.5%");
/// ```
pub fn format_change(delta: f64, percentage: bool) -> String {
    let rounded = (delta * 100.0).round() / 100.0;
    if rounded == 0.0 {
        return "0".to_string();
    }

    let sign = if rounded > 0.0 { "+" } else { "-" };
    let body = if percentage {
        format_percentage(rounded.abs())
    } else {
        format_number(rounded.abs())
    };
    format!("{} {}", sign, body)
}

/// Compact axis tick label (`1.2K`, `3.4M`, `5.6B`)
pub fn format_axis_value(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1e9 {
        format!("{:.1}B", value / 1e9)
    } else if magnitude >= 1e6 {
        format!("{:.1}M", value / 1e6)
    } else if magnitude >= 1e3 {
        format!("{:.1}K", value / 1e3)
    } else {
        format!("{:.0}", value)
    }
}
