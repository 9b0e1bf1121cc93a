//! Duration normalization and period-over-period change
//!
//! Count and damage totals are scaled to a fixed window (30 minutes by default)
//! before differencing, so reports with different numbers or lengths of
//! attempts compare fairly. Percentages and deaths are compared as-is.
//!
//! Missing-baseline policy:
//! - no previous report at all: every change is [`Change::NotAvailable`]
//! - player absent from the previous report: counts, damage and deaths use a
//!   zero baseline; percentages are [`Change::NotAvailable`]

use crate::types::{Change, MetricKind, ResultRow};
use crate::utils::time::millis_to_seconds;
use std::collections::BTreeMap;

/// Scale `value` accumulated over `duration_ms` to `window_seconds`
///
/// A non-positive duration leaves the value unscaled.
///
/// # Examples
/// ```
/// use guild_log_analysis::analysis::normalize::normalize_rate;
/// assert_eq!(normalize_rate(10.0, 900_000, 1800.0), 20.0);
/// assert_eq!(normalize_rate(4.0, 1_800_000, 1800.0), 4.0);
/// ```
pub fn normalize_rate(value: f64, duration_ms: i64, window_seconds: f64) -> f64 {
    let seconds = millis_to_seconds(duration_ms);
    if seconds <= 0.0 {
        value
    } else {
        value * window_seconds / seconds
    }
}

/// Comparable value for a metric kind
pub fn normalize_value(metric: MetricKind, value: f64, duration_ms: i64, window_seconds: f64) -> f64 {
    if metric.is_rate() {
        normalize_rate(value, duration_ms, window_seconds)
    } else {
        value
    }
}

/// One report's rows for a single column
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub rows: &'a [ResultRow],
    pub column: &'a str,
    pub duration_ms: i64,
}

impl<'a> Snapshot<'a> {
    pub fn new(rows: &'a [ResultRow], column: &'a str, duration_ms: i64) -> Self {
        Self {
            rows,
            column,
            duration_ms,
        }
    }

    fn value_of(&self, player_name: &str) -> Option<f64> {
        self.rows
            .iter()
            .find(|r| r.player_name == player_name)
            .map(|r| r.value(self.column))
    }
}

/// Change per player of `current` against `previous`
pub fn compute_change(
    current: &Snapshot<'_>,
    previous: Option<&Snapshot<'_>>,
    metric: MetricKind,
    window_seconds: f64,
) -> BTreeMap<String, Change> {
    current
        .rows
        .iter()
        .map(|row| {
            let change = match previous {
                None => Change::NotAvailable,
                Some(previous) => change_between(
                    row.value(current.column),
                    current.duration_ms,
                    previous.value_of(&row.player_name),
                    previous.duration_ms,
                    metric,
                    window_seconds,
                ),
            };
            (row.player_name.clone(), change)
        })
        .collect()
}

/// Change of a single value, shared by row and totals computation
pub fn change_between(
    current: f64,
    current_duration_ms: i64,
    previous: Option<f64>,
    previous_duration_ms: i64,
    metric: MetricKind,
    window_seconds: f64,
) -> Change {
    let current = normalize_value(metric, current, current_duration_ms, window_seconds);
    match previous {
        Some(previous) => Change::Delta(
            current - normalize_value(metric, previous, previous_duration_ms, window_seconds),
        ),
        None if metric == MetricKind::Percentage => Change::NotAvailable,
        None => Change::Delta(current),
    }
}
