//! Turns analysis results plus a plot entry into a render-ready table
//!
//! All number crunching for a table plot happens here (sorting, bar ratios,
//! totals, change against the previous report); the renderer only draws.

use crate::analysis::normalize::{change_between, compute_change, Snapshot};
use crate::errors::{AppError, AppResult};
use crate::types::{
    AnalysisEntry, AnalysisResult, Change, MetricKind, PlotEntry, PlotType, ResultRow,
};
use crate::utils::format::{format_change, format_number, format_percentage};
use crate::utils::naming::plot_filename;
use crate::utils::time::{millis_to_display, millis_to_iso};

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnHeaders {
    pub name: String,
    pub value: String,
    pub secondary: Option<String>,
    pub bar: String,
    pub change: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderRow {
    pub label: String,
    /// None for the totals row
    pub class: Option<String>,
    pub value: f64,
    pub value_text: String,
    pub secondary_text: Option<String>,
    /// Fill ratio in [0, 1]; None draws no bar
    pub bar_ratio: Option<f64>,
    pub change: Change,
    pub change_text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderSpec {
    pub title: String,
    /// Report date as shown (DD.MM.YYYY)
    pub subtitle: String,
    pub description: Option<String>,
    pub plot_type: PlotType,
    pub headers: ColumnHeaders,
    pub rows: Vec<RenderRow>,
    pub totals: Option<RenderRow>,
    pub invert_change_colors: bool,
    /// Report date used in the file name (YYYY-MM-DD)
    pub date_iso: String,
}

impl RenderSpec {
    pub fn filename(&self, extension: &str) -> String {
        plot_filename(&self.date_iso, &self.title, extension)
    }
}

/// Current and previous results for one analysis
pub struct ResolveInput<'a> {
    pub current: &'a AnalysisResult,
    pub previous: Option<&'a AnalysisResult>,
    pub report_start_ms: i64,
    pub window_seconds: f64,
}

pub fn resolve(plot: &PlotEntry, entry: &AnalysisEntry, input: &ResolveInput<'_>) -> AppResult<RenderSpec> {
    let title = plot.title_for(entry);
    let value_column = plot.value_column_for(entry);
    let metric = input.current.metric_for(&value_column).ok_or_else(|| {
        AppError::Configuration(format!("'{}' has no column '{}'", entry.name, value_column))
    })?;
    let secondary_column = plot.secondary_column_for(entry);
    if let Some(column) = &secondary_column {
        if input.current.metric_for(column).is_none() {
            return Err(AppError::Configuration(format!(
                "'{}' has no column '{}'",
                entry.name, column
            )));
        }
    }

    let mut rows = filtered_rows(plot, input.current, &value_column, metric);
    if rows.is_empty() {
        return Err(AppError::Render(format!("no rows to plot for '{}'", title)));
    }
    rows.sort_by(|a, b| {
        b.value(&value_column)
            .total_cmp(&a.value(&value_column))
            .then_with(|| a.player_name.cmp(&b.player_name))
    });

    let previous_rows = input
        .previous
        .map(|p| filtered_rows(plot, p, &value_column, metric));
    let current_snapshot = Snapshot::new(&rows, &value_column, input.current.duration_ms);
    let previous_snapshot = match (input.previous, &previous_rows) {
        (Some(p), Some(prev_rows)) => Some(Snapshot::new(prev_rows, &value_column, p.duration_ms)),
        _ => None,
    };
    let changes = compute_change(
        &current_snapshot,
        previous_snapshot.as_ref(),
        metric,
        input.window_seconds,
    );

    let max_value = rows
        .iter()
        .map(|r| r.value(&value_column))
        .fold(0.0, f64::max);

    let render_rows = rows
        .iter()
        .map(|row| {
            let value = row.value(&value_column);
            let change = changes
                .get(&row.player_name)
                .copied()
                .unwrap_or(Change::NotAvailable);
            RenderRow {
                label: row.player_name.clone(),
                class: Some(row.class.clone()),
                value,
                value_text: format_value(plot.plot_type, value),
                secondary_text: secondary_column
                    .as_ref()
                    .map(|c| format_number(row.value(c))),
                bar_ratio: Some(bar_ratio(plot.plot_type, value, max_value)),
                change,
                change_text: change_text(&change, metric),
            }
        })
        .collect::<Vec<_>>();

    let totals = if plot.totals {
        let total = aggregate(plot.plot_type, &rows, &value_column);
        let change = match (input.previous, &previous_rows) {
            (Some(previous), Some(prev_rows)) => {
                let previous_total = if prev_rows.is_empty() {
                    None
                } else {
                    Some(aggregate(plot.plot_type, prev_rows, &value_column))
                };
                change_between(
                    total,
                    input.current.duration_ms,
                    previous_total,
                    previous.duration_ms,
                    metric,
                    input.window_seconds,
                )
            }
            _ => Change::NotAvailable,
        };
        Some(RenderRow {
            label: totals_label(plot.plot_type).to_string(),
            class: None,
            value: total,
            value_text: format_value(plot.plot_type, total),
            secondary_text: secondary_column
                .as_ref()
                .map(|c| format_number(rows.iter().map(|r| r.value(c)).sum())),
            bar_ratio: None,
            change,
            change_text: change_text(&change, metric),
        })
    } else {
        None
    };

    Ok(RenderSpec {
        title,
        subtitle: millis_to_display(input.report_start_ms),
        description: plot.description.clone(),
        plot_type: plot.plot_type,
        headers: ColumnHeaders {
            name: plot.name_header.clone().unwrap_or_else(|| "Name".to_string()),
            value: plot.value_header.clone().unwrap_or_default(),
            secondary: secondary_column
                .as_ref()
                .map(|_| plot.secondary_header.clone().unwrap_or_default()),
            bar: plot.bar_header.clone().unwrap_or_default(),
            change: plot.change_header.clone().unwrap_or_default(),
        },
        rows: render_rows,
        totals,
        invert_change_colors: plot.invert_change_colors,
        date_iso: millis_to_iso(input.report_start_ms),
    })
}

/// Rows of the plot's roles; percentages are clamped to [0, 100]
fn filtered_rows(
    plot: &PlotEntry,
    result: &AnalysisResult,
    value_column: &str,
    metric: MetricKind,
) -> Vec<ResultRow> {
    let mut rows: Vec<ResultRow> = result
        .rows
        .iter()
        .filter(|r| plot.allows_role(r.role))
        .cloned()
        .collect();
    if metric == MetricKind::Percentage {
        for row in &mut rows {
            let clamped = row.value(value_column).clamp(0.0, 100.0);
            row.values.insert(value_column.to_string(), clamped);
        }
    }
    rows
}

/// Sum for counts, mean for percentages
pub fn aggregate(plot_type: PlotType, rows: &[ResultRow], column: &str) -> f64 {
    let sum: f64 = rows.iter().map(|r| r.value(column)).sum();
    match plot_type {
        PlotType::PercentagePlot if !rows.is_empty() => sum / rows.len() as f64,
        _ => sum,
    }
}

fn totals_label(plot_type: PlotType) -> &'static str {
    match plot_type {
        PlotType::PercentagePlot => "Average",
        _ => "Total",
    }
}

fn format_value(plot_type: PlotType, value: f64) -> String {
    match plot_type {
        PlotType::PercentagePlot => format_percentage(value),
        _ => format_number(value),
    }
}

fn bar_ratio(plot_type: PlotType, value: f64, max_value: f64) -> f64 {
    let ratio = match plot_type {
        PlotType::PercentagePlot => value / 100.0,
        _ if max_value > 0.0 => value / max_value,
        _ => 0.0,
    };
    ratio.clamp(0.0, 1.0)
}

fn change_text(change: &Change, metric: MetricKind) -> String {
    match change {
        Change::NotAvailable => "N/A".to_string(),
        Change::Delta(delta) => format_change(*delta, metric == MetricKind::Percentage),
    }
}
