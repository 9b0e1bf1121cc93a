//! Run summaries and result exports
//!
//! [`ReportFormatter`] renders an analysis run for the console or as JSON and
//! exports all result rows as CSV.

use crate::errors::{AppError, AppResult};
use crate::types::{ReportResults, RunSummary, SkippedEntry};
use crate::utils::format::format_number;
use crate::utils::time::{millis_to_display, millis_to_iso};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Output format options for run summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Console,
    Json,
}

#[derive(Serialize)]
struct RunReport<'a> {
    summary: &'a RunSummary,
    results: &'a [ReportResults],
    skipped_plots: &'a [SkippedEntry],
}

/// One CSV line: a single value of a single player
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    report: &'a str,
    date: String,
    analysis: &'a str,
    player: &'a str,
    class: &'a str,
    role: String,
    column: &'a str,
    value: f64,
}

/// Facade for summary formatting and exports
pub struct ReportFormatter;

impl ReportFormatter {
    /// Summary of one run, including per-report result tables for the console
    pub fn format_run(
        summary: &RunSummary,
        results: &[ReportResults],
        skipped_plots: &[SkippedEntry],
        format: &OutputFormat,
    ) -> AppResult<String> {
        match format {
            OutputFormat::Console => Ok(format_console(summary, results, skipped_plots)),
            OutputFormat::Json => export_json(&RunReport {
                summary,
                results,
                skipped_plots,
            }),
        }
    }

    /// Write every value of every row as one CSV line
    pub fn export_csv(results: &[ReportResults], path: &Path) -> AppResult<usize> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = csv::Writer::from_path(path)?;
        let mut lines = 0;

        for report in results {
            for analysis in &report.analyses {
                for row in &analysis.rows {
                    for (column, value) in &row.values {
                        writer.serialize(CsvRow {
                            report: &report.code,
                            date: millis_to_iso(report.start_time_ms),
                            analysis: &analysis.name,
                            player: &row.player_name,
                            class: &row.class,
                            role: row.role.to_string(),
                            column,
                            value: *value,
                        })?;
                        lines += 1;
                    }
                }
            }
        }

        writer.flush()?;
        info!("Exported {} values to {}", lines, path.display());
        Ok(lines)
    }
}

/// Export data as JSON for programmatic use
pub fn export_json<T: Serialize>(data: &T) -> AppResult<String> {
    serde_json::to_string_pretty(data)
        .map_err(|e| AppError::Configuration(format!("JSON export failed: {}", e)))
}

fn format_console(
    summary: &RunSummary,
    results: &[ReportResults],
    skipped_plots: &[SkippedEntry],
) -> String {
    let mut output = format!(
        "Boss: {}\nReports processed: {}, failed: {}\n",
        summary.boss,
        summary.processed.len(),
        summary.failed.len()
    );

    for report in results {
        output.push_str(&format!(
            "\nReport {} ({})\n",
            report.code,
            millis_to_display(report.start_time_ms)
        ));
        for analysis in &report.analyses {
            output.push_str(&format!(
                "  {} [{} fights, {}s]\n",
                analysis.name,
                analysis.fight_ids.len(),
                analysis.duration_ms / 1000
            ));
            for row in &analysis.rows {
                let values = analysis
                    .columns
                    .iter()
                    .map(|c| format_number(row.value(&c.key)))
                    .collect::<Vec<_>>()
                    .join("|");
                output.push_str(&format!(
                    "    {}|{}|{}|{}\n",
                    row.player_name, row.class, row.role, values
                ));
            }
        }
    }

    if !summary.failed.is_empty() {
        output.push_str("\nFailed reports:\n");
        for failed in &summary.failed {
            output.push_str(&format!("  {}: {}\n", failed.code, failed.reason));
        }
    }

    let skipped: Vec<&SkippedEntry> = summary.skipped.iter().chain(skipped_plots).collect();
    if !skipped.is_empty() {
        output.push_str("\nSkipped:\n");
        for entry in skipped {
            match &entry.report {
                Some(report) => output.push_str(&format!(
                    "  {} ({}): {}\n",
                    entry.entry, report, entry.reason
                )),
                None => output.push_str(&format!("  {}: {}\n", entry.entry, entry.reason)),
            }
        }
    }

    output
}
