use super::entries::{Column, MetricKind};
use super::report::Role;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One player's values for one analysis in one report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub player_name: String,
    pub class: String,
    /// Role the player spent most fight time in
    pub role: Role,
    pub values: BTreeMap<String, f64>,
}

impl ResultRow {
    /// Value of a column, 0 when the column is absent
    pub fn value(&self, column: &str) -> f64 {
        self.values.get(column).copied().unwrap_or(0.0)
    }
}

/// Output of one analysis entry against one report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub name: String,
    pub result_key: String,
    pub columns: Vec<Column>,
    pub rows: Vec<ResultRow>,
    /// Summed duration of the qualifying fights
    pub duration_ms: i64,
    pub fight_ids: Vec<u32>,
}

impl AnalysisResult {
    pub fn metric_for(&self, column: &str) -> Option<MetricKind> {
        self.columns
            .iter()
            .find(|c| c.key == column)
            .map(|c| c.metric)
    }

    pub fn row(&self, player_name: &str) -> Option<&ResultRow> {
        self.rows.iter().find(|r| r.player_name == player_name)
    }
}

/// All analysis results of one report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportResults {
    pub code: String,
    pub start_time_ms: i64,
    pub analyses: Vec<AnalysisResult>,
}

impl ReportResults {
    pub fn get(&self, result_key: &str) -> Option<&AnalysisResult> {
        self.analyses.iter().find(|a| a.result_key == result_key)
    }
}

/// Change of one value against the previous report
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Change {
    Delta(f64),
    NotAvailable,
}

impl Change {
    pub fn delta(&self) -> Option<f64> {
        match self {
            Change::Delta(d) => Some(*d),
            Change::NotAvailable => None,
        }
    }
}

/// An analysis entry or plot that produced no output, with the reason
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedEntry {
    pub report: Option<String>,
    pub entry: String,
    pub reason: String,
}

/// A report whose fetch failed as a whole
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedReport {
    pub code: String,
    pub reason: String,
}

/// Outcome of `analyze()` across all requested reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RunSummary {
    pub boss: String,
    pub processed: Vec<String>,
    pub failed: Vec<FailedReport>,
    pub skipped: Vec<SkippedEntry>,
}

impl RunSummary {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }
}
