//! Boss analysis engine
//!
//! A boss is described by a data-only [`BossDefinition`]: the metrics to
//! compute (analysis entries) and how to render them (plot entries). The
//! [`BossAnalysis`] engine consumes one definition:
//!
//! - **context** - fights, rosters and death counts of one report
//! - **executor** - runs one analysis entry against a report
//! - **contributions** - per-fight accumulation and role-switch deduplication
//! - **normalize** - duration normalization and change computation
//! - **registry** - boss key to definition factory
//! - **reports** - console/JSON summaries and CSV export
//!
//! ## Usage
//!
//! ```rust,no_run
//! use guild_log_analysis::analysis::{default_registry, BossAnalysis, ReportSource};
//! use guild_log_analysis::config::AppConfig;
//! use guild_log_analysis::errors::AppResult;
//! use std::path::Path;
//! use std::rc::Rc;
//!
//! fn example(source: Rc<dyn ReportSource>) -> AppResult<()> {
//!     let config = AppConfig::get_defaults();
//!     let definition = default_registry()?.create("one_armed_bandit")?;
//!
//!     let mut analysis = BossAnalysis::new(definition, source, config.analysis_settings());
//!     let summary = analysis.analyze(&["aBcD1234".to_string()])?;
//!     let written = analysis.generate_plots(Path::new("./plots"), &config.plot_settings())?;
//!     println!("{} reports, {} plots", summary.processed.len(), written.len());
//!     Ok(())
//! }
//! ```

pub mod bosses;
pub mod context;
pub mod contributions;
pub mod executor;
pub mod normalize;
pub mod registry;
pub mod reports;
pub mod source;

pub use bosses::{default_registry, BossDefinition};
pub use context::{FightContext, ReportContext};
pub use executor::{run_analysis, CustomAnalysisFn, CustomFightInput, CustomHandlers};
pub use normalize::{compute_change, normalize_rate, Snapshot};
pub use registry::{BossFactory, BossRegistry};
pub use reports::{OutputFormat, ReportFormatter};
pub use source::{EventKind, EventQuery, ReportSource, TableKind, TableQuery};

use crate::config::{AnalysisSettings, PlotSettings};
use crate::errors::{AppError, AppResult};
use crate::plotting::{self, build_trend, resolve, ResolveInput, TrendGrouping};
use crate::types::{
    AnalysisEntry, AnalysisResult, Change, FailedReport, PlotEntry, ReportResults, RunSummary,
    SkippedEntry,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{error, info, warn};

/// Sub-directory of the output directory holding progress plots
pub const PROGRESS_DIR: &str = "progress";

/// Marks skipped-plot records that belong to progress plots
const PROGRESS_SKIP_SUFFIX: &str = " (progress)";

fn progress_title(title: &str) -> String {
    format!("{}{}", title, PROGRESS_SKIP_SUFFIX)
}

/// Runs one boss definition against reports and renders its plots
///
/// Results are owned by the instance and replaced on every
/// [`analyze`](Self::analyze) call; plotting only reads them.
pub struct BossAnalysis {
    definition: BossDefinition,
    source: Rc<dyn ReportSource>,
    settings: AnalysisSettings,
    /// Ordered by report start time, oldest first
    results: Vec<ReportResults>,
    skipped_plots: Vec<SkippedEntry>,
}

impl BossAnalysis {
    pub fn new(
        definition: BossDefinition,
        source: Rc<dyn ReportSource>,
        settings: AnalysisSettings,
    ) -> Self {
        Self {
            definition,
            source,
            settings,
            results: Vec::new(),
            skipped_plots: Vec::new(),
        }
    }

    pub fn definition(&self) -> &BossDefinition {
        &self.definition
    }

    pub fn results(&self) -> &[ReportResults] {
        &self.results
    }

    /// Plots skipped by the latest table and progress rendering
    pub fn skipped_plots(&self) -> &[SkippedEntry] {
        &self.skipped_plots
    }

    /// Analyse every report, replacing previous results
    ///
    /// A report whose data cannot be fetched is recorded as failed and the
    /// run continues; the run fails only if no report could be processed or
    /// the boss definition itself is broken.
    pub fn analyze(&mut self, report_codes: &[String]) -> AppResult<RunSummary> {
        if report_codes.is_empty() {
            return Err(AppError::Configuration("no report codes given".to_string()));
        }

        self.results.clear();
        self.skipped_plots.clear();
        let mut summary = RunSummary {
            boss: self.definition.key.clone(),
            ..Default::default()
        };
        let mut first_error = None;

        for code in report_codes {
            info!("Analysing report {} for {}", code, self.definition.name);
            match self.analyze_report(code) {
                Ok((results, skipped)) => {
                    summary.processed.push(code.clone());
                    summary.skipped.extend(skipped);
                    self.results.push(results);
                }
                Err(e @ AppError::Configuration(_)) => return Err(e),
                Err(e) => {
                    error!("Report {} failed: {}", code, e);
                    summary.failed.push(FailedReport {
                        code: code.clone(),
                        reason: e.to_string(),
                    });
                    first_error.get_or_insert(e);
                }
            }
        }

        if summary.processed.is_empty() {
            if let Some(e) = first_error {
                return Err(e);
            }
        }

        self.results.sort_by_key(|r| r.start_time_ms);
        info!(
            "{}: {} reports processed, {} failed, {} entries skipped",
            self.definition.name,
            summary.processed.len(),
            summary.failed.len(),
            summary.skipped.len()
        );
        Ok(summary)
    }

    /// Run every analysis entry against one report
    ///
    /// Entries without data (no qualifying fights, unexpected data shape) are
    /// returned as skipped; fetch failures abort the whole report.
    pub fn analyze_report(&self, code: &str) -> AppResult<(ReportResults, Vec<SkippedEntry>)> {
        let difficulty = self
            .definition
            .difficulty_or(self.settings.default_difficulty);
        let ctx = ReportContext::load(
            &*self.source,
            code,
            self.definition.encounter_id,
            difficulty,
        )?;
        if ctx.fights().is_empty() {
            warn!(
                "Report {} has no fights of encounter {} on difficulty {}",
                code, self.definition.encounter_id, difficulty
            );
        }

        let mut analyses = Vec::new();
        let mut skipped = Vec::new();
        for entry in &self.definition.analyses {
            match run_analysis(entry, &ctx, &self.definition.handlers, &self.settings) {
                Ok(result) => analyses.push(result),
                Err(e @ (AppError::DataShape(_) | AppError::NoQualifyingFights { .. })) => {
                    warn!("Skipping '{}' for report {}: {}", entry.name, code, e);
                    skipped.push(SkippedEntry {
                        report: Some(code.to_string()),
                        entry: entry.name.clone(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        Ok((
            ReportResults {
                code: code.to_string(),
                start_time_ms: ctx.start_time_ms,
                analyses,
            },
            skipped,
        ))
    }

    /// Reports holding `result_key`, newest first
    fn history(&self, result_key: &str) -> Vec<(&ReportResults, &AnalysisResult)> {
        self.results
            .iter()
            .rev()
            .filter_map(|report| report.get(result_key).map(|result| (report, result)))
            .collect()
    }

    /// Most recent result of an analysis and the one before it
    pub fn current_and_previous(
        &self,
        analysis: &str,
    ) -> Option<((&ReportResults, &AnalysisResult), Option<&AnalysisResult>)> {
        let entry = self.definition.analysis(analysis)?;
        let history = self.history(&entry.result_key());
        let current = *history.first()?;
        Some((current, history.get(1).map(|(_, result)| *result)))
    }

    /// Per-player change of an analysis' primary column against the previous report
    pub fn changes(&self, analysis: &str) -> AppResult<BTreeMap<String, Change>> {
        let entry = self
            .definition
            .analysis(analysis)
            .ok_or_else(|| AppError::Configuration(format!("unknown analysis '{}'", analysis)))?;
        let key = entry.result_key();
        let ((_, current), previous) = self.current_and_previous(analysis).ok_or_else(|| {
            AppError::DataShape(format!("no results for '{}'", entry.name))
        })?;
        let metric = entry.metric_for(&key).unwrap_or_default();

        let current_snapshot = Snapshot::new(&current.rows, &key, current.duration_ms);
        let previous_snapshot =
            previous.map(|p| Snapshot::new(&p.rows, &key, p.duration_ms));
        Ok(compute_change(
            &current_snapshot,
            previous_snapshot.as_ref(),
            metric,
            self.settings.normalization_window_seconds,
        ))
    }

    fn plot_analysis(&self, plot: &PlotEntry) -> AppResult<&AnalysisEntry> {
        self.definition.analysis(&plot.analysis).ok_or_else(|| {
            AppError::Configuration(format!(
                "plot references unknown analysis '{}'",
                plot.analysis
            ))
        })
    }

    fn skip_plot(&mut self, report: Option<&str>, title: String, reason: String) {
        warn!("Skipping plot '{}': {}", title, reason);
        self.skipped_plots.push(SkippedEntry {
            report: report.map(str::to_string),
            entry: title,
            reason,
        });
    }

    /// Render one table plot per plot entry for the most recent report
    ///
    /// Plots without results or with nothing to draw are skipped and listed
    /// in [`skipped_plots`](Self::skipped_plots).
    pub fn generate_plots(
        &mut self,
        output_dir: &Path,
        plot_settings: &PlotSettings,
    ) -> AppResult<Vec<PathBuf>> {
        self.skipped_plots.clear();
        if self.results.is_empty() {
            warn!("No analysis results to plot for {}", self.definition.name);
            return Ok(Vec::new());
        }

        let extension = plot_settings.image_format.extension();
        let mut written = Vec::new();
        let mut skipped = Vec::new();

        for plot in &self.definition.plots {
            let entry = self.plot_analysis(plot)?;
            let title = plot.title_for(entry);
            let Some(((report, current), previous)) = self.current_and_previous(&entry.name)
            else {
                skipped.push((None, title, format!("no results for '{}'", entry.name)));
                continue;
            };

            let input = ResolveInput {
                current,
                previous,
                report_start_ms: report.start_time_ms,
                window_seconds: self.settings.normalization_window_seconds,
            };
            let spec = match resolve(plot, entry, &input) {
                Ok(spec) => spec,
                Err(AppError::Render(reason)) => {
                    skipped.push((Some(report.code.clone()), title, reason));
                    continue;
                }
                Err(e) => return Err(e),
            };

            let path = output_dir.join(spec.filename(extension));
            match plotting::save_figure(&spec, &path, plot_settings) {
                Ok(()) => written.push(path),
                Err(AppError::Render(reason)) => {
                    skipped.push((Some(report.code.clone()), title, reason))
                }
                Err(e) => return Err(e),
            }
        }

        for (report, title, reason) in skipped {
            self.skip_plot(report.as_deref(), title, reason);
        }
        info!(
            "{}: {} plots written to {}",
            self.definition.name,
            written.len(),
            output_dir.display()
        );
        Ok(written)
    }

    /// Render one progress plot per plot entry across all analysed reports
    ///
    /// Written under `<output_dir>/progress/`; needs at least two reports
    /// holding the analysis.
    pub fn generate_progress_plots(
        &mut self,
        output_dir: &Path,
        plot_settings: &PlotSettings,
        grouping: TrendGrouping,
    ) -> AppResult<Vec<PathBuf>> {
        self.skipped_plots
            .retain(|s| !s.entry.ends_with(PROGRESS_SKIP_SUFFIX));
        let extension = plot_settings.image_format.extension();
        let progress_dir = output_dir.join(PROGRESS_DIR);
        let mut written = Vec::new();
        let mut skipped = Vec::new();

        for plot in &self.definition.plots {
            let entry = self.plot_analysis(plot)?;
            let chart = match build_trend(
                plot,
                entry,
                &self.results,
                grouping,
                self.settings.normalization_window_seconds,
            ) {
                Ok(chart) => chart,
                Err(AppError::Render(reason)) => {
                    skipped.push((progress_title(&plot.title_for(entry)), reason));
                    continue;
                }
                Err(e) => return Err(e),
            };

            let path = progress_dir.join(chart.filename(extension));
            match plotting::save_figure(&chart, &path, plot_settings) {
                Ok(()) => written.push(path),
                Err(AppError::Render(reason)) => skipped.push((progress_title(&chart.title), reason)),
                Err(e) => return Err(e),
            }
        }

        for (title, reason) in skipped {
            self.skip_plot(None, title, reason);
        }
        Ok(written)
    }
}
