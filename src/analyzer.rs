//! Analyzer facade: one entry point for every registered boss
//!
//! Bosses are addressed by their registry key instead of per-boss methods.
//! Each analysed boss keeps its own [`BossAnalysis`] so plots can be rendered
//! after the run.

use crate::analysis::{BossAnalysis, BossRegistry, ReportSource};
use crate::config::{AnalysisSettings, PlotSettings};
use crate::errors::{AppError, AppResult};
use crate::plotting::TrendGrouping;
use crate::types::RunSummary;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::info;

pub struct GuildLogAnalyzer {
    registry: BossRegistry,
    source: Rc<dyn ReportSource>,
    settings: AnalysisSettings,
    progress_grouping: TrendGrouping,
    analyses: HashMap<String, BossAnalysis>,
}

impl GuildLogAnalyzer {
    pub fn new(
        registry: BossRegistry,
        source: Rc<dyn ReportSource>,
        settings: AnalysisSettings,
    ) -> Self {
        Self {
            registry,
            source,
            settings,
            progress_grouping: TrendGrouping::default(),
            analyses: HashMap::new(),
        }
    }

    pub fn with_progress_grouping(mut self, grouping: TrendGrouping) -> Self {
        self.progress_grouping = grouping;
        self
    }

    /// Registered boss keys in registration order
    pub fn boss_keys(&self) -> Vec<String> {
        self.registry.keys().map(str::to_string).collect()
    }

    pub fn registry(&self) -> &BossRegistry {
        &self.registry
    }

    /// Analyse `report_codes` for one boss, replacing earlier results for it
    ///
    /// Earlier results are dropped even when the new run fails.
    pub fn analyze(&mut self, boss_key: &str, report_codes: &[String]) -> AppResult<RunSummary> {
        self.analyses.remove(boss_key);
        let definition = self.registry.create(boss_key)?;
        info!(
            "Running {} ({} reports)",
            definition.name,
            report_codes.len()
        );

        let mut analysis =
            BossAnalysis::new(definition, Rc::clone(&self.source), self.settings.clone());
        let summary = analysis.analyze(report_codes)?;
        self.analyses.insert(boss_key.to_string(), analysis);
        Ok(summary)
    }

    /// Results of the last run for `boss_key`, if any
    pub fn analysis(&self, boss_key: &str) -> Option<&BossAnalysis> {
        self.analyses.get(boss_key)
    }

    /// Render table plots, plus progress plots when asked, for an analysed boss
    pub fn generate_plots(
        &mut self,
        boss_key: &str,
        output_dir: &Path,
        plot_settings: &PlotSettings,
        include_progress: bool,
    ) -> AppResult<Vec<PathBuf>> {
        let grouping = self.progress_grouping;
        let analysis = self.analyses.get_mut(boss_key).ok_or_else(|| {
            AppError::Configuration(format!(
                "boss '{}' has not been analysed in this run",
                boss_key
            ))
        })?;

        let mut written = analysis.generate_plots(output_dir, plot_settings)?;
        if include_progress {
            written.extend(analysis.generate_progress_plots(output_dir, plot_settings, grouping)?);
        }
        Ok(written)
    }
}
