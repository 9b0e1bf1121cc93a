use crate::analysis::{default_registry, OutputFormat, ReportFormatter, ReportSource};
use crate::analyzer::GuildLogAnalyzer;
use crate::api::{ResponseCache, WarcraftLogsClient, WclDataSource};
use crate::config::AppConfig;
use crate::errors::{AppError, AppResult};
use crate::plotting::TrendGrouping;
use clap::Args;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::info;

/// Parse output format string to OutputFormat enum
fn parse_format(format_str: &str) -> OutputFormat {
    match format_str.to_lowercase().as_str() {
        "json" => OutputFormat::Json,
        _ => OutputFormat::Console,
    }
}

fn parse_grouping(grouping: &str) -> AppResult<TrendGrouping> {
    match grouping.to_lowercase().as_str() {
        "player" => Ok(TrendGrouping::Player),
        "role" => Ok(TrendGrouping::Role),
        other => Err(AppError::Configuration(format!(
            "unknown progress grouping '{}' (expected player or role)",
            other
        ))),
    }
}

/// Accept bare codes as well as report URLs pasted from the browser
fn report_code(input: &str) -> String {
    let trimmed = input.trim().trim_end_matches('/');
    match trimmed.rsplit_once("/reports/") {
        Some((_, rest)) => rest
            .split(['#', '?', '/'])
            .next()
            .unwrap_or(rest)
            .to_string(),
        None => trimmed.to_string(),
    }
}

/// Analyse reports for one boss and write its plots
#[derive(Args)]
pub struct AnalyseCommand {
    /// Report codes (or report URLs) to analyse
    #[arg(long, num_args = 1.., required = true)]
    pub reports: Vec<String>,

    /// Boss key, see list-bosses
    #[arg(long)]
    pub boss: String,

    /// Also write progress plots across all reports
    #[arg(long)]
    pub progress_plots: bool,

    /// Progress plot series: player or role
    #[arg(long, default_value = "player")]
    pub progress_grouping: String,

    /// Plot directory (defaults to output.directory from config.toml)
    #[arg(long, short = 'o')]
    pub output_dir: Option<PathBuf>,

    /// Summary format: console or json
    #[arg(long, default_value = "console")]
    pub format: String,

    /// Write every result value to this CSV file
    #[arg(long)]
    pub export_csv: Option<PathBuf>,

    /// Keep API responses in memory only
    #[arg(long)]
    pub no_cache: bool,
}

impl AnalyseCommand {
    pub fn run(&self, config: &AppConfig) -> AppResult<()> {
        let grouping = parse_grouping(&self.progress_grouping)?;
        let registry = default_registry()?;
        // Fail on a bad boss key before any request is made
        registry.create(&self.boss)?;

        let cache = if self.no_cache {
            ResponseCache::in_memory()
        } else {
            ResponseCache::from_config(&config.cache)
        };
        let client = WarcraftLogsClient::new(config.api.clone(), cache)?;
        let source: Rc<dyn ReportSource> = Rc::new(WclDataSource::new(client));

        let codes: Vec<String> = self.reports.iter().map(|r| report_code(r)).collect();
        let mut analyzer = GuildLogAnalyzer::new(registry, source, config.analysis_settings())
            .with_progress_grouping(grouping);
        let summary = analyzer.analyze(&self.boss, &codes)?;

        let output_dir = self
            .output_dir
            .clone()
            .unwrap_or_else(|| config.output.directory.clone());
        let plot_settings = config.plot_settings();
        let written =
            analyzer.generate_plots(&self.boss, &output_dir, &plot_settings, self.progress_plots)?;
        info!("{} plots written", written.len());

        let Some(analysis) = analyzer.analysis(&self.boss) else {
            return Ok(());
        };
        let output = ReportFormatter::format_run(
            &summary,
            analysis.results(),
            analysis.skipped_plots(),
            &parse_format(&self.format),
        )?;
        print!("{}", output);

        if let Some(csv_path) = &self.export_csv {
            let lines = ReportFormatter::export_csv(analysis.results(), csv_path)?;
            eprintln!("{} values exported to: {}", lines, csv_path.display());
        }
        for path in &written {
            eprintln!("Plot written to: {}", path.display());
        }
        Ok(())
    }
}
