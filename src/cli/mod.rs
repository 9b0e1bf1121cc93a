use crate::config::AppConfig;
use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

pub mod commands;

/// Guild raid log analyser
#[derive(Parser)]
#[command(name = "guild-log-analysis")]
#[command(about = "Per-player raid encounter metrics from Warcraft Logs, rendered as table plots")]
#[command(version)]
pub struct Cli {
    /// Log progress at info level
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Log at debug level, including API requests
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Analyse reports for one boss and write table plots
    Analyse(commands::analyse::AnalyseCommand),
    /// List the registered bosses
    ListBosses(commands::bosses::ListBossesCommand),
    /// Delete the API response cache
    ClearCache(commands::cache::ClearCacheCommand),
}

impl Cli {
    /// Filter used when RUST_LOG is not set
    fn default_filter<'a>(&self, configured: &'a str) -> &'a str {
        if self.debug {
            "debug"
        } else if self.verbose {
            "info"
        } else {
            configured
        }
    }
}

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load().context("failed to load configuration")?;

    // Logs go to stderr so JSON output on stdout stays parseable
    let fallback = cli.default_filter(&config.logging.level).to_string();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .try_init();

    match cli.command {
        Commands::Analyse(command) => command.run(&config)?,
        Commands::ListBosses(command) => command.run()?,
        Commands::ClearCache(command) => command.run(&config)?,
    }
    Ok(())
}
