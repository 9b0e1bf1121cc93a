use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Application configuration loaded from config.toml or environment variables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub cache: CacheConfig,
    pub output: OutputConfig,
    pub analysis: AnalysisConfig,
    pub logging: LoggingConfig,
}

/// Warcraft Logs API access
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub url: String,
    pub token_url: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Pre-issued bearer token; skips the client-credentials exchange
    #[serde(default)]
    pub access_token: Option<String>,
    pub timeout_seconds: u64,
    pub max_retries: usize,
    pub initial_backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub max_backoff_seconds: u64,
    pub min_request_interval_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: "https://www.warcraftlogs.com/api/v2/client".to_string(),
            token_url: "https://www.warcraftlogs.com/oauth/token".to_string(),
            client_id: None,
            client_secret: None,
            access_token: None,
            timeout_seconds: 30,
            max_retries: 3,
            initial_backoff_ms: 1000,
            backoff_multiplier: 2.0,
            max_backoff_seconds: 30,
            min_request_interval_ms: 1000,
        }
    }
}

/// On-disk API response cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub enabled: bool,
    pub directory: PathBuf,
    /// Cache file is rotated once it grows past this size
    pub max_file_bytes: u64,
    pub max_rotated_files: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: PathBuf::from("./cache"),
            max_file_bytes: 10 * 1024 * 1024,
            max_rotated_files: 5,
        }
    }
}

/// Plot output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub dpi: u32,
    pub image_format: ImageFormat,
    #[serde(default)]
    pub font_file: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./plots"),
            dpi: 300,
            image_format: ImageFormat::Png,
            font_file: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Svg,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub default_difficulty: u32,
    pub default_wipe_cutoff: u32,
    pub normalization_window_seconds: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            default_difficulty: 5,
            default_wipe_cutoff: 4,
            normalization_window_seconds: 1800.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from config.toml file and environment variables
    /// Environment variables take precedence over file configuration
    pub fn load() -> Result<Self, ConfigError> {
        let api = ApiConfig::default();
        let cache = CacheConfig::default();
        let output = OutputConfig::default();
        let analysis = AnalysisConfig::default();

        let config = Config::builder()
            .set_default("api.url", api.url)?
            .set_default("api.token_url", api.token_url)?
            .set_default("api.timeout_seconds", api.timeout_seconds)?
            .set_default("api.max_retries", api.max_retries as i64)?
            .set_default("api.initial_backoff_ms", api.initial_backoff_ms)?
            .set_default("api.backoff_multiplier", api.backoff_multiplier)?
            .set_default("api.max_backoff_seconds", api.max_backoff_seconds)?
            .set_default("api.min_request_interval_ms", api.min_request_interval_ms)?
            .set_default("cache.enabled", cache.enabled)?
            .set_default("cache.directory", cache.directory.to_string_lossy().to_string())?
            .set_default("cache.max_file_bytes", cache.max_file_bytes)?
            .set_default("cache.max_rotated_files", cache.max_rotated_files as i64)?
            .set_default(
                "output.directory",
                output.directory.to_string_lossy().to_string(),
            )?
            .set_default("output.dpi", output.dpi as i64)?
            .set_default("output.image_format", output.image_format.extension())?
            .set_default(
                "analysis.default_difficulty",
                analysis.default_difficulty as i64,
            )?
            .set_default(
                "analysis.default_wipe_cutoff",
                analysis.default_wipe_cutoff as i64,
            )?
            .set_default(
                "analysis.normalization_window_seconds",
                analysis.normalization_window_seconds,
            )?
            .set_default("logging.level", LoggingConfig::default().level)?
            // Load from config.toml if it exists
            .add_source(File::with_name("config").required(false))
            // WCL_API__TIMEOUT_SECONDS style overrides
            .add_source(
                config::Environment::with_prefix("WCL")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let mut app_config: AppConfig = config.try_deserialize()?;

        // Credentials use flat names so they can be dropped into a .env file
        if let Ok(client_id) = env::var("WCL_CLIENT_ID") {
            app_config.api.client_id = Some(client_id);
        }
        if let Ok(client_secret) = env::var("WCL_CLIENT_SECRET") {
            app_config.api.client_secret = Some(client_secret);
        }
        if let Ok(token) = env::var("WCL_ACCESS_TOKEN") {
            app_config.api.access_token = Some(token);
        }

        if app_config.analysis.normalization_window_seconds <= 0.0 {
            return Err(ConfigError::Message(
                "analysis.normalization_window_seconds must be positive".to_string(),
            ));
        }

        Ok(app_config)
    }

    /// Get default config values for CLI argument defaults
    pub fn get_defaults() -> Self {
        Self::load().unwrap_or_else(|_| Self::default())
    }

    /// Settings consumed by the analysis engine
    pub fn analysis_settings(&self) -> AnalysisSettings {
        AnalysisSettings {
            default_difficulty: self.analysis.default_difficulty,
            default_wipe_cutoff: self.analysis.default_wipe_cutoff,
            normalization_window_seconds: self.analysis.normalization_window_seconds,
        }
    }

    /// Settings consumed by the plot renderers
    pub fn plot_settings(&self) -> PlotSettings {
        PlotSettings {
            dpi: self.output.dpi,
            image_format: self.output.image_format,
            font_file: self.output.font_file.clone(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            cache: CacheConfig::default(),
            output: OutputConfig::default(),
            analysis: AnalysisConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Explicit analysis parameters handed to the engine
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSettings {
    pub default_difficulty: u32,
    pub default_wipe_cutoff: u32,
    pub normalization_window_seconds: f64,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        AppConfig::default().analysis_settings()
    }
}

/// Explicit rendering parameters handed to the plot layer
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSettings {
    pub dpi: u32,
    pub image_format: ImageFormat,
    pub font_file: Option<PathBuf>,
}

impl PlotSettings {
    /// Pixel scale relative to a 100 dpi baseline
    pub fn scale(&self) -> f64 {
        (self.dpi.max(50) as f64) / 100.0
    }
}

impl Default for PlotSettings {
    fn default() -> Self {
        AppConfig::default().plot_settings()
    }
}
