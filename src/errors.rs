use thiserror::Error;

/// Application-wide error type - single point of truth
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed boss definition, analysis entry or plot entry
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Authentication, rate-limit and transport failures from the log API
    #[error("Data fetch error: {0}")]
    DataFetch(ApiError),

    /// Fetched data is missing fields or has the wrong shape
    #[error("Data shape error: {0}")]
    DataShape(String),

    /// No fight of the report survived encounter, difficulty and wipe-cutoff filtering
    #[error("No qualifying fights in report {report} for '{analysis}'")]
    NoQualifyingFights { report: String, analysis: String },

    /// Plot layout or drawing failure
    #[error("Render error: {0}")]
    Render(String),

    /// File I/O operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loader failures (config.toml, environment)
    #[error("Config loading error: {0}")]
    Config(#[from] config::ConfigError),

    /// CSV export
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Log API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Credentials rejected or token could not be obtained
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Server asked us to slow down
    #[error("Rate limit exceeded (retry after {retry_after:?}s)")]
    RateLimited { retry_after: Option<u64> },

    /// Non-success HTTP status
    #[error("Request failed with status {status}: {message}")]
    RequestFailed { status: u16, message: String },

    /// Connection-level failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// GraphQL `errors` array in an otherwise successful response
    #[error("GraphQL error: {}", .0.join("; "))]
    GraphQl(Vec<String>),

    /// Request did not complete within the configured timeout
    #[error("Request timeout: {timeout_seconds}s")]
    Timeout { timeout_seconds: u64 },

    /// Retry limit exceeded for a transient failure
    #[error("Max retries exceeded: {operation}")]
    MaxRetriesExceeded { operation: String },

    /// Response body parsed but did not contain the expected fields
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl ApiError {
    /// Whether a retry with backoff may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ApiError::RateLimited { .. } | ApiError::Transport(_) | ApiError::Timeout { .. }
        ) || matches!(self, ApiError::RequestFailed { status, .. } if *status >= 500)
    }
}

/// Application-wide result type - single point of truth
pub type AppResult<T> = Result<T, AppError>;

/// Result type for log API operations
pub type ApiResult<T> = Result<T, ApiError>;

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::MalformedResponse(message) => AppError::DataShape(message),
            other => AppError::DataFetch(other),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::DataShape(format!("JSON error: {}", err))
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Configuration(format!("Boss definition parse error: {}", err))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::MalformedResponse(err.to_string())
    }
}
