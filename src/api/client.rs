use super::cache::{CacheStats, ResponseCache};
use super::retry::{calculate_next_backoff, execute_with_timeout, RateLimiter};
use super::GraphQlTransport;
use crate::config::ApiConfig;
use crate::errors::{ApiError, ApiResult};
use reqwest::header::RETRY_AFTER;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use std::cell::{Cell, RefCell};
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

const USER_AGENT: &str = concat!("guild-log-analysis/", env!("CARGO_PKG_VERSION"));

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Blocking Warcraft Logs GraphQL client with caching, retries and rate limiting
pub struct WarcraftLogsClient {
    config: ApiConfig,
    http: reqwest::Client,
    runtime: Runtime,
    token: RefCell<Option<String>>,
    cache: RefCell<ResponseCache>,
    limiter: RateLimiter,
    error_count: Cell<u64>,
}

impl WarcraftLogsClient {
    /// Build a client; fails early when no credentials are configured
    pub fn new(config: ApiConfig, cache: ResponseCache) -> ApiResult<Self> {
        let has_client_credentials = config.client_id.is_some() && config.client_secret.is_some();
        if config.access_token.is_none() && !has_client_credentials {
            return Err(ApiError::Authentication(
                "no credentials configured (set WCL_CLIENT_ID and WCL_CLIENT_SECRET, or WCL_ACCESS_TOKEN)"
                    .to_string(),
            ));
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ApiError::Transport(format!("Failed to start runtime: {}", e)))?;
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ApiError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        info!("Warcraft Logs client ready ({})", config.url);
        Ok(Self {
            token: RefCell::new(config.access_token.clone()),
            limiter: RateLimiter::new(Duration::from_millis(config.min_request_interval_ms)),
            config,
            http,
            runtime,
            cache: RefCell::new(cache),
            error_count: Cell::new(0),
        })
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.borrow().stats()
    }

    /// Failed HTTP attempts, including ones that succeeded on retry
    pub fn error_count(&self) -> u64 {
        self.error_count.get()
    }

    async fn bearer_token(&self) -> ApiResult<String> {
        if let Some(token) = self.token.borrow().clone() {
            return Ok(token);
        }
        let token = self.fetch_token().await?;
        *self.token.borrow_mut() = Some(token.clone());
        Ok(token)
    }

    /// OAuth client-credentials exchange
    async fn fetch_token(&self) -> ApiResult<String> {
        let (Some(id), Some(secret)) = (&self.config.client_id, &self.config.client_secret) else {
            return Err(ApiError::Authentication("client credentials missing".to_string()));
        };
        debug!("Requesting access token from {}", self.config.token_url);

        let response = execute_with_timeout(self.config.timeout_seconds, async {
            self.http
                .post(&self.config.token_url)
                .basic_auth(id, Some(secret))
                .form(&[("grant_type", "client_credentials")])
                .send()
                .await
                .map_err(transport_error)
        })
        .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Authentication(format!(
                "token request failed with status {}: {}",
                status.as_u16(),
                body
            )));
        }
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Authentication(format!("invalid token response: {}", e)))?;
        info!("Obtained Warcraft Logs access token");
        Ok(token.access_token)
    }

    /// One HTTP round trip: status mapping plus GraphQL error extraction
    async fn post_once(&self, query: &str, variables: &Value) -> ApiResult<Value> {
        let token = self.bearer_token().await?;
        self.limiter.acquire().await;

        let body = json!({ "query": query, "variables": variables });
        let response = execute_with_timeout(self.config.timeout_seconds, async {
            self.http
                .post(&self.config.url)
                .bearer_auth(&token)
                .json(&body)
                .send()
                .await
                .map_err(transport_error)
        })
        .await?;

        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED => {
                return Err(ApiError::Authentication(
                    "API rejected the access token".to_string(),
                ))
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.trim().parse().ok());
                return Err(ApiError::RateLimited { retry_after });
            }
            s if !s.is_success() => {
                let message = response.text().await.unwrap_or_default();
                return Err(ApiError::RequestFailed {
                    status: s.as_u16(),
                    message,
                });
            }
            _ => {}
        }

        let document: Value = response.json().await.map_err(|e| {
            ApiError::MalformedResponse(format!("response is not JSON: {}", e))
        })?;
        graphql_errors(&document)?;
        Ok(document)
    }

    async fn post_with_retry(&self, query: &str, variables: &Value) -> ApiResult<Value> {
        let mut attempts = 0;
        let mut backoff = Duration::from_millis(self.config.initial_backoff_ms);

        loop {
            match self.post_once(query, variables).await {
                Ok(document) => {
                    if attempts > 0 {
                        debug!("Request succeeded after {} attempts", attempts + 1);
                    }
                    return Ok(document);
                }
                Err(e) if e.is_transient() => {
                    attempts += 1;
                    self.error_count.set(self.error_count.get() + 1);

                    if attempts >= self.config.max_retries {
                        error!("Request failed after {} attempts: {}", attempts, e);
                        return Err(match e {
                            ApiError::RateLimited { .. } | ApiError::Timeout { .. } => e,
                            _ => ApiError::MaxRetriesExceeded {
                                operation: operation_name(query),
                            },
                        });
                    }

                    let wait = match &e {
                        ApiError::RateLimited {
                            retry_after: Some(seconds),
                        } => Duration::from_secs(*seconds),
                        _ => backoff,
                    };
                    warn!(
                        "Attempt {} of {} failed, retrying in {:?}: {}",
                        attempts,
                        operation_name(query),
                        wait,
                        e
                    );
                    sleep(wait).await;
                    backoff = calculate_next_backoff(
                        backoff,
                        self.config.backoff_multiplier,
                        self.config.max_backoff_seconds,
                    );
                }
                Err(e) => {
                    self.error_count.set(self.error_count.get() + 1);
                    return Err(e);
                }
            }
        }
    }
}

impl GraphQlTransport for WarcraftLogsClient {
    fn execute(&self, query: &str, variables: &Value) -> ApiResult<Value> {
        if let Some(cached) = self.cache.borrow_mut().get(query, variables) {
            return Ok(cached);
        }
        let document = self
            .runtime
            .block_on(self.post_with_retry(query, variables))?;
        self.cache
            .borrow_mut()
            .insert(query, variables, document.clone());
        Ok(document)
    }
}

impl Drop for WarcraftLogsClient {
    fn drop(&mut self) {
        let stats = self.cache.borrow().stats();
        if stats.total_requests() > 0 {
            info!(
                "API cache: {} hits, {} misses ({:.1}% hit rate), {} failed attempts",
                stats.hits,
                stats.misses,
                stats.hit_rate(),
                self.error_count.get()
            );
        }
    }
}

fn transport_error(err: reqwest::Error) -> ApiError {
    ApiError::Transport(err.to_string())
}

/// First word after `query` in the document, for log messages
fn operation_name(query: &str) -> String {
    query
        .split_whitespace()
        .skip_while(|word| *word != "query")
        .nth(1)
        .map(|name| name.split('(').next().unwrap_or(name).to_string())
        .unwrap_or_else(|| "graphql".to_string())
}

/// Map a GraphQL `errors` array to [`ApiError::GraphQl`]
pub(crate) fn graphql_errors(document: &Value) -> ApiResult<()> {
    match document.get("errors").and_then(Value::as_array) {
        Some(errors) if !errors.is_empty() => Err(ApiError::GraphQl(
            errors
                .iter()
                .map(|e| {
                    e.get("message")
                        .and_then(Value::as_str)
                        .unwrap_or("Unknown error")
                        .to_string()
                })
                .collect(),
        )),
        _ => Ok(()),
    }
}
