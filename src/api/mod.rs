//! Warcraft Logs API integration
//!
//! - **client** - HTTP GraphQL client with OAuth, retries and rate limiting
//! - **cache** - file-backed response cache
//! - **retry** - backoff, rate limiter and timeout helpers
//! - **source** - [`ReportSource`](crate::analysis::ReportSource) over any GraphQL transport
//! - **queries** - the GraphQL documents
//!
//! The client owns a current-thread tokio runtime and blocks on each request,
//! so everything above this module stays synchronous.

pub mod cache;
pub mod client;
pub mod queries;
pub mod retry;
pub mod source;

pub use cache::{CacheStats, ResponseCache};
pub use client::WarcraftLogsClient;
pub use retry::{calculate_next_backoff, execute_with_timeout, RateLimiter};
pub use source::WclDataSource;

use crate::errors::ApiResult;
use serde_json::Value;

/// Executes one GraphQL request and returns the full response document
pub trait GraphQlTransport {
    fn execute(&self, query: &str, variables: &Value) -> ApiResult<Value>;
}

impl<T: GraphQlTransport + ?Sized> GraphQlTransport for &T {
    fn execute(&self, query: &str, variables: &Value) -> ApiResult<Value> {
        (**self).execute(query, variables)
    }
}
