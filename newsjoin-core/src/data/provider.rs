//! Market-data provider trait and structured error types.
//!
//! The MarketDataProvider trait abstracts over data sources so the ingestion
//! job can run against Yahoo Finance in production and a stub in tests.

use crate::config::Period;
use crate::domain::IndexBar;
use thiserror::Error;

/// Structured error types for provider operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("provider refused the request: {0}")]
    Forbidden(String),

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("data error: {0}")]
    Other(String),
}

/// Result of a successful history fetch.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub ticker: String,
    pub period: Period,
    /// One bar per trading day, ascending by date.
    pub bars: Vec<IndexBar>,
}

/// Trait for market-data providers.
///
/// A fetch is a single attempt: failures are returned, never retried.
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily bars for `ticker` over the trailing `period`.
    fn history(&self, ticker: &str, period: Period) -> Result<FetchResult, DataError>;
}
