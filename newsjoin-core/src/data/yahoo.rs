//! Yahoo Finance data provider.
//!
//! Fetches daily OHLCV bars plus dividend and split events from Yahoo's v8
//! chart API for a trailing range (`1d`, `5d`, `1mo`, ...).
//!
//! Yahoo Finance has no official API and is subject to unannounced format
//! changes; parse failures surface as `ResponseFormatChanged`.

use super::provider::{DataError, FetchResult, MarketDataProvider};
use crate::config::Period;
use crate::domain::IndexBar;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::warn;

const CHART_BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    #[serde(default)]
    events: Events,
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    /// Exchange offset from UTC in seconds.
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Default, Deserialize)]
struct Events {
    #[serde(default)]
    dividends: HashMap<String, DividendEvent>,
    #[serde(default)]
    splits: HashMap<String, SplitEvent>,
}

#[derive(Debug, Deserialize)]
struct DividendEvent {
    amount: f64,
    date: i64,
}

#[derive(Debug, Deserialize)]
struct SplitEvent {
    numerator: f64,
    denominator: f64,
    date: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

/// Yahoo Finance data provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl YahooProvider {
    pub fn new() -> Result<Self, DataError> {
        Self::with_base_url(CHART_BASE_URL)
    }

    /// Provider pointed at a different chart endpoint.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn chart_url(&self, ticker: &str) -> String {
        format!("{}/{ticker}", self.base_url.trim_end_matches('/'))
    }

    /// Parse the chart API response into bars, ascending by date.
    fn parse_response(ticker: &str, resp: ChartResponse) -> Result<Vec<IndexBar>, DataError> {
        let result = resp.chart.result.ok_or_else(|| {
            if let Some(err) = resp.chart.error {
                if err.code == "Not Found" {
                    DataError::SymbolNotFound {
                        symbol: ticker.to_string(),
                    }
                } else {
                    DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
                }
            } else {
                DataError::ResponseFormatChanged("empty result with no error".into())
            }
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?;

        // A valid ticker with no trading days in range has no timestamps at all.
        let timestamps = data.timestamp.unwrap_or_default();

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

        let offset = data.meta.gmtoffset;
        let mut dividends: HashMap<NaiveDate, f64> = HashMap::new();
        for event in data.events.dividends.values() {
            dividends.insert(exchange_date(event.date, offset)?, event.amount);
        }
        let mut splits: HashMap<NaiveDate, f64> = HashMap::new();
        for event in data.events.splits.values() {
            if event.denominator != 0.0 {
                splits.insert(
                    exchange_date(event.date, offset)?,
                    event.numerator / event.denominator,
                );
            }
        }

        let mut bars = Vec::with_capacity(timestamps.len());

        for (i, &ts) in timestamps.iter().enumerate() {
            let date = exchange_date(ts, offset)?;

            let open = quote.open.get(i).copied().flatten();
            let high = quote.high.get(i).copied().flatten();
            let low = quote.low.get(i).copied().flatten();
            let close = quote.close.get(i).copied().flatten();
            let volume = quote.volume.get(i).copied().flatten();

            if open.is_none()
                && high.is_none()
                && low.is_none()
                && close.is_none()
                && volume.is_none()
            {
                warn!(%ticker, %date, "skipping row with no values");
                continue;
            }

            bars.push(IndexBar {
                date,
                open,
                high,
                low,
                close,
                volume,
                dividends: Some(dividends.get(&date).copied().unwrap_or(0.0)),
                stock_splits: Some(splits.get(&date).copied().unwrap_or(0.0)),
            });
        }

        if bars.is_empty() {
            return Err(DataError::SymbolNotFound {
                symbol: ticker.to_string(),
            });
        }

        Ok(bars)
    }

    fn fetch_once(&self, ticker: &str, period: Period) -> Result<Vec<IndexBar>, DataError> {
        let resp = self
            .client
            .get(self.chart_url(ticker))
            .query(&[
                ("range", period.as_str()),
                ("interval", "1d"),
                ("events", "div,splits"),
            ])
            .send()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;

        let status = resp.status();

        if status == reqwest::StatusCode::FORBIDDEN {
            return Err(DataError::Forbidden(format!("HTTP {status} for {ticker}")));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(DataError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(DataError::AuthenticationRequired(
                "Yahoo Finance requires authentication".into(),
            ));
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DataError::SymbolNotFound {
                symbol: ticker.to_string(),
            });
        }

        if !status.is_success() {
            warn!(%ticker, %status, "chart request failed");
            return Err(DataError::Other(format!("HTTP {status} for {ticker}")));
        }

        let chart: ChartResponse = resp.json().map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse response for {ticker}: {e}"))
        })?;

        Self::parse_response(ticker, chart)
    }
}

/// Calendar date of a UTC timestamp at the exchange's offset.
fn exchange_date(ts: i64, gmtoffset: i64) -> Result<NaiveDate, DataError> {
    chrono::DateTime::from_timestamp(ts + gmtoffset, 0)
        .map(|dt| dt.naive_utc().date())
        .ok_or_else(|| DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}")))
}

impl MarketDataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn history(&self, ticker: &str, period: Period) -> Result<FetchResult, DataError> {
        let bars = self.fetch_once(ticker, period)?;
        Ok(FetchResult {
            ticker: ticker.to_string(),
            period,
            bars,
        })
    }
}
