//! Ingestion job: provider history → index collection.
//!
//! One fetch, one batch insert. The job never reads or deletes what is
//! already stored, so running it twice stores every bar twice.

use chrono::NaiveDate;
use tracing::info;

use newsjoin_core::config::Period;
use newsjoin_core::data::{DataError, MarketDataProvider};
use newsjoin_core::store::DocumentStore;
use newsjoin_core::Config;

use crate::error::JobError;

/// What an ingestion run did.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestSummary {
    pub ticker: String,
    pub period: Period,
    pub provider: String,
    pub rows_fetched: usize,
    pub rows_inserted: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

/// Fetch `config.ticker` over `config.period` and append every bar to
/// `config.index`. An invalid period fails before the provider is called.
pub fn run_ingest(
    config: &Config,
    provider: &dyn MarketDataProvider,
    store: &dyn DocumentStore,
) -> Result<IngestSummary, JobError> {
    let period = config.period()?;
    info!(
        ticker = %config.ticker,
        period = %period,
        provider = provider.name(),
        "Fetching index history"
    );
    let fetched = provider.history(&config.ticker, period)?;
    if fetched.bars.is_empty() {
        return Err(DataError::SymbolNotFound {
            symbol: config.ticker.clone(),
        }
        .into());
    }
    info!(rows = fetched.bars.len(), "Fetched index history");

    let docs = fetched.bars.iter().map(|bar| bar.to_document()).collect();
    info!(target_collection = %config.index, "Inserting index rows");
    let inserted = store.insert_many(&config.index, docs)?;
    info!(rows = inserted, "Inserted index rows");

    Ok(IngestSummary {
        ticker: config.ticker.clone(),
        period,
        provider: provider.name().to_string(),
        rows_fetched: fetched.bars.len(),
        rows_inserted: inserted,
        first_date: fetched.bars.iter().map(|b| b.date).min(),
        last_date: fetched.bars.iter().map(|b| b.date).max(),
    })
}
