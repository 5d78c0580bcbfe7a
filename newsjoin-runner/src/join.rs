//! Join job: articles ⋈ gap-filled index → refined table.
//!
//! Three stages, each logged: extract both collections, refine in memory,
//! replace the output table. Nothing is written until refining succeeds.

use tracing::info;

use newsjoin_core::data::refine;
use newsjoin_core::store::{DocumentStore, TableSink};
use newsjoin_core::Config;

use crate::error::JobError;

/// What a join run did.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinSummary {
    pub table: String,
    pub articles_read: usize,
    pub bars_read: usize,
    /// Calendar days in the gap-filled index.
    pub filled_days: usize,
    /// Days that had no stored bar and were forward-filled.
    pub introduced_days: usize,
    pub rows_written: usize,
}

impl JoinSummary {
    /// Articles that fell outside the index date range.
    pub fn articles_dropped(&self) -> usize {
        self.articles_read.saturating_sub(self.rows_written)
    }
}

pub fn run_join(
    config: &Config,
    store: &dyn DocumentStore,
    sink: &mut dyn TableSink,
) -> Result<JoinSummary, JobError> {
    info!(articles = %config.articles, index = %config.index, "Getting data from document store");
    let article_docs = store.fetch_all(&config.articles)?;
    let bar_docs = store.fetch_all(&config.index)?;
    info!(
        articles = article_docs.len(),
        bars = bar_docs.len(),
        "Got data from document store"
    );

    info!("Processing data");
    let refined = refine(&article_docs, &bar_docs)?;
    info!(
        rows = refined.rows.len(),
        filled_days = refined.filled_days,
        introduced_days = refined.introduced_days,
        "Processed data"
    );

    info!(table = %config.refined_table, "Loading refined rows");
    let written = sink.replace_table(&config.refined_table, &refined.rows)?;
    info!(table = %config.refined_table, rows = written, "Loaded refined rows");

    Ok(JoinSummary {
        table: config.refined_table.clone(),
        articles_read: refined.articles_read,
        bars_read: refined.bars_read,
        filled_days: refined.filled_days,
        introduced_days: refined.introduced_days,
        rows_written: written,
    })
}
