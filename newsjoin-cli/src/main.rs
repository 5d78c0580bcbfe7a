//! Newsjoin CLI: ingestion and join jobs.
//!
//! Commands:
//! - `ingest`: fetch index history from Yahoo Finance into the index collection
//! - `join`: join news articles with the gap-filled index and replace the
//!   refined table
//!
//! Both commands read their settings from the environment (`MONGO_URI`,
//! `POSTGRES_URI`, `TABLE`, `collection`, `TICKER`, `PERIOD`). Log verbosity
//! follows `RUST_LOG`, defaulting to `info`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use newsjoin_core::data::YahooProvider;
use newsjoin_core::store::{MongoStore, ParquetSink, PostgresSink, TableSink};
use newsjoin_core::Config;
use newsjoin_runner::{run_ingest, run_join};

#[derive(Parser)]
#[command(
    name = "newsjoin",
    about = "Newsjoin CLI: news articles joined with daily index values"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch index history and append it to the index collection.
    Ingest,
    /// Join articles with the gap-filled index and replace the refined table.
    Join {
        /// Write the refined table as `{dir}/{table}.parquet` instead of
        /// replacing the Postgres table.
        #[arg(long, value_name = "DIR")]
        parquet_out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("reading configuration")?;

    match cli.command {
        Commands::Ingest => ingest_cmd(&config),
        Commands::Join { parquet_out } => join_cmd(&config, parquet_out),
    }
}

fn ingest_cmd(config: &Config) -> Result<()> {
    let provider = YahooProvider::new().context("building market data client")?;
    let store = MongoStore::connect(&config.mongo_uri).context("connecting to MongoDB")?;

    let summary = run_ingest(config, &provider, &store)?;
    info!(
        ticker = %summary.ticker,
        period = %summary.period,
        fetched = summary.rows_fetched,
        inserted = summary.rows_inserted,
        first = ?summary.first_date,
        last = ?summary.last_date,
        "Ingestion finished"
    );
    Ok(())
}

fn join_cmd(config: &Config, parquet_out: Option<PathBuf>) -> Result<()> {
    let store = MongoStore::connect(&config.mongo_uri).context("connecting to MongoDB")?;
    let mut sink: Box<dyn TableSink> = match parquet_out {
        Some(dir) => Box::new(ParquetSink::new(dir)),
        None => Box::new(
            PostgresSink::connect(&config.postgres_uri).context("connecting to Postgres")?,
        ),
    };

    let summary = run_join(config, &store, sink.as_mut())?;
    info!(
        table = %summary.table,
        articles = summary.articles_read,
        dropped = summary.articles_dropped(),
        bars = summary.bars_read,
        filled_days = summary.filled_days,
        introduced_days = summary.introduced_days,
        rows = summary.rows_written,
        "Join finished"
    );
    Ok(())
}
