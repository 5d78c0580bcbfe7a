//! Newsjoin Runner: the ingestion and join jobs.
//!
//! This crate builds on `newsjoin-core` to provide:
//! - `run_ingest()`: provider history into the index collection
//! - `run_join()`: articles joined with the gap-filled index into the
//!   refined table
//!
//! Both jobs take their stores as trait objects, so the CLI passes the real
//! adapters and tests pass in-memory ones.

pub mod error;
pub mod ingest;
pub mod join;

pub use error::JobError;
pub use ingest::{run_ingest, IngestSummary};
pub use join::{run_join, JoinSummary};
