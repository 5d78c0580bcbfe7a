//! Store adapters.
//!
//! Jobs see storage only through two capability traits:
//! - [`DocumentStore`]: read a whole collection, append a batch of documents
//! - [`TableSink`]: replace a relational table with a batch of refined rows
//!
//! Production adapters talk to MongoDB, Postgres and Parquet files; the
//! in-memory ones back the job tests.

pub mod memory;
pub mod mongo;
pub mod parquet;
pub mod postgres;

pub use self::memory::{MemoryDocumentStore, MemoryTableSink};
pub use self::mongo::MongoStore;
pub use self::parquet::ParquetSink;
pub use self::postgres::PostgresSink;

use crate::config::CollectionRef;
use crate::domain::RefinedRow;
use bson::Document;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document store error: {0}")]
    Document(#[from] mongodb::error::Error),

    #[error("relational store error: {0}")]
    Relational(#[from] ::postgres::Error),

    #[error("parquet error: {0}")]
    Parquet(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("refusing to insert an empty batch into {0}")]
    EmptyBatch(String),

    #[error("store error: {0}")]
    Other(String),
}

/// Whole-collection reads and batch appends against a document database.
pub trait DocumentStore: Send + Sync {
    /// Every document of `collection`, in natural (storage) order.
    fn fetch_all(&self, collection: &CollectionRef) -> Result<Vec<Document>, StoreError>;

    /// Append `docs` in one batch. Returns the number inserted.
    ///
    /// Existing documents are never touched, so repeating a batch stores it
    /// twice. An empty batch is an error.
    fn insert_many(
        &self,
        collection: &CollectionRef,
        docs: Vec<Document>,
    ) -> Result<usize, StoreError>;
}

/// Destination for the refined table.
pub trait TableSink {
    /// Drop `table` if present and recreate it from `rows`, in row order.
    /// Returns the number of rows written.
    fn replace_table(&mut self, table: &str, rows: &[RefinedRow]) -> Result<usize, StoreError>;
}
