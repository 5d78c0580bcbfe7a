//! Newsjoin Core: records, provider, stores, and the date-alignment join.
//!
//! This crate contains everything the two jobs are built from:
//! - Domain records (news article, index bar, refined row) and BSON decoding
//! - Market-data provider trait with a Yahoo Finance implementation
//! - Calendar gap-fill, article ⋈ index merge, and the flatten/rename reshape
//! - Store capability traits with MongoDB, Postgres, Parquet and in-memory
//!   adapters
//! - The refined table's column contract
//! - Environment-driven configuration

pub mod config;
pub mod data;
pub mod domain;
pub mod schema;
pub mod store;

pub use config::{CollectionRef, Config, ConfigError, Period};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: records and adapters can cross thread boundaries.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Article>();
        require_sync::<domain::Article>();
        require_send::<domain::IndexBar>();
        require_sync::<domain::IndexBar>();
        require_send::<domain::RefinedRow>();
        require_sync::<domain::RefinedRow>();
        require_send::<config::Config>();
        require_sync::<config::Config>();

        require_send::<data::YahooProvider>();
        require_sync::<data::YahooProvider>();
        require_send::<store::MongoStore>();
        require_sync::<store::MongoStore>();
        require_send::<store::MemoryDocumentStore>();
        require_sync::<store::MemoryDocumentStore>();
    }

    /// Architecture contract: the join transform is store-agnostic.
    ///
    /// `refine` takes plain documents, so it cannot reach a store handle.
    #[test]
    fn refine_takes_documents_not_stores() {
        fn _check(
            articles: &[bson::Document],
            bars: &[bson::Document],
        ) -> Result<data::Refined, data::JoinError> {
            data::refine(articles, bars)
        }
    }
}
