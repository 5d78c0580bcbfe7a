use newsjoin_core::data::{DataError, JoinError};
use newsjoin_core::store::StoreError;
use newsjoin_core::ConfigError;
use thiserror::Error;

/// Errors from either job. Every variant is fatal to the run.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("market data error: {0}")]
    Data(#[from] DataError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("join error: {0}")]
    Join(#[from] JoinError),
}
