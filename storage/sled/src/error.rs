use tablekv_storage_common::{ConfigError, MutationError, QueryError, StorageError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SledError {
    #[error("Storage error: {0}")]
    StorageError(#[from] sled::Error),
    #[error("Bincode error: {0}")]
    BincodeError(#[from] bincode::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl From<SledError> for StorageError {
    fn from(err: SledError) -> Self {
        match err {
            SledError::BincodeError(e) => StorageError::Decode(e),
            other => StorageError::backend(other),
        }
    }
}

impl From<SledError> for QueryError {
    fn from(err: SledError) -> Self { QueryError::Storage(err.into()) }
}

impl From<SledError> for MutationError {
    fn from(err: SledError) -> Self { MutationError::Storage(err.into()) }
}

pub fn sled_error(err: sled::Error) -> StorageError { StorageError::backend(err) }
