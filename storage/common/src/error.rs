use thiserror::Error;

use crate::value::ValueType;

/// Failure of a read through the query engine.
#[derive(Error, Debug)]
pub enum QueryError {
    /// No rows matched, the anchor row is gone, or the anchor does not belong to the filter.
    #[error("not found")]
    NotFound,
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl QueryError {
    pub fn is_not_found(&self) -> bool { matches!(self, QueryError::NotFound) }

    /// Short label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            QueryError::NotFound => "not_found",
            QueryError::Schema(_) => "schema",
            QueryError::Storage(_) => "storage",
        }
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Backend error: {0}")]
    Backend(Box<dyn std::error::Error + Send + Sync + 'static>),
    #[error("Decode error: {0}")]
    Decode(#[from] bincode::Error),
    #[error("Lock poisoned")]
    Poisoned,
}

impl StorageError {
    pub fn backend<E: std::error::Error + Send + Sync + 'static>(err: E) -> Self { StorageError::Backend(Box::new(err)) }
}

impl From<bincode::Error> for QueryError {
    fn from(e: bincode::Error) -> Self { QueryError::Storage(StorageError::Decode(e)) }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Unknown field: {0}")]
    UnknownField(String),
    #[error("Missing field: {0}")]
    MissingField(String),
    #[error("Field {field} expects {expected:?}, found {found:?}")]
    TypeMismatch { field: String, expected: ValueType, found: ValueType },
    #[error("Table has no primary field (auto primary keys)")]
    NoPrimaryField,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Table {0} must not be empty")]
    Empty(&'static str),
    #[error("Table {what} {value:?} must not contain the key separator")]
    Separator { what: &'static str, value: String },
    #[error("Field {0} is not declared in the schema")]
    UnknownField(String),
    #[error("Index name {0:?} is reserved for the primary index")]
    ReservedIndexName(String),
    #[error("Index {0} is declared more than once")]
    DuplicateIndex(String),
    #[error("Table {0} was created with different options")]
    Mismatch(String),
}

/// Failure while writing rows into a table.
#[derive(Error, Debug)]
pub enum MutationError {
    #[error("Row already exists")]
    Duplicate(Vec<u8>),
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<bincode::Error> for MutationError {
    fn from(e: bincode::Error) -> Self { MutationError::Storage(StorageError::Decode(e)) }
}
