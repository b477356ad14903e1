//! [`tablekv_storage_common`] tables persisted in [Sled](https://docs.rs/sled).
//!
//! Each table lives in its own tree; the engine remembers the options every
//! table was created with.

mod engine;
mod error;
mod store;

pub use engine::{SledStorageEngine, TableRecord};
pub use error::{SledError, sled_error};
pub use store::SledStore;
pub use tablekv_storage_common as common;

/// A table backed by sled.
pub type SledTable = tablekv_storage_common::Table<SledStore>;
