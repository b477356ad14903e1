//! Secondary-index queries over tables kept in an ordered key-value store.
//!
//! A table stores full rows under its primary prefix and, for each secondary
//! index, a pointer (the primary key) under a composite key
//! `index prefix ++ index value ++ 0x00 ++ primary key`. [`Query`] turns
//! "rows of index X matching filter F, after anchor row R, N at a time" into a
//! single bounded range scan and resolves the results back into rows.
//!
//! The engine is generic over the [`Tabler`] capability set and the
//! [`OrderedStore`] it scans; [`Table`] and [`mem::MemStore`] are the
//! built-in implementations.

pub mod bounds;
pub mod error;
#[cfg(any(test, feature = "in-memory"))]
pub mod mem;
pub mod options;
pub mod prefix;
pub mod query;
pub mod schema;
pub mod table;
pub mod traits;
pub mod types;
pub mod value;

pub use error::*;
pub use options::TableOptions;
pub use query::{Query, ScanPath};
pub use schema::{FieldDef, Record, Schema, record};
pub use table::Table;
pub use traits::*;
pub use types::*;
pub use value::{Value, ValueType};

#[cfg(test)]
#[ctor::ctor]
fn init_tracing() {
    use std::str::FromStr;
    let level = std::env::var("LOG_LEVEL").ok().and_then(|l| tracing::Level::from_str(&l).ok()).unwrap_or(tracing::Level::INFO);
    let _ = tracing_subscriber::fmt().with_max_level(level).with_test_writer().try_init();
}
