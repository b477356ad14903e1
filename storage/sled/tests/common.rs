use tablekv_storage_common::{Record, Row, Schema, TableOptions, Value, ValueType, record};
use tablekv_storage_sled::{SledStorageEngine, SledTable};

use std::str::FromStr;
use tracing::Level;

// Initialize tracing for tests
#[ctor::ctor]
fn init_tracing() {
    // if LOG_LEVEL env var is set, use it
    if let Ok(level) = std::env::var("LOG_LEVEL") {
        tracing_subscriber::fmt().with_max_level(Level::from_str(&level).unwrap()).with_test_writer().init();
    } else {
        tracing_subscriber::fmt().with_max_level(Level::INFO).with_test_writer().init();
    }
}

pub fn album_schema() -> Schema { Schema::new().field("name", ValueType::String).field("year", ValueType::String) }

pub fn album_options() -> TableOptions { TableOptions::new("test", "album").primary("name").index("year") }

#[allow(unused)]
pub fn setup_albums(engine: &SledStorageEngine, albums: &[(&str, &str)]) -> Result<SledTable, anyhow::Error> {
    let table = engine.open_table(album_options(), album_schema())?;
    for (name, year) in albums {
        table.insert(record([("name", *name), ("year", *year)]))?;
    }
    Ok(table)
}

#[allow(unused)]
pub fn album(name: &str, year: &str) -> Record { record([("name", Value::from(name)), ("year", Value::from(year))]) }

pub fn names(rows: &[Row<Record>]) -> Vec<String> {
    rows.iter()
        .map(|row| match &row.payload["name"] {
            Value::String(s) => s.clone(),
            other => panic!("unexpected name {other:?}"),
        })
        .collect()
}
