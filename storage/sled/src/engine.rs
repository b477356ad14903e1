use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sled::{Config, Db};
use tablekv_storage_common::{ConfigError, Schema, Table, TableOptions, options::KEY_SEPARATOR};

use crate::{error::SledError, store::SledStore};

const TABLE_CONFIG_TREE: &str = "table_config";

/// What a table was created with, persisted so reopening can be checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRecord {
    pub options: TableOptions,
    pub schema: Schema,
}

pub struct SledStorageEngine {
    pub db: Db,
    table_config_tree: sled::Tree,
}

impl SledStorageEngine {
    pub fn with_homedir_folder(folder_name: &str) -> anyhow::Result<Self> {
        let dir = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Failed to get home directory"))?.join(folder_name);

        Self::with_path(dir)
    }

    pub fn with_path(path: PathBuf) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&path)?;
        let dbpath = path.join("sled");
        let db = sled::open(&dbpath)?;
        Self::open(db)
    }

    pub fn new() -> anyhow::Result<Self> { Self::with_homedir_folder(".tablekv") }

    pub fn new_test() -> anyhow::Result<Self> {
        let db = Config::new().temporary(true).flush_every_ms(None).open()?;
        Self::open(db)
    }

    fn open(db: Db) -> anyhow::Result<Self> {
        let table_config_tree = db.open_tree(TABLE_CONFIG_TREE)?;
        Ok(Self { db, table_config_tree })
    }

    /// Open (creating on first use) the table described by `options`.
    ///
    /// Fails with [`ConfigError::Mismatch`] when the table already exists with
    /// different options or schema.
    pub fn open_table(&self, options: TableOptions, schema: Schema) -> Result<Table<SledStore>, SledError> {
        options.validate(&schema)?;
        let record = TableRecord { options, schema };
        let key = table_key(&record.options);
        let bytes = bincode::serialize(&record)?;

        // first writer wins; later opens must match it
        if let Err(cas) = self.table_config_tree.compare_and_swap(&key, None::<&[u8]>, Some(bytes.as_slice()))? {
            let existing: TableRecord = cas.current.as_deref().map(bincode::deserialize).transpose()?.ok_or_else(|| {
                ConfigError::Mismatch(String::from_utf8_lossy(&key).into_owned())
            })?;
            if existing != record {
                return Err(ConfigError::Mismatch(String::from_utf8_lossy(&key).into_owned()).into());
            }
        }

        let tree = self.db.open_tree(format!("table_{}", String::from_utf8_lossy(&key)))?;
        tracing::debug!(table = %record.options.name, prefix = %record.options.prefix, "opened table");
        Ok(Table::new(record.options, record.schema, SledStore::new(self.db.clone(), tree))?)
    }

    /// Every table opened in this database so far.
    pub fn list_tables(&self) -> Result<Vec<TableRecord>, SledError> {
        let mut tables = Vec::new();
        for item in self.table_config_tree.iter() {
            let (key, bytes) = item?;
            match bincode::deserialize::<TableRecord>(&bytes) {
                Ok(record) => tables.push(record),
                Err(e) => tracing::warn!(key = %String::from_utf8_lossy(&key), "skipping unreadable table config: {e}"),
            }
        }
        Ok(tables)
    }
}

fn table_key(options: &TableOptions) -> Vec<u8> { format!("{}{}{}", options.prefix, KEY_SEPARATOR, options.name).into_bytes() }
