use serde::{Deserialize, Serialize};

use crate::{
    error::ConfigError,
    schema::Schema,
    types::is_primary_alias,
};

/// Separator between key namespace segments.
pub const KEY_SEPARATOR: char = '-';

/// Key segment of the primary storage; no index may use it.
pub const PRIMARY_SEGMENT: &str = "data";

/// Static description of a table: where its keys live and what is indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOptions {
    /// Namespace shared by related tables.
    pub prefix: String,
    pub name: String,
    /// Field holding the primary key; `None` means auto-generated keys.
    #[serde(default)]
    pub primary: Option<String>,
    /// Secondary indexes, each named after the field it indexes.
    #[serde(default)]
    pub indexes: Vec<String>,
}

impl TableOptions {
    pub fn new(prefix: &str, name: &str) -> Self {
        Self { prefix: prefix.to_owned(), name: name.to_owned(), primary: None, indexes: Vec::new() }
    }

    pub fn primary(mut self, field: &str) -> Self {
        self.primary = Some(field.to_owned());
        self
    }

    pub fn index(mut self, field: &str) -> Self {
        self.indexes.push(field.to_owned());
        self
    }

    /// True when `index` addresses the primary index: one of the aliases or the primary field itself.
    pub fn is_primary_index(&self, index: &str) -> bool { is_primary_alias(index) || self.primary.as_deref() == Some(index) }

    pub fn has_index(&self, index: &str) -> bool { self.indexes.iter().any(|i| i == index) }

    pub fn validate(&self, schema: &Schema) -> Result<(), ConfigError> {
        for (what, value) in [("prefix", &self.prefix), ("name", &self.name)] {
            if value.is_empty() {
                return Err(ConfigError::Empty(what));
            }
            if value.contains(KEY_SEPARATOR) {
                return Err(ConfigError::Separator { what, value: value.clone() });
            }
        }

        if let Some(primary) = &self.primary {
            if is_primary_alias(primary) {
                return Err(ConfigError::ReservedIndexName(primary.clone()));
            }
            if !schema.has_field(primary) {
                return Err(ConfigError::UnknownField(primary.clone()));
            }
        }

        for (i, index) in self.indexes.iter().enumerate() {
            if self.is_primary_index(index) || index == PRIMARY_SEGMENT {
                return Err(ConfigError::ReservedIndexName(index.clone()));
            }
            if index.contains(KEY_SEPARATOR) {
                return Err(ConfigError::Separator { what: "index", value: index.clone() });
            }
            if !schema.has_field(index) {
                return Err(ConfigError::UnknownField(index.clone()));
            }
            if self.indexes[..i].contains(index) {
                return Err(ConfigError::DuplicateIndex(index.clone()));
            }
        }
        Ok(())
    }
}
