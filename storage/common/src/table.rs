use crate::{
    error::{ConfigError, MutationError, QueryError, SchemaError},
    options::{KEY_SEPARATOR, PRIMARY_SEGMENT, TableOptions},
    prefix::concat,
    query::Query,
    schema::{Record, Schema},
    traits::{KvWrite, OrderedStore, RowMeta, Tabler},
    types::{Row, ScanDirection},
};

/// Terminates the escaped index value inside a composite index key, so a shorter value sorts before its extensions.
pub const VALUE_TERMINATOR: [u8; 2] = [0x00, 0x00];

/// Escape `0x00` as `0x00 0xFF` so an encoded value never contains the terminator.
/// Escaping a prefix of a value yields a prefix of the escaped value.
pub fn escape_index_value(value: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(value.len() + 2);
    for &b in value {
        if b == 0x00 {
            out.push(0x00);
            out.push(0xFF);
        } else {
            out.push(b);
        }
    }
    out
}

/// A table of [`Record`] rows kept in an ordered store.
///
/// Primary storage maps `{prefix}-{name}-data-{primary}` to the encoded row;
/// each secondary index maps `{prefix}-{name}-{index}-{escaped value}\0\0{primary}` to the primary key.
#[derive(Debug, Clone)]
pub struct Table<S> {
    options: TableOptions,
    schema: Schema,
    store: S,
}

impl<S: OrderedStore> Table<S> {
    pub fn new(options: TableOptions, schema: Schema, store: S) -> Result<Self, ConfigError> {
        options.validate(&schema)?;
        Ok(Self { options, schema, store })
    }

    pub fn schema(&self) -> &Schema { &self.schema }
    pub fn store(&self) -> &S { &self.store }

    pub fn query(&self) -> Query<'_, Self, S> { Query::new(self, &self.store) }

    pub fn list(
        &self,
        index: &str,
        example: Option<&Record>,
        anchor: Option<&[u8]>,
        count: usize,
        direction: ScanDirection,
    ) -> Result<Vec<Row<Record>>, QueryError> {
        self.query().list(index, example, anchor, count, direction)
    }

    pub fn list_one(&self, index: &str, example: Option<&Record>, anchor: Option<&[u8]>) -> Result<Row<Record>, QueryError> {
        self.query().list_one(index, example, anchor)
    }

    pub fn list_index(
        &self,
        index: &str,
        filter: Option<&[u8]>,
        anchor: Option<&[u8]>,
        count: usize,
        direction: ScanDirection,
    ) -> Result<Vec<Row<Record>>, QueryError> {
        self.query().list_index(index, filter, anchor, count, direction)
    }

    fn namespace(&self, segment: &str) -> Vec<u8> {
        let sep = KEY_SEPARATOR;
        format!("{}{sep}{}{sep}{}{sep}", self.options.prefix, self.options.name, segment).into_bytes()
    }
}

impl<S: KvWrite> Table<S> {
    /// Store a new row and its secondary index entries.
    ///
    /// The primary key is the primary field's value, or a store-generated id
    /// when the table uses auto keys. Rows lacking an indexed field are left
    /// out of that index.
    ///
    /// Writes are not atomic: the row is written first, then one entry per index,
    /// so a store failure part way through leaves the row partially indexed.
    pub fn insert(&self, payload: Record) -> Result<Row<Record>, MutationError> {
        self.schema.bind_payload(&payload)?;
        let primary = match &self.options.primary {
            Some(field) => self.schema.field_bytes(&payload, field)?,
            None => self.store.generate_id()?.to_be_bytes().to_vec(),
        };

        let key = concat(&[&self.primary_prefix(), &primary]);
        if self.store.get(&key)?.is_some() {
            return Err(MutationError::Duplicate(primary));
        }

        let row = Row::new(primary, payload);
        self.store.put(&key, &bincode::serialize(&row)?)?;
        for index in &self.options.indexes {
            match self.schema.field_bytes(&row.payload, index) {
                Ok(value) => self.store.put(&self.index_key(index, &value, &row.primary), &row.primary)?,
                Err(SchemaError::MissingField(_)) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        tracing::trace!(table = %self.options.name, primary = ?String::from_utf8_lossy(&row.primary), "inserted row");
        Ok(row)
    }
}

impl<S: OrderedStore> Tabler for Table<S> {
    type Payload = Record;
    type Meta = Schema;

    fn meta(&self) -> &Schema { &self.schema }
    fn options(&self) -> &TableOptions { &self.options }

    fn index_prefix(&self, index: &str) -> Vec<u8> { self.namespace(index) }
    fn primary_prefix(&self) -> Vec<u8> { self.namespace(PRIMARY_SEGMENT) }

    fn get_data(&self, primary: &[u8]) -> Result<Row<Record>, QueryError> {
        match self.store.get(&concat(&[&self.primary_prefix(), primary]))? {
            Some(value) => self.decode_row(&value),
            None => Err(QueryError::NotFound),
        }
    }

    fn index_value(&self, row: &Row<Record>, index: &str) -> Result<Vec<u8>, QueryError> {
        if self.options.is_primary_index(index) {
            return Ok(row.primary.clone());
        }
        Ok(self.schema.field_bytes(&row.payload, index)?)
    }

    fn index_key(&self, index: &str, value: &[u8], primary: &[u8]) -> Vec<u8> {
        concat(&[&self.index_prefix(index), &escape_index_value(value), &VALUE_TERMINATOR[..], primary])
    }

    fn index_filter(&self, filter: &[u8]) -> Vec<u8> { escape_index_value(filter) }

    fn decode_row(&self, value: &[u8]) -> Result<Row<Record>, QueryError> { Ok(bincode::deserialize(value)?) }
}
