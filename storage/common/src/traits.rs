use crate::{
    error::{QueryError, SchemaError, StorageError},
    options::TableOptions,
    types::{Row, ScanDirection},
};

/// An ordered key-value store supporting bounded prefix scans.
///
/// Implementations must keep keys in lexicographic byte order and never
/// return a value whose key lies outside `prefix`.
pub trait OrderedStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError>;

    /// Values (not keys) stored under `prefix`, strictly after `cursor` when
    /// scanning forward or strictly before it when scanning in reverse, in key
    /// order, at most `count` of them (`0` means no limit).
    fn range_scan(&self, prefix: &[u8], cursor: Option<&[u8]>, count: usize, direction: ScanDirection)
        -> Result<Vec<Vec<u8>>, StorageError>;
}

/// Write access used to populate tables.
pub trait KvWrite: OrderedStore {
    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError>;

    /// Monotonic id used for auto primary keys.
    fn generate_id(&self) -> Result<u64, StorageError>;
}

/// Row schema: binds payloads and extracts index values from them.
pub trait RowMeta {
    type Payload;

    /// Check the payload against the schema before any field is read from it.
    fn bind_payload(&self, payload: &Self::Payload) -> Result<(), SchemaError>;

    /// Encoded value of `field` in `payload`.
    fn field_bytes(&self, payload: &Self::Payload, field: &str) -> Result<Vec<u8>, SchemaError>;
}

/// Everything the query engine needs from a table.
pub trait Tabler {
    type Payload;
    type Meta: RowMeta<Payload = Self::Payload>;

    fn meta(&self) -> &Self::Meta;
    fn options(&self) -> &TableOptions;

    /// Key namespace of a secondary index.
    fn index_prefix(&self, index: &str) -> Vec<u8>;
    /// Key namespace of the primary storage.
    fn primary_prefix(&self) -> Vec<u8>;

    /// Fetch a row by primary key, `QueryError::NotFound` when absent.
    fn get_data(&self, primary: &[u8]) -> Result<Row<Self::Payload>, QueryError>;

    /// Index value of `row` under `index`.
    fn index_value(&self, row: &Row<Self::Payload>, index: &str) -> Result<Vec<u8>, QueryError>;

    /// Composite key `index_prefix ++ encode(value) ++ terminator ++ primary`.
    fn index_key(&self, index: &str, value: &[u8], primary: &[u8]) -> Vec<u8>;

    /// Encoded form of a raw index value prefix, matching the value part of [`Tabler::index_key`].
    fn index_filter(&self, filter: &[u8]) -> Vec<u8>;

    /// Decode a value read from primary storage into a row.
    fn decode_row(&self, value: &[u8]) -> Result<Row<Self::Payload>, QueryError>;
}
