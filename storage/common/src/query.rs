use tracing::debug;

use crate::{
    error::{QueryError, SchemaError},
    prefix::{concat, is_prefix_of},
    traits::{OrderedStore, RowMeta, Tabler},
    types::{Row, ScanDirection, ScanRange, is_primary_alias},
};

/// Scan path of a single call, decided once from the index name and anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPath<'q> {
    /// Primary storage from the start (or end) of the filter range.
    Primary,
    /// Primary storage resuming after (or before) the anchor primary key.
    PrimaryFrom(&'q [u8]),
    /// A secondary index from the start (or end) of the filter range.
    Secondary(&'q str),
    /// A secondary index resuming at the anchor row's composite key.
    SecondaryFrom(&'q str, &'q [u8]),
}

impl<'q> ScanPath<'q> {
    /// An empty anchor counts as no anchor.
    pub fn resolve(is_primary: bool, index: &'q str, anchor: Option<&'q [u8]>) -> Self {
        match (is_primary, anchor.filter(|a| !a.is_empty())) {
            (true, None) => ScanPath::Primary,
            (true, Some(anchor)) => ScanPath::PrimaryFrom(anchor),
            (false, None) => ScanPath::Secondary(index),
            (false, Some(anchor)) => ScanPath::SecondaryFrom(index, anchor),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScanPath::Primary => "primary",
            ScanPath::PrimaryFrom(_) => "primary_from_anchor",
            ScanPath::Secondary(_) => "secondary",
            ScanPath::SecondaryFrom(..) => "secondary_from_anchor",
        }
    }
}

/// Range of an unanchored primary scan.
pub fn primary_range(primary_prefix: &[u8], filter: Option<&[u8]>) -> ScanRange {
    ScanRange { prefix: concat(&[primary_prefix, filter.unwrap_or_default()]), cursor: None }
}

/// Range of a primary scan resuming at `anchor`, `None` when the anchor lies outside `filter`.
pub fn primary_range_from(primary_prefix: &[u8], filter: Option<&[u8]>, anchor: &[u8]) -> Option<ScanRange> {
    let filter = filter.unwrap_or_default();
    if !is_prefix_of(filter, anchor) {
        return None;
    }
    Some(ScanRange { prefix: concat(&[primary_prefix, filter]), cursor: Some(concat(&[primary_prefix, anchor])) })
}

/// Range of an unanchored secondary index scan; `filter` is already encoded.
pub fn secondary_range(index_prefix: &[u8], filter: Option<&[u8]>) -> ScanRange {
    ScanRange { prefix: concat(&[index_prefix, filter.unwrap_or_default()]), cursor: None }
}

/// Range of a secondary scan resuming at `cursor`, the anchor row's composite key.
/// `filter` and `anchor_value` are in their encoded key form.
/// `None` when the anchor's index value lies outside `filter`.
pub fn secondary_range_from(index_prefix: &[u8], filter: Option<&[u8]>, anchor_value: &[u8], cursor: Vec<u8>) -> Option<ScanRange> {
    let filter = filter.unwrap_or_default();
    if !is_prefix_of(filter, anchor_value) {
        return None;
    }
    Some(ScanRange { prefix: concat(&[index_prefix, filter]), cursor: Some(cursor) })
}

/// Stateless list queries over one table and the store it lives in.
pub struct Query<'a, T: ?Sized, S: ?Sized> {
    table: &'a T,
    store: &'a S,
}

impl<T: ?Sized, S: ?Sized> Clone for Query<'_, T, S> {
    fn clone(&self) -> Self { *self }
}

impl<T: ?Sized, S: ?Sized> Copy for Query<'_, T, S> {}

impl<'a, T, S> Query<'a, T, S>
where
    T: Tabler + ?Sized,
    S: OrderedStore + ?Sized,
{
    pub fn new(table: &'a T, store: &'a S) -> Self { Self { table, store } }

    /// List rows by index, filtering on the value `example` holds for that index.
    pub fn list(
        &self,
        index: &str,
        example: Option<&T::Payload>,
        anchor: Option<&[u8]>,
        count: usize,
        direction: ScanDirection,
    ) -> Result<Vec<Row<T::Payload>>, QueryError> {
        let filter = match example {
            Some(payload) => Some(self.example_filter(index, payload)?),
            None => None,
        };
        self.list_index(index, filter.as_deref(), anchor, count, direction)
    }

    /// The greatest matching row by index key.
    pub fn list_one(&self, index: &str, example: Option<&T::Payload>, anchor: Option<&[u8]>) -> Result<Row<T::Payload>, QueryError> {
        self.list(index, example, anchor, 1, ScanDirection::Reverse)?.into_iter().next().ok_or(QueryError::NotFound)
    }

    /// List up to `count` rows (`0` for all) of `index` whose index value starts with `filter`,
    /// strictly after (forward) or before (reverse) the row whose primary key is `anchor`.
    pub fn list_index(
        &self,
        index: &str,
        filter: Option<&[u8]>,
        anchor: Option<&[u8]>,
        count: usize,
        direction: ScanDirection,
    ) -> Result<Vec<Row<T::Payload>>, QueryError> {
        let path = ScanPath::resolve(self.table.options().is_primary_index(index), index, anchor);
        let result = self.run(path, filter, count, direction);

        let table = self.table.options().name.as_str();
        let filter = filter.map(String::from_utf8_lossy);
        match &result {
            Ok(rows) => debug!(table, index, path = path.label(), ?filter, count, ?direction, rows = rows.len(), "list_index"),
            Err(e) => debug!(table, index, path = path.label(), ?filter, count, ?direction, error = e.kind(), "list_index"),
        }
        result
    }

    fn run(&self, path: ScanPath<'_>, filter: Option<&[u8]>, count: usize, direction: ScanDirection) -> Result<Vec<Row<T::Payload>>, QueryError> {
        match path {
            ScanPath::Primary => {
                let range = primary_range(&self.table.primary_prefix(), filter);
                self.scan(range, count, direction, |value| self.table.decode_row(value))
            }
            ScanPath::PrimaryFrom(anchor) => {
                let range = primary_range_from(&self.table.primary_prefix(), filter, anchor).ok_or(QueryError::NotFound)?;
                self.scan(range, count, direction, |value| self.table.decode_row(value))
            }
            ScanPath::Secondary(index) | ScanPath::SecondaryFrom(index, _) if !self.table.options().has_index(index) => Err(QueryError::NotFound),
            ScanPath::Secondary(index) => {
                let filter = filter.map(|f| self.table.index_filter(f));
                let range = secondary_range(&self.table.index_prefix(index), filter.as_deref());
                self.scan(range, count, direction, |pointer| self.table.get_data(pointer))
            }
            ScanPath::SecondaryFrom(index, anchor) => {
                let row = self.table.get_data(anchor)?;
                let value = self.table.index_value(&row, index)?;
                let cursor = self.table.index_key(index, &value, &row.primary);
                let filter = filter.map(|f| self.table.index_filter(f));
                let range = secondary_range_from(&self.table.index_prefix(index), filter.as_deref(), &self.table.index_filter(&value), cursor)
                    .ok_or(QueryError::NotFound)?;
                self.scan(range, count, direction, |pointer| self.table.get_data(pointer))
            }
        }
    }

    fn scan<F>(&self, range: ScanRange, count: usize, direction: ScanDirection, resolve: F) -> Result<Vec<Row<T::Payload>>, QueryError>
    where F: Fn(&[u8]) -> Result<Row<T::Payload>, QueryError> {
        let values = self.store.range_scan(&range.prefix, range.cursor.as_deref(), count, direction)?;
        let rows = values.iter().map(|value| resolve(value.as_slice())).collect::<Result<Vec<_>, _>>()?;
        if rows.is_empty() {
            return Err(QueryError::NotFound);
        }
        Ok(rows)
    }

    /// Filter prefix taken from the example payload: the indexed field, or the
    /// primary field when `index` is a primary alias.
    fn example_filter(&self, index: &str, payload: &T::Payload) -> Result<Vec<u8>, QueryError> {
        let meta = self.table.meta();
        meta.bind_payload(payload)?;
        let field = if is_primary_alias(index) { self.table.options().primary.as_deref().ok_or(SchemaError::NoPrimaryField)? } else { index };
        Ok(meta.field_bytes(payload, field)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        mem::MemStore,
        options::TableOptions,
        schema::{Record, Schema, record},
        table::Table,
        value::{Value, ValueType},
    };

    fn albums() -> Table<MemStore> {
        let options = TableOptions::new("test", "albums").primary("id").index("year").index("artist");
        let schema = Schema::new().field("id", ValueType::String).field("year", ValueType::Integer).field("artist", ValueType::String);
        let table = Table::new(options, schema, MemStore::new()).unwrap();
        for (id, year, artist) in [("a1", 2001, "abba"), ("a2", 1999, "beck"), ("a3", 2001, "abba"), ("a4", 2005, "adele"), ("a5", 1999, "bjork")]
        {
            table.insert(record([("id", Value::from(id)), ("year", Value::from(year as i64)), ("artist", Value::from(artist))])).unwrap();
        }
        table
    }

    fn ids(rows: &[Row<Record>]) -> Vec<String> { rows.iter().map(|r| String::from_utf8(r.primary.clone()).unwrap()).collect() }

    #[test]
    fn test_scan_path_resolution() {
        assert_eq!(ScanPath::resolve(true, "", None), ScanPath::Primary);
        assert_eq!(ScanPath::resolve(true, "", Some(&b""[..])), ScanPath::Primary);
        assert_eq!(ScanPath::resolve(true, "id", Some(&b"k"[..])), ScanPath::PrimaryFrom(b"k"));
        assert_eq!(ScanPath::resolve(false, "year", None), ScanPath::Secondary("year"));
        assert_eq!(ScanPath::resolve(false, "year", Some(&b"k"[..])), ScanPath::SecondaryFrom("year", b"k"));
    }

    #[test]
    fn test_range_functions() {
        assert_eq!(primary_range(b"p-", Some(&b"a"[..])), ScanRange { prefix: b"p-a".to_vec(), cursor: None });
        assert_eq!(
            primary_range_from(b"p-", Some(&b"a"[..]), b"a7"),
            Some(ScanRange { prefix: b"p-a".to_vec(), cursor: Some(b"p-a7".to_vec()) })
        );
        assert_eq!(primary_range_from(b"p-", Some(&b"b"[..]), b"a7"), None);
        assert_eq!(secondary_range(b"i-", None), ScanRange { prefix: b"i-".to_vec(), cursor: None });
        assert_eq!(
            secondary_range_from(b"i-", None, b"v", b"i-v\0k".to_vec()),
            Some(ScanRange { prefix: b"i-".to_vec(), cursor: Some(b"i-v\0k".to_vec()) })
        );
        assert_eq!(secondary_range_from(b"i-", Some(&b"w"[..]), b"v", b"i-v\0k".to_vec()), None);
    }

    #[test]
    fn test_primary_ordering() {
        let table = albums();
        let q = table.query();
        assert_eq!(ids(&q.list_index("", None, None, 0, ScanDirection::Forward).unwrap()), vec!["a1", "a2", "a3", "a4", "a5"]);
        assert_eq!(ids(&q.list_index("primary", None, None, 0, ScanDirection::Reverse).unwrap()), vec!["a5", "a4", "a3", "a2", "a1"]);
        // the primary field name addresses the primary index too
        assert_eq!(ids(&q.list_index("id", None, None, 2, ScanDirection::Forward).unwrap()), vec!["a1", "a2"]);
    }

    #[test]
    fn test_primary_resume_from_anchor() {
        let table = albums();
        let q = table.query();
        let first = q.list_index("auto", None, None, 2, ScanDirection::Forward).unwrap();
        let rest = q.list_index("auto", None, Some(first[1].primary.as_slice()), 0, ScanDirection::Forward).unwrap();
        assert_eq!(ids(&rest), vec!["a3", "a4", "a5"]);

        let back = q.list_index("auto", None, Some(&b"a3"[..]), 0, ScanDirection::Reverse).unwrap();
        assert_eq!(ids(&back), vec!["a2", "a1"]);
    }

    #[test]
    fn test_primary_filter_with_anchor() {
        let table = albums();
        let q = table.query();
        assert_eq!(ids(&q.list_index("", Some(&b"a"[..]), Some(&b"a2"[..]), 0, ScanDirection::Forward).unwrap()), vec!["a3", "a4", "a5"]);
        assert!(q.list_index("", Some(&b"b"[..]), Some(&b"a2"[..]), 0, ScanDirection::Forward).unwrap_err().is_not_found());
    }

    #[test]
    fn test_secondary_order_and_resolution() {
        let table = albums();
        let q = table.query();
        let rows = q.list_index("year", None, None, 0, ScanDirection::Forward).unwrap();
        // year ascending, primary key breaks ties
        assert_eq!(ids(&rows), vec!["a2", "a5", "a1", "a3", "a4"]);
        for row in &rows {
            assert_eq!(row, &table.get_data(&row.primary).unwrap());
        }
    }

    #[test]
    fn test_secondary_filter_prefix() {
        let table = albums();
        let q = table.query();
        assert_eq!(ids(&q.list_index("artist", Some(&b"a"[..]), None, 0, ScanDirection::Forward).unwrap()), vec!["a1", "a3", "a4"]);
        assert_eq!(ids(&q.list_index("artist", Some(&b"b"[..]), None, 0, ScanDirection::Reverse).unwrap()), vec!["a5", "a2"]);
    }

    #[test]
    fn test_secondary_resume_from_anchor() {
        let table = albums();
        let q = table.query();
        let filter = Value::Integer(2001).to_bytes();
        let first = q.list_index("year", Some(filter.as_slice()), None, 1, ScanDirection::Forward).unwrap();
        assert_eq!(ids(&first), vec!["a1"]);
        let rest = q.list_index("year", Some(filter.as_slice()), Some(first[0].primary.as_slice()), 0, ScanDirection::Forward).unwrap();
        assert_eq!(ids(&rest), vec!["a3"]);

        // no filter: the anchor only positions the cursor
        let rest = q.list_index("year", None, Some(&b"a1"[..]), 0, ScanDirection::Forward).unwrap();
        assert_eq!(ids(&rest), vec!["a3", "a4"]);
        let before = q.list_index("year", None, Some(&b"a1"[..]), 0, ScanDirection::Reverse).unwrap();
        assert_eq!(ids(&before), vec!["a5", "a2"]);
    }

    #[test]
    fn test_secondary_anchor_outside_filter() {
        let table = albums();
        let q = table.query();
        let filter = Value::Integer(2001).to_bytes();
        // a2 was released in 1999
        assert!(q.list_index("year", Some(filter.as_slice()), Some(&b"a2"[..]), 0, ScanDirection::Forward).unwrap_err().is_not_found());
    }

    #[test]
    fn test_missing_anchor_is_not_found() {
        let table = albums();
        assert!(table.query().list_index("year", None, Some(&b"zz"[..]), 0, ScanDirection::Forward).unwrap_err().is_not_found());
    }

    #[test]
    fn test_empty_result_is_not_found() {
        let table = albums();
        let q = table.query();
        assert!(q.list_index("artist", Some(&b"zz"[..]), None, 0, ScanDirection::Forward).unwrap_err().is_not_found());
        assert!(q.list_index("", None, Some(&b"a5"[..]), 0, ScanDirection::Forward).unwrap_err().is_not_found());
        assert!(q.list_index("unindexed", None, None, 0, ScanDirection::Forward).unwrap_err().is_not_found());
    }

    #[test]
    fn test_undeclared_index_is_not_found() {
        let options = TableOptions::new("test", "items").primary("id").index("tag");
        let schema = Schema::new().field("id", ValueType::String).field("tag", ValueType::String).field("note", ValueType::String);
        let table = Table::new(options, schema, MemStore::new()).unwrap();
        table.insert(record([("id", "k1"), ("tag", "red-1"), ("note", "x")])).unwrap();
        let q = table.query();

        assert_eq!(ids(&q.list_index("tag", None, None, 0, ScanDirection::Forward).unwrap()), vec!["k1"]);
        // a name reaching into the "tag" keyspace
        assert!(q.list_index("tag-red", None, None, 0, ScanDirection::Forward).unwrap_err().is_not_found());
        // a schema field that is not indexed
        assert!(q.list_index("note", None, None, 0, ScanDirection::Forward).unwrap_err().is_not_found());
        assert!(q.list_index("note", None, Some(&b"k1"[..]), 0, ScanDirection::Forward).unwrap_err().is_not_found());
        assert!(q.list("note", Some(&record([("note", "x")])), None, 0, ScanDirection::Forward).unwrap_err().is_not_found());
    }

    #[test]
    fn test_list_by_example() {
        let table = albums();
        let q = table.query();
        let rows = q.list("year", Some(&record([("year", 1999i64)])), None, 0, ScanDirection::Forward).unwrap();
        assert_eq!(ids(&rows), vec!["a2", "a5"]);

        // primary alias filters on the primary field
        let rows = q.list("", Some(&record([("id", "a4")])), None, 0, ScanDirection::Forward).unwrap();
        assert_eq!(ids(&rows), vec!["a4"]);
    }

    #[test]
    fn test_list_by_example_schema_errors() {
        let table = albums();
        let q = table.query();
        let err = q.list("year", Some(&record([("year", "1999")])), None, 0, ScanDirection::Forward).unwrap_err();
        assert!(matches!(err, QueryError::Schema(SchemaError::TypeMismatch { .. })));
        let err = q.list("artist", Some(&record([("year", 1999i64)])), None, 0, ScanDirection::Forward).unwrap_err();
        assert!(matches!(err, QueryError::Schema(SchemaError::MissingField(_))));
    }

    #[test]
    fn test_list_one_takes_greatest_key() {
        let table = albums();
        let q = table.query();
        assert_eq!(ids(&[q.list_one("year", Some(&record([("year", 2001i64)])), None).unwrap()]), vec!["a3"]);
        assert_eq!(ids(&[q.list_one("", None, None).unwrap()]), vec!["a5"]);
        assert!(q.list_one("artist", Some(&record([("artist", "zappa")])), None).unwrap_err().is_not_found());
    }

    #[test]
    fn test_list_one_without_primary_field() {
        let options = TableOptions::new("test", "log").index("level");
        let schema = Schema::new().field("level", ValueType::String);
        let table = Table::new(options, schema, MemStore::new()).unwrap();
        table.insert(record([("level", "info")])).unwrap();
        let err = table.query().list_one("", Some(&record([("level", "info")])), None).unwrap_err();
        assert!(matches!(err, QueryError::Schema(SchemaError::NoPrimaryField)));
        assert_eq!(table.query().list_one("level", Some(&record([("level", "info")])), None).unwrap().payload["level"], Value::from("info"));
    }
}
