use tablekv_storage_common::{
    KvWrite, OrderedStore, ScanDirection, StorageError,
    bounds::{collect_prefixed, scan_bounds},
};

use crate::error::sled_error;

/// One table's keyspace: a sled tree, plus the database for id generation.
#[derive(Clone)]
pub struct SledStore {
    db: sled::Db,
    tree: sled::Tree,
}

enum SledIter {
    Forward(sled::Iter),
    Reverse(std::iter::Rev<sled::Iter>),
}

impl Iterator for SledIter {
    type Item = Result<(sled::IVec, sled::IVec), StorageError>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = match self {
            SledIter::Forward(iter) => iter.next(),
            SledIter::Reverse(iter) => iter.next(),
        };
        item.map(|kv| kv.map_err(sled_error))
    }
}

impl SledStore {
    pub fn new(db: sled::Db, tree: sled::Tree) -> Self { Self { db, tree } }

    pub fn tree(&self) -> &sled::Tree { &self.tree }
}

impl OrderedStore for SledStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.tree.get(key).map_err(sled_error)?.map(|ivec| ivec.to_vec()))
    }

    fn range_scan(
        &self,
        prefix: &[u8],
        cursor: Option<&[u8]>,
        count: usize,
        direction: ScanDirection,
    ) -> Result<Vec<Vec<u8>>, StorageError> {
        let Some(bounds) = scan_bounds(prefix, cursor, direction) else { return Ok(Vec::new()) };
        tracing::trace!(?bounds, ?direction, count, "sled range scan");

        let range = self.tree.range(bounds.into_range());
        let iter = match direction {
            ScanDirection::Forward => SledIter::Forward(range),
            ScanDirection::Reverse => SledIter::Reverse(range.rev()),
        };
        collect_prefixed(iter, prefix, count)
    }
}

impl KvWrite for SledStore {
    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        self.tree.insert(key, value).map_err(sled_error)?;
        Ok(())
    }

    fn generate_id(&self) -> Result<u64, StorageError> { self.db.generate_id().map_err(sled_error) }
}
