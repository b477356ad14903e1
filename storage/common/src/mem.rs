//! In-memory [`OrderedStore`] backed by a `BTreeMap`, for tests and embedding.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::{
    bounds::{collect_prefixed, scan_bounds},
    error::StorageError,
    traits::{KvWrite, OrderedStore},
    types::ScanDirection,
};

#[derive(Clone, Default, Debug)]
pub struct MemStore(Arc<Inner>);

#[derive(Default, Debug)]
struct Inner {
    map: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
    next_id: AtomicU64,
}

impl MemStore {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> Result<usize, StorageError> { Ok(self.0.map.read().map_err(|_| StorageError::Poisoned)?.len()) }

    pub fn is_empty(&self) -> Result<bool, StorageError> { Ok(self.len()? == 0) }
}

impl OrderedStore for MemStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.0.map.read().map_err(|_| StorageError::Poisoned)?.get(key).cloned())
    }

    fn range_scan(
        &self,
        prefix: &[u8],
        cursor: Option<&[u8]>,
        count: usize,
        direction: ScanDirection,
    ) -> Result<Vec<Vec<u8>>, StorageError> {
        let Some(bounds) = scan_bounds(prefix, cursor, direction) else { return Ok(Vec::new()) };
        tracing::trace!(?bounds, ?direction, count, "mem range scan");

        let map = self.0.map.read().map_err(|_| StorageError::Poisoned)?;
        let range = map.range::<Vec<u8>, _>(bounds.into_range()).map(Ok::<_, StorageError>);
        match direction {
            ScanDirection::Forward => collect_prefixed(range, prefix, count),
            ScanDirection::Reverse => collect_prefixed(range.rev(), prefix, count),
        }
    }
}

impl KvWrite for MemStore {
    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        self.0.map.write().map_err(|_| StorageError::Poisoned)?.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn generate_id(&self) -> Result<u64, StorageError> { Ok(self.0.next_id.fetch_add(1, Ordering::Relaxed)) }
}
