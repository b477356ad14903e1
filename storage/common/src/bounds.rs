use std::ops::Bound;

use crate::types::ScanDirection;

/// Concrete key interval for one range scan, ready for a `BTreeMap` or sled `range`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBounds {
    pub lower: Bound<Vec<u8>>,
    pub upper: Bound<Vec<u8>>,
}

impl KeyBounds {
    pub fn into_range(self) -> (Bound<Vec<u8>>, Bound<Vec<u8>>) { (self.lower, self.upper) }
}

/// Smallest key greater than every key starting with `prefix`, `None` when no such key exists.
pub fn prefix_successor(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut key = prefix.to_vec();
    while let Some(last) = key.pop() {
        if last != 0xFF {
            key.push(last + 1);
            return Some(key);
        }
    }
    None
}

/// Bounds covering the keys under `prefix` on the scan side of `cursor`.
///
/// A cursor outside the prefix range is clamped to it. Returns `None` when the
/// interval is empty.
pub fn scan_bounds(prefix: &[u8], cursor: Option<&[u8]>, direction: ScanDirection) -> Option<KeyBounds> {
    let end = prefix_successor(prefix);
    let below_end = |c: &[u8]| end.as_deref().is_none_or(|e| c < e);

    match direction {
        ScanDirection::Forward => {
            let lower = match cursor {
                Some(c) if !below_end(c) => return None,
                Some(c) if c >= prefix => Bound::Excluded(c.to_vec()),
                _ => Bound::Included(prefix.to_vec()),
            };
            Some(KeyBounds { lower, upper: end.map_or(Bound::Unbounded, Bound::Excluded) })
        }
        ScanDirection::Reverse => {
            let upper = match cursor {
                Some(c) if c <= prefix => return None,
                Some(c) if below_end(c) => Bound::Excluded(c.to_vec()),
                _ => end.clone().map_or(Bound::Unbounded, Bound::Excluded),
            };
            Some(KeyBounds { lower: Bound::Included(prefix.to_vec()), upper })
        }
    }
}

/// Drain `(key, value)` pairs in scan order, stopping at the first key outside
/// `prefix` or once `count` values are collected (`0` means no limit).
pub fn collect_prefixed<K, V, E, I>(iter: I, prefix: &[u8], count: usize) -> Result<Vec<Vec<u8>>, E>
where
    K: AsRef<[u8]>,
    V: AsRef<[u8]>,
    I: IntoIterator<Item = Result<(K, V), E>>,
{
    let mut values = Vec::new();
    for item in iter {
        let (key, value) = item?;
        // Prefix guard
        if !key.as_ref().starts_with(prefix) {
            break;
        }
        values.push(value.as_ref().to_vec());
        if count > 0 && values.len() >= count {
            break;
        }
    }
    Ok(values)
}
