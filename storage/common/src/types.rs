use serde::{Deserialize, Serialize};

/// Order in which a range scan walks the key space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScanDirection {
    Forward,
    Reverse,
}

/// A decoded row: its unique primary key and the business payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row<P> {
    pub primary: Vec<u8>,
    pub payload: P,
}

impl<P> Row<P> {
    pub fn new(primary: impl Into<Vec<u8>>, payload: P) -> Self { Self { primary: primary.into(), payload } }
}

/// Exact key range handed to the ordered store: everything under `prefix`,
/// strictly after (forward) or before (reverse) `cursor` when present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRange {
    pub prefix: Vec<u8>,
    pub cursor: Option<Vec<u8>>,
}

/// Names that always address the primary index.
pub const PRIMARY_ALIASES: [&str; 3] = ["", "auto", "primary"];

pub fn is_primary_alias(index: &str) -> bool { PRIMARY_ALIASES.contains(&index) }
