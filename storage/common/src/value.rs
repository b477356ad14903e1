use serde::{Deserialize, Serialize};

/// A dynamically typed field value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    String(String),
    Integer(i64),
    Boolean(bool),
    Binary(Vec<u8>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    String,
    Integer,
    Boolean,
    Binary,
}

impl ValueType {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => ValueType::String,
            Value::Integer(_) => ValueType::Integer,
            Value::Boolean(_) => ValueType::Boolean,
            Value::Binary(_) => ValueType::Binary,
        }
    }
}

impl Value {
    pub fn value_type(&self) -> ValueType { ValueType::of(self) }

    /// Order-preserving encoding used as the index value.
    /// Within one type, byte order equals value order, and a string's encoding
    /// is a prefix of every string it is a prefix of.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Value::String(s) => s.as_bytes().to_vec(),
            // flip the sign bit so negatives sort before positives
            Value::Integer(i) => ((*i as u64) ^ (1 << 63)).to_be_bytes().to_vec(),
            Value::Boolean(b) => vec![*b as u8],
            Value::Binary(bytes) => bytes.clone(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self { Value::String(s.to_owned()) }
}

impl From<String> for Value {
    fn from(s: String) -> Self { Value::String(s) }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self { Value::Integer(i) }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self { Value::Boolean(b) }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self { Value::Binary(bytes) }
}
