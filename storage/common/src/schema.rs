use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    error::SchemaError,
    traits::RowMeta,
    value::{Value, ValueType},
};

/// Payload of the built-in table: field name to value.
pub type Record = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub ty: ValueType,
}

/// Declared fields of a table, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<FieldDef>,
}

impl Schema {
    pub fn new() -> Self { Self::default() }

    pub fn field(mut self, name: &str, ty: ValueType) -> Self {
        self.fields.push(FieldDef { name: name.to_owned(), ty });
        self
    }

    pub fn field_type(&self, name: &str) -> Option<ValueType> { self.fields.iter().find(|f| f.name == name).map(|f| f.ty) }

    pub fn has_field(&self, name: &str) -> bool { self.field_type(name).is_some() }
}

impl RowMeta for Schema {
    type Payload = Record;

    fn bind_payload(&self, payload: &Record) -> Result<(), SchemaError> {
        for (name, value) in payload {
            let expected = self.field_type(name).ok_or_else(|| SchemaError::UnknownField(name.clone()))?;
            let found = value.value_type();
            if expected != found {
                return Err(SchemaError::TypeMismatch { field: name.clone(), expected, found });
            }
        }
        Ok(())
    }

    fn field_bytes(&self, payload: &Record, field: &str) -> Result<Vec<u8>, SchemaError> {
        if !self.has_field(field) {
            return Err(SchemaError::UnknownField(field.to_owned()));
        }
        payload.get(field).map(Value::to_bytes).ok_or_else(|| SchemaError::MissingField(field.to_owned()))
    }
}

/// Build a [`Record`] from `(field, value)` pairs.
pub fn record<I, K, V>(pairs: I) -> Record
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}
