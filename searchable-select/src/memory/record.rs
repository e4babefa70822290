//! JSON-backed record.

use serde_json::{Map, Value};

use crate::errors::SelectOptionsError;
use crate::interfaces::Record;

/// A record whose fields are the keys of a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonRecord {
    fields: Map<String, Value>,
}

impl JsonRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Build a record from a JSON object.
    ///
    /// # Returns
    ///
    /// * `Ok(JsonRecord)` - If `value` is an object
    /// * `Err(SelectOptionsError::InvalidRecord)` - For any other JSON value
    pub fn from_value(value: Value) -> Result<Self, SelectOptionsError> {
        match value {
            Value::Object(fields) => Ok(Self::new(fields)),
            other => Err(SelectOptionsError::invalid_record(format!(
                "records must be JSON objects, got {}",
                other
            ))),
        }
    }
}

impl Record for JsonRecord {
    fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    fn field(&self, name: &str) -> Option<Value> {
        self.fields.get(name).cloned()
    }
}
