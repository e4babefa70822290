//! Result item type for the option endpoint.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single option rendered for the widget.
///
/// Serialized as a flat JSON object: `id` and `text` first, followed by any
/// extra record fields and additional payload keys in insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ResultItem(Map<String, Value>);

impl ResultItem {
    /// Create an item with the mandatory `id` and `text` keys.
    pub fn new(id: Value, text: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("id".to_string(), id);
        fields.insert("text".to_string(), Value::String(text.into()));
        Self(fields)
    }

    /// Set a key, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    /// Merge a mapping on top of this item. Keys of `payload` win on collision.
    pub fn merge(&mut self, payload: Map<String, Value>) {
        for (key, value) in payload {
            self.0.insert(key, value);
        }
    }

    /// The option's identifier.
    pub fn id(&self) -> Option<&Value> {
        self.0.get("id")
    }

    /// The option's display text.
    ///
    /// Returns `None` if a payload replaced `text` with a non-string value.
    pub fn text(&self) -> Option<&str> {
        self.0.get("text").and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Keys in serialization order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}
