//! Record trait definition.

use std::sync::Arc;

use serde_json::Value;

/// A record fetched by a `Query`, shared between the fetch and the projection.
pub type SharedRecord = Arc<dyn Record>;

/// A domain entity whose fields can be read by name.
///
/// Field presence is an explicit capability: the provider asks `has_field`
/// before echoing an optional attribute, so implementations never have to
/// fail on a field they do not know.
pub trait Record: Send + Sync {
    /// Whether this record exposes a field with the given name.
    fn has_field(&self, name: &str) -> bool;

    /// Read a field as JSON.
    ///
    /// Returns `None` if the record does not expose the field. A field that
    /// exists but holds no value reads as `Some(Value::Null)`.
    fn field(&self, name: &str) -> Option<Value>;
}
