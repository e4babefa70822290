//! Query trait definition.
//!
//! This module defines the abstract interface of a lazy, composable record
//! set, allowing different backends (SQL query builders, search engines,
//! in-memory collections) to serve option collections.

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::SelectOptionsError;
use crate::interfaces::record::SharedRecord;

/// A query shared between collection configuration and in-flight requests.
pub type SharedQuery = Arc<dyn Query>;

/// A filterable, paginatable set of records.
///
/// Every builder method returns a new query and leaves `self` untouched, so a
/// fixed scope can be reused by concurrent requests. Ordering is whatever the
/// implementation already encodes; the provider imposes none.
///
/// `limit` and `offset` may be applied in either order and must compose the
/// way SQL `LIMIT .. OFFSET ..` does: skip `offset` rows, then take `limit`.
#[async_trait]
pub trait Query: Send + Sync {
    /// Narrow the set to records whose `attribute` contains `term`.
    ///
    /// This is the backend's default text matching, used for collections
    /// configured with a `text_attribute` but no custom filter.
    ///
    /// # Returns
    ///
    /// * `Ok(SharedQuery)` - The narrowed query
    /// * `Err(SelectOptionsError)` - If the backend cannot filter on `attribute`
    fn contains(&self, attribute: &str, term: &str) -> Result<SharedQuery, SelectOptionsError>;

    /// Return at most `limit` records.
    fn limit(&self, limit: usize) -> SharedQuery;

    /// Skip the first `offset` records.
    fn offset(&self, offset: usize) -> SharedQuery;

    /// Materialize the query.
    ///
    /// This is the only I/O performed per request.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<SharedRecord>)` - The matching records, in query order
    /// * `Err(SelectOptionsError)` - If execution fails
    async fn fetch(&self) -> Result<Vec<SharedRecord>, SelectOptionsError>;
}
