//! Paginated response types for the option endpoint.
//!
//! The JSON shape produced here is the contract with the client widget:
//! `{ "results": [...], "pagination": { "more": bool } }`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::result_item::ResultItem;

/// Pagination metadata of a page.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    /// Whether another page can be requested.
    pub more: bool,
}

/// One page of options.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PageResponse {
    /// The options on this page, in query order.
    pub results: Vec<ResultItem>,

    pub pagination: Pagination,
}

impl PageResponse {
    /// Create an empty response with no further pages.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a new page response.
    pub fn new(results: Vec<ResultItem>, more: bool) -> Self {
        Self {
            results,
            pagination: Pagination { more },
        }
    }

    /// Returns true if there are no results on this page.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Returns the number of results on this page.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether the client may request another page.
    pub fn has_more(&self) -> bool {
        self.pagination.more
    }

    /// Render the response as a JSON value.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Render the response as a compact JSON string.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
