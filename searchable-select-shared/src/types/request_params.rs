//! Request parameter types for the option endpoint.
//!
//! This module defines the parameters the autocomplete widget sends with
//! every page request.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Parameters of a single option request.
///
/// The widget sends a search `term` and a `page` index. Both are optional and
/// the page is kept raw, since clients send it as a string or a number. Any
/// other parameter is retained in `extra` so that scope resolvers can read
/// host-specific values such as a parent record id.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RequestParams {
    /// The free-text search term.
    /// An empty string is still a term; only an absent term skips filtering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,

    /// The requested page index, as sent by the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<Value>,

    /// Every other request parameter.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RequestParams {
    /// Create empty parameters: no term, first page.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the search term.
    ///
    /// # Example
    ///
    /// ```
    /// use searchable_select_shared::RequestParams;
    ///
    /// let params = RequestParams::new().with_term("tolk").with_page(2);
    /// assert_eq!(params.term.as_deref(), Some("tolk"));
    /// ```
    pub fn with_term(mut self, term: impl Into<String>) -> Self {
        self.term = Some(term.into());
        self
    }

    /// Set the raw page value.
    pub fn with_page(mut self, page: impl Into<Value>) -> Self {
        self.page = Some(page.into());
        self
    }

    /// Add an extra parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Look up an extra parameter by name.
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}
