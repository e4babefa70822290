//! Configuration types for option collections.
//!
//! A collection is described by a `CollectionOptions` bag, filled through
//! chained setters, and resolved once into an immutable `CollectionConfig`.
//! Resolution derives the display text and the filter from `text_attribute`
//! when no explicit function is given and fails with a configuration error
//! naming the missing options otherwise.

use std::fmt;
use std::sync::Arc;

use searchable_select_shared::RequestParams;
use serde_json::{Map, Value};

use crate::context::RequestContext;
use crate::errors::SelectOptionsError;
use crate::interfaces::{Record, SharedQuery};

/// Records per page when `per_page` is not set.
pub const DEFAULT_PER_PAGE: usize = 10;

/// Identifier field when `id_field` is not set.
pub const DEFAULT_ID_FIELD: &str = "id";

/// Resolves the base query from the request context.
pub type ScopeFn =
    Arc<dyn Fn(&RequestContext) -> Result<SharedQuery, SelectOptionsError> + Send + Sync>;

/// Resolves the base query from the request context and parameters.
pub type ScopeWithParamsFn = Arc<
    dyn Fn(&RequestContext, &RequestParams) -> Result<SharedQuery, SelectOptionsError>
        + Send
        + Sync,
>;

/// Computes the display text of a record.
pub type DisplayTextFn = Arc<dyn Fn(&dyn Record) -> String + Send + Sync>;

/// Narrows a query by a search term.
pub type FilterFn =
    Arc<dyn Fn(&str, SharedQuery) -> Result<SharedQuery, SelectOptionsError> + Send + Sync>;

/// Computes extra keys merged into a record's result item.
pub type PayloadFn = Arc<dyn Fn(&dyn Record) -> Value + Send + Sync>;

/// Where the base query of a collection comes from.
#[derive(Clone)]
pub enum ScopeSource {
    /// The same query for every request.
    Fixed(SharedQuery),
    /// Built per request from the ambient context.
    Context(ScopeFn),
    /// Built per request from the ambient context and the request parameters.
    ContextWithParams(ScopeWithParamsFn),
}

/// How the display text of a record is computed.
#[derive(Clone)]
pub enum DisplayTextSource {
    Custom(DisplayTextFn),
    /// Read the named field.
    Attribute(String),
}

/// How a search term narrows the scope.
#[derive(Clone)]
pub enum FilterSource {
    Custom(FilterFn),
    /// The backend's default contains match on the named field.
    Attribute(String),
}

/// Extra keys merged into result items.
#[derive(Clone, Default)]
pub enum PayloadSource {
    #[default]
    Absent,
    /// A fixed mapping. Never merged; only a function yields a payload.
    Static(Map<String, Value>),
    /// Computed per record.
    Computed(PayloadFn),
}

impl PayloadSource {
    /// Whether there is never anything to merge.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Absent | Self::Static(_) => true,
            Self::Computed(_) => false,
        }
    }
}

impl fmt::Debug for ScopeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(_) => f.write_str("Fixed(..)"),
            Self::Context(_) => f.write_str("Context(..)"),
            Self::ContextWithParams(_) => f.write_str("ContextWithParams(..)"),
        }
    }
}

impl fmt::Debug for DisplayTextSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(_) => f.write_str("Custom(..)"),
            Self::Attribute(name) => f.debug_tuple("Attribute").field(name).finish(),
        }
    }
}

impl fmt::Debug for FilterSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(_) => f.write_str("Custom(..)"),
            Self::Attribute(name) => f.debug_tuple("Attribute").field(name).finish(),
        }
    }
}

impl fmt::Debug for PayloadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("Absent"),
            Self::Static(map) => f.debug_tuple("Static").field(map).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Options for one named collection.
///
/// Only `scope` is always required. The display text and the filter are
/// either given explicitly or derived from `text_attribute`.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use searchable_select::{CollectionOptions, InMemoryQuery, JsonRecord};
/// use serde_json::json;
///
/// let authors = InMemoryQuery::new(vec![
///     JsonRecord::from_value(json!({ "id": 1, "name": "Tolkien" })).unwrap(),
/// ]);
///
/// let options = CollectionOptions::new()
///     .scope(Arc::new(authors))
///     .text_attribute("name")
///     .per_page(20);
/// ```
#[derive(Clone, Default)]
pub struct CollectionOptions {
    scope: Option<ScopeSource>,
    display_text: Option<DisplayTextFn>,
    text_attribute: Option<String>,
    filter: Option<FilterFn>,
    per_page: Option<usize>,
    id_field: Option<String>,
    additional_attributes: Vec<String>,
    additional_payload: PayloadSource,
}

impl CollectionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the same query for every request.
    pub fn scope(mut self, query: SharedQuery) -> Self {
        self.scope = Some(ScopeSource::Fixed(query));
        self
    }

    /// Build the query per request from the ambient context.
    pub fn scope_fn<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&RequestContext) -> Result<SharedQuery, SelectOptionsError> + Send + Sync + 'static,
    {
        self.scope = Some(ScopeSource::Context(Arc::new(resolver)));
        self
    }

    /// Build the query per request from the ambient context and the request
    /// parameters.
    pub fn scope_with_params<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&RequestContext, &RequestParams) -> Result<SharedQuery, SelectOptionsError>
            + Send
            + Sync
            + 'static,
    {
        self.scope = Some(ScopeSource::ContextWithParams(Arc::new(resolver)));
        self
    }

    pub fn display_text<F>(mut self, display_text: F) -> Self
    where
        F: Fn(&dyn Record) -> String + Send + Sync + 'static,
    {
        self.display_text = Some(Arc::new(display_text));
        self
    }

    /// Field used for the display text and the default filter.
    pub fn text_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.text_attribute = Some(attribute.into());
        self
    }

    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&str, SharedQuery) -> Result<SharedQuery, SelectOptionsError>
            + Send
            + Sync
            + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    pub fn per_page(mut self, per_page: usize) -> Self {
        self.per_page = Some(per_page);
        self
    }

    /// Field rendered as the option's `id`.
    pub fn id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = Some(field.into());
        self
    }

    /// Fields echoed into each result item when the record has them.
    pub fn additional_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.additional_attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    /// Compute extra keys per record.
    pub fn additional_payload<F>(mut self, payload: F) -> Self
    where
        F: Fn(&dyn Record) -> Value + Send + Sync + 'static,
    {
        self.additional_payload = PayloadSource::Computed(Arc::new(payload));
        self
    }

    /// Set a fixed payload mapping.
    ///
    /// Fixed mappings are accepted but never merged into result items; use
    /// `additional_payload` to attach extra keys.
    pub fn static_payload(mut self, payload: Map<String, Value>) -> Self {
        self.additional_payload = PayloadSource::Static(payload);
        self
    }

    fn extract_scope(&self) -> Result<ScopeSource, SelectOptionsError> {
        self.scope.clone().ok_or_else(|| {
            SelectOptionsError::missing_option(
                "scope",
                "Pass the collection of items to render options for.",
            )
        })
    }

    fn extract_display_text(&self) -> Result<DisplayTextSource, SelectOptionsError> {
        if let Some(display_text) = &self.display_text {
            return Ok(DisplayTextSource::Custom(display_text.clone()));
        }
        self.text_attribute
            .clone()
            .map(DisplayTextSource::Attribute)
            .ok_or_else(|| {
                SelectOptionsError::missing_option(
                    "display_text or text_attribute",
                    "Either pass a function to determine the display text for a record \
                     or set the text_attribute option.",
                )
            })
    }

    fn extract_filter(&self) -> Result<FilterSource, SelectOptionsError> {
        if let Some(filter) = &self.filter {
            return Ok(FilterSource::Custom(filter.clone()));
        }
        self.text_attribute
            .clone()
            .map(FilterSource::Attribute)
            .ok_or_else(|| {
                SelectOptionsError::missing_option(
                    "filter or text_attribute",
                    "Either pass a function which filters the scope according to a given term \
                     or set the text_attribute option to apply the default contains filter.",
                )
            })
    }
}

/// Immutable, fully resolved configuration of one collection.
///
/// Shared read-only by every request served for the collection.
#[derive(Debug, Clone)]
pub struct CollectionConfig {
    pub name: String,
    pub scope: ScopeSource,
    pub display_text: DisplayTextSource,
    pub filter: FilterSource,
    pub per_page: usize,
    pub id_field: String,
    pub extra_fields: Vec<String>,
    pub payload: PayloadSource,
}

impl CollectionConfig {
    /// Resolve options into a configuration.
    ///
    /// All derivations run eagerly, so a misconfigured collection fails here
    /// rather than on its first request.
    ///
    /// # Returns
    ///
    /// * `Ok(CollectionConfig)` - The resolved configuration
    /// * `Err(SelectOptionsError::ConfigurationError)` - If a required option
    ///   is missing or an option is out of range
    pub fn from_options(
        name: impl Into<String>,
        options: CollectionOptions,
    ) -> Result<Self, SelectOptionsError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SelectOptionsError::configuration(
                "collection name cannot be empty",
            ));
        }

        let scope = options.extract_scope()?;
        let display_text = options.extract_display_text()?;
        let filter = options.extract_filter()?;

        let per_page = options.per_page.unwrap_or(DEFAULT_PER_PAGE);
        if per_page == 0 {
            return Err(SelectOptionsError::configuration(format!(
                "per_page must be greater than 0 for collection '{}'",
                name
            )));
        }

        let id_field = options
            .id_field
            .unwrap_or_else(|| DEFAULT_ID_FIELD.to_string());
        if id_field.is_empty() {
            return Err(SelectOptionsError::configuration(format!(
                "id_field cannot be empty for collection '{}'",
                name
            )));
        }

        Ok(Self {
            name,
            scope,
            display_text,
            filter,
            per_page,
            id_field,
            extra_fields: options.additional_attributes,
            payload: options.additional_payload,
        })
    }
}
