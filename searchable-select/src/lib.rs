//! # Searchable Select
//!
//! This crate serves the options of searchable, paginated select widgets.
//! A collection couples a base query with rules for filtering by a search
//! term and for rendering records; `OptionProvider` answers "page N of the
//! items matching T" with the JSON shape the widget expects.
//!
//! Storage stays with the host: queries and records are reached through the
//! `Query` and `Record` traits, and an in-memory backend is included.

pub mod config;
pub mod context;
pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod provider;
pub mod registry;
pub mod utils;

pub use config::{CollectionConfig, CollectionOptions, DEFAULT_ID_FIELD, DEFAULT_PER_PAGE};
pub use context::RequestContext;
pub use errors::SelectOptionsError;
pub use interfaces::{Query, Record, SharedQuery, SharedRecord};
pub use memory::{InMemoryQuery, JsonRecord};
pub use provider::OptionProvider;
pub use registry::OptionRegistry;
pub use searchable_select_shared::{PageResponse, Pagination, RequestParams, ResultItem};
