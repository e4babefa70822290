//! # Searchable Select Shared
//!
//! This crate defines the wire types exchanged with the client-side
//! autocomplete widget: the incoming request parameters and the paginated
//! JSON response.

pub mod types;

pub use types::page_response::{PageResponse, Pagination};
pub use types::request_params::RequestParams;
pub use types::result_item::ResultItem;
