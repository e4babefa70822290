//! This module defines the request and response types of the option endpoint.
//! It re-exports `RequestParams`, `ResultItem` and `PageResponse`.

pub mod page_response;
pub mod request_params;
pub mod result_item;

pub use page_response::{PageResponse, Pagination};
pub use request_params::RequestParams;
pub use result_item::ResultItem;
