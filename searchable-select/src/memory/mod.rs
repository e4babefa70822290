//! In-memory query backend.
//!
//! `InMemoryQuery` serves option collections from records held in memory,
//! for tests, fixtures and small static lists that do not live in a database.

mod query;
mod record;

pub use query::InMemoryQuery;
pub use record::JsonRecord;
