//! Interface definitions for the collaborators of an option collection.
//!
//! The provider never touches a database directly. Hosts plug in their query
//! builder through `Query` and expose their entities through `Record`.

mod query;
mod record;

pub use query::{Query, SharedQuery};
pub use record::{Record, SharedRecord};
