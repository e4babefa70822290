//! Option provider error types.
//!
//! Configuration errors are raised once, when a collection is built. Every
//! other variant is raised while serving a request and is passed through to
//! the host unchanged.

use thiserror::Error;

/// Unified errors from option collections.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SelectOptionsError {
    /// A required option is missing or an option has an invalid value.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// A record does not expose a field that had to be read.
    #[error("Missing field: {0}")]
    MissingField(String),

    /// The query backend failed to filter or fetch records.
    #[error("Query error: {0}")]
    QueryError(String),

    /// A value could not be turned into a record.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// A scope resolver could not build the base query.
    #[error("Resolver error: {0}")]
    ResolverError(String),

    /// The additional payload could not be coerced to a mapping.
    #[error("Payload error: {0}")]
    PayloadError(String),

    /// A collection with the same name is already registered.
    #[error("Collection already registered: {0}")]
    DuplicateCollection(String),

    /// No collection is registered under the requested action name.
    #[error("Unknown collection action: {0}")]
    UnknownCollection(String),

    /// Failed to serialize a response.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl SelectOptionsError {
    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    /// Create a missing option error.
    pub fn missing_option(option: &str, hint: &str) -> Self {
        Self::ConfigurationError(format!("Missing option: {}. {}", option, hint))
    }

    /// Create a missing field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    /// Create a query error.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::QueryError(msg.into())
    }

    /// Create an invalid record error.
    pub fn invalid_record(msg: impl Into<String>) -> Self {
        Self::InvalidRecord(msg.into())
    }

    /// Create a resolver error.
    pub fn resolver(msg: impl Into<String>) -> Self {
        Self::ResolverError(msg.into())
    }

    /// Create a payload error.
    pub fn payload(msg: impl Into<String>) -> Self {
        Self::PayloadError(msg.into())
    }

    /// Create a duplicate collection error.
    pub fn duplicate_collection(name: impl Into<String>) -> Self {
        Self::DuplicateCollection(name.into())
    }

    /// Create an unknown collection error.
    pub fn unknown_collection(action_name: impl Into<String>) -> Self {
        Self::UnknownCollection(action_name.into())
    }

    /// Returns true for errors raised while building a collection.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::ConfigurationError(_))
    }
}

impl From<serde_json::Error> for SelectOptionsError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
