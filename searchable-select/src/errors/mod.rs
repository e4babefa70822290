//! Error types for the option provider.
//!
//! This module provides a unified error type for configuration, collaborator
//! and registry failures.

mod select_options_error;

pub use select_options_error::SelectOptionsError;
