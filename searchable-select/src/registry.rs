//! Registry of named option collections.
//!
//! Hosts register every collection once at startup and dispatch widget
//! requests by the collection's action name.

use std::collections::HashMap;
use std::sync::Arc;

use searchable_select_shared::{PageResponse, RequestParams};
use tracing::info;

use crate::config::CollectionOptions;
use crate::context::RequestContext;
use crate::errors::SelectOptionsError;
use crate::provider::OptionProvider;

/// All option collections of an application, keyed by action name.
///
/// Registration needs `&mut self`; serving only reads, so a registry can be
/// shared behind an `Arc` once startup is done.
#[derive(Debug, Default)]
pub struct OptionRegistry {
    providers: HashMap<String, Arc<OptionProvider>>,
}

impl OptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and register the collection `name`.
    ///
    /// # Returns
    ///
    /// * `Ok(Arc<OptionProvider>)` - The registered provider
    /// * `Err(SelectOptionsError::ConfigurationError)` - If the options are invalid
    /// * `Err(SelectOptionsError::DuplicateCollection)` - If `name` is taken
    pub fn register(
        &mut self,
        name: impl Into<String>,
        options: CollectionOptions,
    ) -> Result<Arc<OptionProvider>, SelectOptionsError> {
        let provider = OptionProvider::new(name, options)?;
        let action_name = provider.collection_action_name();

        if self.providers.contains_key(&action_name) {
            return Err(SelectOptionsError::duplicate_collection(provider.name()));
        }

        info!(
            collection = %provider.name(),
            action = %action_name,
            per_page = provider.per_page(),
            "Registered option collection"
        );

        let provider = Arc::new(provider);
        self.providers.insert(action_name, provider.clone());
        Ok(provider)
    }

    /// Look up a collection by its action name, e.g. `"author_options"`.
    pub fn get(&self, action_name: &str) -> Option<Arc<OptionProvider>> {
        self.providers.get(action_name).cloned()
    }

    /// Registered action names, sorted.
    pub fn action_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Serve a request addressed to `action_name`.
    ///
    /// # Returns
    ///
    /// * `Ok(PageResponse)` - The requested page
    /// * `Err(SelectOptionsError::UnknownCollection)` - If nothing is registered
    ///   under `action_name`
    /// * `Err(SelectOptionsError)` - Any error of `OptionProvider::as_json`
    pub async fn respond(
        &self,
        action_name: &str,
        ctx: &RequestContext,
        params: &RequestParams,
    ) -> Result<PageResponse, SelectOptionsError> {
        let provider = self
            .providers
            .get(action_name)
            .ok_or_else(|| SelectOptionsError::unknown_collection(action_name))?;
        provider.as_json(ctx, params).await
    }
}
