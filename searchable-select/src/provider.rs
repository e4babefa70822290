//! Option provider implementation.
//!
//! This module turns a widget request into one page of options:
//! resolve the scope, narrow it by the search term, fetch one window with a
//! single look-ahead row, and project every record to a result item.

use searchable_select_shared::{PageResponse, RequestParams, ResultItem};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::{
    CollectionConfig, CollectionOptions, DisplayTextSource, FilterSource, PayloadSource,
    ScopeSource,
};
use crate::context::RequestContext;
use crate::errors::SelectOptionsError;
use crate::interfaces::{Query, Record, SharedQuery, SharedRecord};
use crate::utils::{page_index, payload_to_map, value_to_text};

/// Serves paginated, searchable options for one named collection.
///
/// The provider is immutable after construction and holds no per-request
/// state, so one instance can serve concurrent requests behind an `Arc`.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use searchable_select::{
///     CollectionOptions, InMemoryQuery, JsonRecord, OptionProvider, RequestContext,
/// };
/// use searchable_select_shared::RequestParams;
/// use serde_json::json;
///
/// # async fn example() -> Result<(), searchable_select::SelectOptionsError> {
/// let authors = InMemoryQuery::new(vec![
///     JsonRecord::from_value(json!({ "id": 1, "name": "Tolkien" }))?,
///     JsonRecord::from_value(json!({ "id": 2, "name": "Pratchett" }))?,
/// ]);
///
/// let provider = OptionProvider::new(
///     "author",
///     CollectionOptions::new()
///         .scope(Arc::new(authors))
///         .text_attribute("name"),
/// )?;
///
/// let page = provider
///     .as_json(&RequestContext::new(), &RequestParams::new().with_term("tolk"))
///     .await?;
///
/// assert_eq!(
///     page.to_value()?,
///     json!({ "results": [{ "id": 1, "text": "Tolkien" }], "pagination": { "more": false } })
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct OptionProvider {
    config: CollectionConfig,
}

impl OptionProvider {
    /// Create a provider for the collection `name`.
    ///
    /// # Returns
    ///
    /// * `Ok(OptionProvider)` - A provider ready to serve requests
    /// * `Err(SelectOptionsError::ConfigurationError)` - If `scope` is missing,
    ///   if neither `display_text` nor `text_attribute` is set, if neither
    ///   `filter` nor `text_attribute` is set, or if an option is out of range
    pub fn new(
        name: impl Into<String>,
        options: CollectionOptions,
    ) -> Result<Self, SelectOptionsError> {
        CollectionConfig::from_options(name, options).map(Self::from_config)
    }

    /// Create a provider from an already resolved configuration.
    pub fn from_config(config: CollectionConfig) -> Self {
        Self { config }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    pub fn per_page(&self) -> usize {
        self.config.per_page
    }

    /// The name under which hosts expose this collection's endpoint.
    pub fn collection_action_name(&self) -> String {
        format!("{}_options", self.config.name)
    }

    /// Resolve the base query for a request.
    ///
    /// A fixed scope is returned as-is and ignores `params`. Resolvers are
    /// called with the context, plus the parameters if they take them.
    pub fn scope(
        &self,
        ctx: &RequestContext,
        params: &RequestParams,
    ) -> Result<SharedQuery, SelectOptionsError> {
        match &self.config.scope {
            ScopeSource::Fixed(query) => Ok(query.clone()),
            ScopeSource::Context(resolve) => resolve(ctx),
            ScopeSource::ContextWithParams(resolve) => resolve(ctx, params),
        }
    }

    /// Compute the display text of a record.
    pub fn display_text(&self, record: &dyn Record) -> Result<String, SelectOptionsError> {
        match &self.config.display_text {
            DisplayTextSource::Custom(display_text) => Ok(display_text(record)),
            DisplayTextSource::Attribute(attribute) => record
                .field(attribute)
                .map(|value| value_to_text(&value))
                .ok_or_else(|| SelectOptionsError::missing_field(attribute.as_str())),
        }
    }

    /// Narrow `scope` by `term`.
    ///
    /// An absent term leaves the scope untouched. An empty term is still a
    /// term and goes through the filter.
    pub fn filter(
        &self,
        scope: SharedQuery,
        term: Option<&str>,
    ) -> Result<SharedQuery, SelectOptionsError> {
        let Some(term) = term else {
            return Ok(scope);
        };
        match &self.config.filter {
            FilterSource::Custom(filter) => filter(term, scope),
            FilterSource::Attribute(attribute) => scope.contains(attribute, term),
        }
    }

    /// Fetch one page of `query`.
    ///
    /// Reads `per_page + 1` rows starting at `page * per_page`. The extra row
    /// only decides whether another page exists and is dropped, so no count
    /// query is needed.
    ///
    /// # Returns
    ///
    /// * `Ok((records, more))` - At most `per_page` records, and whether more follow
    /// * `Err(SelectOptionsError)` - If the fetch fails
    pub async fn paginate(
        &self,
        query: &dyn Query,
        page: Option<&Value>,
    ) -> Result<(Vec<SharedRecord>, bool), SelectOptionsError> {
        self.fetch_page(query, page_index(page)).await
    }

    async fn fetch_page(
        &self,
        query: &dyn Query,
        page: usize,
    ) -> Result<(Vec<SharedRecord>, bool), SelectOptionsError> {
        let per_page = self.config.per_page;
        let offset = page.saturating_mul(per_page);

        let mut records = query
            .limit(per_page.saturating_add(1))
            .offset(offset)
            .fetch()
            .await?;

        let more = records.len() > per_page;
        records.truncate(per_page);

        Ok((records, more))
    }

    /// Project a record to its `id`, `text` and extra fields.
    ///
    /// Extra fields the record does not expose are skipped.
    pub fn record_as_json(&self, record: &dyn Record) -> Result<ResultItem, SelectOptionsError> {
        let id = record
            .field(&self.config.id_field)
            .ok_or_else(|| SelectOptionsError::missing_field(self.config.id_field.as_str()))?;
        let mut item = ResultItem::new(id, self.display_text(record)?);

        for name in &self.config.extra_fields {
            if !record.has_field(name) {
                continue;
            }
            if let Some(value) = record.field(name) {
                item.insert(name.as_str(), value);
            }
        }

        Ok(item)
    }

    /// Extra keys to merge into the record's result item.
    ///
    /// Only a payload function produces keys to merge. Returns `None` if the
    /// collection has no payload or a static mapping.
    pub fn additional_payload(
        &self,
        record: &dyn Record,
    ) -> Result<Option<Map<String, Value>>, SelectOptionsError> {
        if self.config.payload.is_empty() {
            return Ok(None);
        }
        match &self.config.payload {
            PayloadSource::Absent | PayloadSource::Static(_) => Ok(None),
            PayloadSource::Computed(payload) => payload_to_map(payload(record)).map(Some),
        }
    }

    /// Serve one page of options.
    ///
    /// # Arguments
    ///
    /// * `ctx` - Ambient context handed to the scope resolver
    /// * `params` - The widget's `term`, `page` and any extra parameters
    ///
    /// # Returns
    ///
    /// * `Ok(PageResponse)` - The page, ready to be serialized for the widget
    /// * `Err(SelectOptionsError)` - If scope resolution, filtering, fetching
    ///   or projection fails
    pub async fn as_json(
        &self,
        ctx: &RequestContext,
        params: &RequestParams,
    ) -> Result<PageResponse, SelectOptionsError> {
        let scope = self.scope(ctx, params)?;
        let scope = self.filter(scope, params.term.as_deref())?;
        let page = page_index(params.page.as_ref());
        let (records, more) = self.fetch_page(scope.as_ref(), page).await?;

        let results = records
            .iter()
            .map(|record| {
                let mut item = self.record_as_json(record.as_ref())?;
                if let Some(payload) = self.additional_payload(record.as_ref())? {
                    item.merge(payload);
                }
                Ok(item)
            })
            .collect::<Result<Vec<_>, SelectOptionsError>>()?;

        debug!(
            collection = %self.config.name,
            page,
            has_term = params.term.is_some(),
            results = results.len(),
            more,
            "Served options page"
        );

        Ok(PageResponse::new(results, more))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{InMemoryQuery, JsonRecord};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn numbered(count: usize) -> InMemoryQuery {
        InMemoryQuery::new(
            (1..=count)
                .map(|i| {
                    JsonRecord::from_value(json!({ "id": i, "name": format!("Item {}", i) }))
                        .unwrap()
                })
                .collect(),
        )
    }

    fn provider_over(query: InMemoryQuery) -> OptionProvider {
        OptionProvider::new(
            "item",
            CollectionOptions::new()
                .scope(Arc::new(query))
                .text_attribute("name"),
        )
        .unwrap()
    }

    /// Query wrapper recording the terms it was filtered with and the windows it fetched.
    struct RecordingQuery {
        inner: SharedQuery,
        terms: Arc<Mutex<Vec<String>>>,
        windows: Arc<Mutex<Vec<(Option<usize>, Option<usize>)>>>,
        limit: Option<usize>,
        offset: Option<usize>,
    }

    impl RecordingQuery {
        fn wrap(inner: SharedQuery) -> Self {
            Self {
                inner,
                terms: Arc::new(Mutex::new(Vec::new())),
                windows: Arc::new(Mutex::new(Vec::new())),
                limit: None,
                offset: None,
            }
        }

        fn derive(&self, inner: SharedQuery) -> Self {
            Self {
                inner,
                terms: self.terms.clone(),
                windows: self.windows.clone(),
                limit: self.limit,
                offset: self.offset,
            }
        }
    }

    #[async_trait]
    impl Query for RecordingQuery {
        fn contains(
            &self,
            attribute: &str,
            term: &str,
        ) -> Result<SharedQuery, SelectOptionsError> {
            self.terms.lock().unwrap().push(term.to_string());
            Ok(Arc::new(self.derive(self.inner.contains(attribute, term)?)))
        }

        fn limit(&self, limit: usize) -> SharedQuery {
            let mut next = self.derive(self.inner.limit(limit));
            next.limit = Some(limit);
            Arc::new(next)
        }

        fn offset(&self, offset: usize) -> SharedQuery {
            let mut next = self.derive(self.inner.offset(offset));
            next.offset = Some(offset);
            Arc::new(next)
        }

        async fn fetch(&self) -> Result<Vec<SharedRecord>, SelectOptionsError> {
            self.windows.lock().unwrap().push((self.limit, self.offset));
            self.inner.fetch().await
        }
    }

    struct FailingQuery;

    #[async_trait]
    impl Query for FailingQuery {
        fn contains(&self, _: &str, _: &str) -> Result<SharedQuery, SelectOptionsError> {
            Err(SelectOptionsError::query("unknown attribute"))
        }

        fn limit(&self, _: usize) -> SharedQuery {
            Arc::new(FailingQuery)
        }

        fn offset(&self, _: usize) -> SharedQuery {
            Arc::new(FailingQuery)
        }

        async fn fetch(&self) -> Result<Vec<SharedRecord>, SelectOptionsError> {
            Err(SelectOptionsError::query("connection reset"))
        }
    }

    #[test]
    fn test_collection_action_name() {
        let provider = OptionProvider::new(
            "author",
            CollectionOptions::new()
                .scope(Arc::new(numbered(0)))
                .text_attribute("name"),
        )
        .unwrap();

        assert_eq!(provider.collection_action_name(), "author_options");
        assert_eq!(provider.name(), "author");
    }

    #[tokio::test]
    async fn test_pages_over_twenty_five_records() {
        let provider = provider_over(numbered(25));
        let ctx = RequestContext::new();

        let expectations = [(0, 10, true), (1, 10, true), (2, 5, false), (3, 0, false)];
        for (page, count, more) in expectations {
            let response = provider
                .as_json(&ctx, &RequestParams::new().with_page(page))
                .await
                .unwrap();
            assert_eq!(response.len(), count, "page {}", page);
            assert_eq!(response.has_more(), more, "page {}", page);
        }
    }

    #[tokio::test]
    async fn test_page_boundary_exact_multiple() {
        let provider = provider_over(numbered(20));
        let ctx = RequestContext::new();

        let page1 = provider
            .as_json(&ctx, &RequestParams::new().with_page("1"))
            .await
            .unwrap();
        assert_eq!(page1.len(), 10);
        assert!(!page1.has_more());
    }

    #[tokio::test]
    async fn test_paginate_fetches_one_look_ahead_row() {
        let recording = RecordingQuery::wrap(Arc::new(numbered(25)));
        let windows = recording.windows.clone();
        let provider = provider_over(numbered(0));

        let (records, more) = provider
            .paginate(&recording, Some(&json!(2)))
            .await
            .unwrap();

        assert_eq!(records.len(), 5);
        assert!(!more);
        assert_eq!(*windows.lock().unwrap(), vec![(Some(11), Some(20))]);
    }

    #[tokio::test]
    async fn test_malformed_page_serves_first_page() {
        let provider = provider_over(numbered(25));
        let ctx = RequestContext::new();

        for page in [json!("abc"), json!(-4), json!(null), json!(true)] {
            let response = provider
                .as_json(&ctx, &RequestParams::new().with_page(page.clone()))
                .await
                .unwrap();
            assert_eq!(response.results[0].id(), Some(&json!(1)), "page {}", page);
        }
    }

    #[tokio::test]
    async fn test_absent_term_skips_filter_and_empty_term_runs_it() {
        let recording = RecordingQuery::wrap(Arc::new(numbered(3)));
        let terms = recording.terms.clone();
        let provider = OptionProvider::new(
            "item",
            CollectionOptions::new()
                .scope(Arc::new(recording))
                .text_attribute("name"),
        )
        .unwrap();
        let ctx = RequestContext::new();

        let unfiltered = provider.as_json(&ctx, &RequestParams::new()).await.unwrap();
        assert_eq!(unfiltered.len(), 3);
        assert!(terms.lock().unwrap().is_empty());

        let empty_term = provider
            .as_json(&ctx, &RequestParams::new().with_term(""))
            .await
            .unwrap();
        assert_eq!(empty_term.len(), 3);
        assert_eq!(*terms.lock().unwrap(), vec![String::new()]);
    }

    #[tokio::test]
    async fn test_custom_filter_receives_term_and_scope() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_by_filter = seen.clone();
        let provider = OptionProvider::new(
            "item",
            CollectionOptions::new()
                .scope(Arc::new(numbered(12)))
                .display_text(|record| {
                    record
                        .field("name")
                        .map(|v| value_to_text(&v))
                        .unwrap_or_default()
                })
                .filter(move |term, scope| {
                    seen_by_filter.lock().unwrap().push(term.to_string());
                    scope.contains("name", &format!("{} 1", term))
                }),
        )
        .unwrap();

        let response = provider
            .as_json(&RequestContext::new(), &RequestParams::new().with_term("item"))
            .await
            .unwrap();

        let texts: Vec<_> = response.results.iter().filter_map(|r| r.text()).collect();
        assert_eq!(texts, vec!["Item 1", "Item 10", "Item 11", "Item 12"]);
        assert_eq!(*seen.lock().unwrap(), vec!["item".to_string()]);
    }

    #[tokio::test]
    async fn test_scope_sources() {
        let ctx = RequestContext::new().with_tenant("b");
        let params = RequestParams::new().with_param("team", "a");
        let records = InMemoryQuery::new(vec![
            JsonRecord::from_value(json!({ "id": 1, "name": "One", "team": "a", "tenant": "b" }))
                .unwrap(),
            JsonRecord::from_value(json!({ "id": 2, "name": "Two", "team": "b", "tenant": "b" }))
                .unwrap(),
            JsonRecord::from_value(json!({ "id": 3, "name": "Three", "team": "a", "tenant": "c" }))
                .unwrap(),
        ]);

        let fixed = provider_over(records.clone());
        let fixed_ids = fixed.scope(&ctx, &params).unwrap().fetch().await.unwrap();
        assert_eq!(fixed_ids.len(), 3);

        let by_tenant = records.clone();
        let context_only = OptionProvider::new(
            "item",
            CollectionOptions::new()
                .scope_fn(move |ctx| {
                    let tenant = ctx
                        .tenant()
                        .ok_or_else(|| SelectOptionsError::resolver("no tenant"))?;
                    Ok(Arc::new(by_tenant.where_eq("tenant", tenant)) as SharedQuery)
                })
                .text_attribute("name"),
        )
        .unwrap();
        let scoped = context_only.scope(&ctx, &params).unwrap().fetch().await.unwrap();
        assert_eq!(scoped.len(), 2);
        assert!(matches!(
            context_only.scope(&RequestContext::new(), &params),
            Err(SelectOptionsError::ResolverError(_))
        ));

        let by_params = records.clone();
        let with_params = OptionProvider::new(
            "item",
            CollectionOptions::new()
                .scope_with_params(move |ctx, params| {
                    let mut query = by_params.clone();
                    if let Some(tenant) = ctx.tenant() {
                        query = query.where_eq("tenant", tenant);
                    }
                    if let Some(team) = params.param("team") {
                        query = query.where_eq("team", team.clone());
                    }
                    Ok(Arc::new(query) as SharedQuery)
                })
                .text_attribute("name"),
        )
        .unwrap();
        let narrowed = with_params.scope(&ctx, &params).unwrap().fetch().await.unwrap();
        assert_eq!(narrowed.len(), 1);
        assert_eq!(narrowed[0].field("id"), Some(json!(1)));
    }

    #[test]
    fn test_record_as_json_skips_absent_extra_fields() {
        let provider = OptionProvider::new(
            "user",
            CollectionOptions::new()
                .scope(Arc::new(numbered(0)))
                .text_attribute("name")
                .additional_attributes(["email", "nickname", "role"]),
        )
        .unwrap();
        let record =
            JsonRecord::from_value(json!({ "id": 9, "name": "Ada", "role": "admin", "email": null }))
                .unwrap();

        let item = provider.record_as_json(&record).unwrap();

        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            json!({ "id": 9, "text": "Ada", "email": null, "role": "admin" })
        );
        assert!(!item.contains_key("nickname"));
        assert_eq!(
            item.keys().collect::<Vec<_>>(),
            vec!["id", "text", "email", "role"]
        );
    }

    #[test]
    fn test_record_as_json_custom_id_field() {
        let provider = OptionProvider::new(
            "user",
            CollectionOptions::new()
                .scope(Arc::new(numbered(0)))
                .text_attribute("name")
                .id_field("slug"),
        )
        .unwrap();
        let record = JsonRecord::from_value(json!({ "id": 9, "slug": "ada", "name": "Ada" }))
            .unwrap();

        let item = provider.record_as_json(&record).unwrap();
        assert_eq!(item.id(), Some(&json!("ada")));
    }

    #[test]
    fn test_record_as_json_missing_id_or_text_attribute() {
        let provider = provider_over(numbered(0));

        let no_id = JsonRecord::from_value(json!({ "name": "Ada" })).unwrap();
        assert_eq!(
            provider.record_as_json(&no_id).unwrap_err(),
            SelectOptionsError::missing_field("id")
        );

        let no_name = JsonRecord::from_value(json!({ "id": 1 })).unwrap();
        assert_eq!(
            provider.record_as_json(&no_name).unwrap_err(),
            SelectOptionsError::missing_field("name")
        );
    }

    #[test]
    fn test_display_text_from_non_string_attribute() {
        let provider = provider_over(numbered(0));
        let record = JsonRecord::from_value(json!({ "id": 1, "name": 1984 })).unwrap();
        assert_eq!(provider.display_text(&record).unwrap(), "1984");
    }

    #[tokio::test]
    async fn test_payload_is_merged_on_top() {
        let provider = OptionProvider::new(
            "item",
            CollectionOptions::new()
                .scope(Arc::new(numbered(2)))
                .text_attribute("name")
                .additional_payload(|record| {
                    json!({
                        "text": "overridden",
                        "double": record.field("id").and_then(|v| v.as_u64()).map(|n| n * 2),
                    })
                }),
        )
        .unwrap();

        let response = provider
            .as_json(&RequestContext::new(), &RequestParams::new())
            .await
            .unwrap();

        assert_eq!(
            response.to_value().unwrap(),
            json!({
                "results": [
                    { "id": 1, "text": "overridden", "double": 2 },
                    { "id": 2, "text": "overridden", "double": 4 }
                ],
                "pagination": { "more": false }
            })
        );
    }

    #[test]
    fn test_additional_payload_sources() {
        let record = JsonRecord::from_value(json!({ "id": 1, "name": "One" })).unwrap();

        let absent = provider_over(numbered(0));
        assert_eq!(absent.additional_payload(&record).unwrap(), None);

        let empty_static = OptionProvider::new(
            "item",
            CollectionOptions::new()
                .scope(Arc::new(numbered(0)))
                .text_attribute("name")
                .static_payload(Map::new()),
        )
        .unwrap();
        assert_eq!(empty_static.additional_payload(&record).unwrap(), None);

        let mut constant = Map::new();
        constant.insert("kind".to_string(), json!("item"));
        let static_payload = OptionProvider::new(
            "item",
            CollectionOptions::new()
                .scope(Arc::new(numbered(0)))
                .text_attribute("name")
                .static_payload(constant),
        )
        .unwrap();
        assert_eq!(static_payload.additional_payload(&record).unwrap(), None);

        let null_payload = OptionProvider::new(
            "item",
            CollectionOptions::new()
                .scope(Arc::new(numbered(0)))
                .text_attribute("name")
                .additional_payload(|_| Value::Null),
        )
        .unwrap();
        assert_eq!(
            null_payload.additional_payload(&record).unwrap(),
            Some(Map::new())
        );

        let bad_payload = OptionProvider::new(
            "item",
            CollectionOptions::new()
                .scope(Arc::new(numbered(0)))
                .text_attribute("name")
                .additional_payload(|_| json!("nope")),
        )
        .unwrap();
        assert!(matches!(
            bad_payload.additional_payload(&record),
            Err(SelectOptionsError::PayloadError(_))
        ));
    }

    #[tokio::test]
    async fn test_static_payload_is_never_merged() {
        let mut constant = Map::new();
        constant.insert("text".to_string(), json!("STATIC"));
        let records = InMemoryQuery::new(vec![
            JsonRecord::from_value(json!({ "id": 1, "name": "One" })).unwrap(),
        ]);
        let provider = OptionProvider::new(
            "item",
            CollectionOptions::new()
                .scope(Arc::new(records))
                .text_attribute("name")
                .static_payload(constant),
        )
        .unwrap();

        let response = provider
            .as_json(&RequestContext::new(), &RequestParams::new())
            .await
            .unwrap();

        assert_eq!(
            response.to_json_string().unwrap(),
            r#"{"results":[{"id":1,"text":"One"}],"pagination":{"more":false}}"#
        );
    }

    #[tokio::test]
    async fn test_collaborator_errors_propagate() {
        let provider = OptionProvider::new(
            "item",
            CollectionOptions::new()
                .scope(Arc::new(FailingQuery))
                .text_attribute("name"),
        )
        .unwrap();
        let ctx = RequestContext::new();

        let fetch_err = provider.as_json(&ctx, &RequestParams::new()).await.unwrap_err();
        assert_eq!(fetch_err, SelectOptionsError::query("connection reset"));

        let filter_err = provider
            .as_json(&ctx, &RequestParams::new().with_term("x"))
            .await
            .unwrap_err();
        assert_eq!(filter_err, SelectOptionsError::query("unknown attribute"));
    }

    #[tokio::test]
    async fn test_as_json_is_idempotent() {
        let provider = provider_over(numbered(25));
        let ctx = RequestContext::new();
        let params = RequestParams::new().with_term("1").with_page("0");

        let first = provider.as_json(&ctx, &params).await.unwrap();
        let second = provider.as_json(&ctx, &params).await.unwrap();

        assert_eq!(
            first.to_json_string().unwrap(),
            second.to_json_string().unwrap()
        );
    }
}
