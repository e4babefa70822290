//! In-memory implementation of the `Query` trait.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::trace;

use crate::errors::SelectOptionsError;
use crate::interfaces::{Query, SharedQuery, SharedRecord};
use crate::memory::record::JsonRecord;
use crate::utils::value_to_text;

#[derive(Debug, Clone)]
enum Predicate {
    /// Case-insensitive substring match on the field's display text.
    Contains { attribute: String, needle: String },
    Equals { field: String, value: Value },
}

impl Predicate {
    fn matches(&self, record: &SharedRecord) -> bool {
        match self {
            Self::Contains { attribute, needle } => record
                .field(attribute)
                .map(|value| value_to_text(&value).to_lowercase().contains(needle))
                .unwrap_or(false),
            Self::Equals { field, value } => record.field(field).as_ref() == Some(value),
        }
    }
}

/// A lazy query over records held in memory.
///
/// Builder calls only record what to do. `fetch` applies the predicates,
/// then the ordering, then the offset and finally the limit, whatever order
/// the calls were made in.
///
/// # Example
///
/// ```
/// use searchable_select::{InMemoryQuery, JsonRecord, Query};
/// use serde_json::json;
///
/// # async fn example() -> Result<(), searchable_select::SelectOptionsError> {
/// let query = InMemoryQuery::new(vec![
///     JsonRecord::from_value(json!({ "id": 1, "name": "Ada" }))?,
///     JsonRecord::from_value(json!({ "id": 2, "name": "Grace" }))?,
/// ]);
///
/// let records = query.contains("name", "gr")?.fetch().await?;
/// assert_eq!(records.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct InMemoryQuery {
    records: Arc<Vec<SharedRecord>>,
    predicates: Vec<Predicate>,
    order_by: Option<String>,
    limit: Option<usize>,
    offset: usize,
}

impl InMemoryQuery {
    /// Create a query over JSON records.
    pub fn new(records: Vec<JsonRecord>) -> Self {
        Self::from_records(
            records
                .into_iter()
                .map(|record| Arc::new(record) as SharedRecord)
                .collect(),
        )
    }

    /// Create a query over records of any type.
    pub fn from_records(records: Vec<SharedRecord>) -> Self {
        Self {
            records: Arc::new(records),
            predicates: Vec::new(),
            order_by: None,
            limit: None,
            offset: 0,
        }
    }

    /// Keep only records whose `field` equals `value`.
    pub fn where_eq(&self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut next = self.clone();
        next.predicates.push(Predicate::Equals {
            field: field.into(),
            value: value.into(),
        });
        next
    }

    /// Sort ascending by `field`. Records without the field sort last.
    pub fn order_by(&self, field: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.order_by = Some(field.into());
        next
    }

    /// Number of records before any predicate or window is applied.
    pub fn total_records(&self) -> usize {
        self.records.len()
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(x), Some(y)) => value_to_text(x).cmp(&value_to_text(y)),
    }
}

#[async_trait]
impl Query for InMemoryQuery {
    fn contains(&self, attribute: &str, term: &str) -> Result<SharedQuery, SelectOptionsError> {
        let mut next = self.clone();
        next.predicates.push(Predicate::Contains {
            attribute: attribute.to_string(),
            needle: term.to_lowercase(),
        });
        Ok(Arc::new(next))
    }

    fn limit(&self, limit: usize) -> SharedQuery {
        let mut next = self.clone();
        next.limit = Some(limit);
        Arc::new(next)
    }

    fn offset(&self, offset: usize) -> SharedQuery {
        let mut next = self.clone();
        next.offset = offset;
        Arc::new(next)
    }

    async fn fetch(&self) -> Result<Vec<SharedRecord>, SelectOptionsError> {
        let mut matching: Vec<SharedRecord> = self
            .records
            .iter()
            .filter(|record| {
                self.predicates
                    .iter()
                    .all(|predicate| predicate.matches(record))
            })
            .cloned()
            .collect();

        if let Some(field) = &self.order_by {
            let mut keyed: Vec<(Option<Value>, SharedRecord)> = matching
                .into_iter()
                .map(|record| (record.field(field), record))
                .collect();
            keyed.sort_by(|(a, _), (b, _)| compare_values(a.as_ref(), b.as_ref()));
            matching = keyed.into_iter().map(|(_, record)| record).collect();
        }

        let records: Vec<SharedRecord> = matching
            .into_iter()
            .skip(self.offset)
            .take(self.limit.unwrap_or(usize::MAX))
            .collect();

        trace!(
            offset = self.offset,
            limit = ?self.limit,
            fetched = records.len(),
            "Fetched in-memory records"
        );

        Ok(records)
    }
}
