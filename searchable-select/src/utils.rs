//! Utility functions for coercing loosely typed request and record values.

use serde_json::{Map, Value};
use tracing::warn;

use crate::errors::SelectOptionsError;

/// Coerce a raw page parameter to a zero-based page index.
///
/// Clients send the page as a number or a string. Strings are read leniently:
/// leading whitespace is skipped, an optional sign and the leading digits are
/// taken and anything after them is ignored. Negative, missing or unparseable
/// values yield page 0; a malformed page is never an error.
///
/// # Example
///
/// ```
/// use searchable_select::utils::page_index;
/// use serde_json::json;
///
/// assert_eq!(page_index(Some(&json!("3"))), 3);
/// assert_eq!(page_index(Some(&json!("2nd"))), 2);
/// assert_eq!(page_index(Some(&json!("next"))), 0);
/// assert_eq!(page_index(None), 0);
/// ```
pub fn page_index(raw: Option<&Value>) -> usize {
    let parsed = match raw {
        None | Some(Value::Null) => return 0,
        Some(Value::Number(number)) => {
            if let Some(n) = number.as_u64() {
                Some(usize::try_from(n).unwrap_or(usize::MAX))
            } else if number.as_i64().is_some() {
                Some(0)
            } else {
                number
                    .as_f64()
                    .filter(|f| f.is_finite())
                    // `as` saturates, and negatives land on 0
                    .map(|f| f.trunc() as usize)
            }
        }
        Some(Value::String(s)) => parse_leading_integer(s),
        Some(_) => None,
    };

    parsed.unwrap_or_else(|| {
        warn!(page = ?raw, "Unparseable page parameter, serving page 0");
        0
    })
}

/// Parse the leading integer of a string, clamping negatives to 0.
///
/// Returns `None` if the string does not start with digits.
fn parse_leading_integer(s: &str) -> Option<usize> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: usize = 0;
    let mut seen_digit = false;
    for c in digits.chars() {
        let Some(d) = c.to_digit(10) else { break };
        seen_digit = true;
        value = value.saturating_mul(10).saturating_add(d as usize);
    }

    if !seen_digit {
        return None;
    }
    Some(if negative { 0 } else { value })
}

/// Render a field value as display text.
///
/// Strings are used as-is, `null` renders empty and any other value renders
/// as its JSON text.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Coerce the result of a payload function to a mapping.
///
/// Objects are taken as-is and `null` is an empty mapping. An array of
/// `[key, value]` pairs with string keys is collected into a mapping. Anything
/// else is a `PayloadError`.
pub fn payload_to_map(payload: Value) -> Result<Map<String, Value>, SelectOptionsError> {
    match payload {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        Value::Array(pairs) => pairs
            .into_iter()
            .map(|pair| match pair {
                Value::Array(mut kv) if kv.len() == 2 => {
                    let value = kv.pop().unwrap_or(Value::Null);
                    match kv.pop() {
                        Some(Value::String(key)) => Ok((key, value)),
                        other => Err(SelectOptionsError::payload(format!(
                            "payload pair key must be a string, got {:?}",
                            other
                        ))),
                    }
                }
                other => Err(SelectOptionsError::payload(format!(
                    "payload array entries must be [key, value] pairs, got {}",
                    other
                ))),
            })
            .collect(),
        other => Err(SelectOptionsError::payload(format!(
            "payload must be an object, got {}",
            other
        ))),
    }
}
