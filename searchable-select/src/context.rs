//! Ambient request context handed to scope resolvers.

use serde_json::{Map, Value};

/// What a scope resolver may know about the request it serves.
///
/// Hosts fill this from their session and routing layers, for example with the
/// signed-in user and the current tenant, so that resolvers can restrict the
/// candidate set without reaching for global state.
///
/// # Example
///
/// ```
/// use searchable_select::RequestContext;
///
/// let ctx = RequestContext::new()
///     .with_actor("user-42")
///     .with_tenant("acme")
///     .with_value("locale", "de");
///
/// assert_eq!(ctx.actor(), Some("user-42"));
/// assert_eq!(ctx.value("locale").and_then(|v| v.as_str()), Some("de"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestContext {
    actor: Option<String>,
    tenant: Option<String>,
    values: Map<String, Value>,
}

impl RequestContext {
    /// Create an anonymous context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the acting user.
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// Set the tenant the request runs in.
    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    /// Attach an arbitrary host value.
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn actor(&self) -> Option<&str> {
        self.actor.as_deref()
    }

    pub fn tenant(&self) -> Option<&str> {
        self.tenant.as_deref()
    }

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }
}
