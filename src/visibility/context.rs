//! Per-request evaluation context handed to visibility predicates.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque, read-only bag of request-scoped data.
///
/// Constructed once at the start of a discovery call (typically from caller
/// identity and feature-flag data supplied by the auth collaborator), shared
/// unmutated across every predicate invocation in that call, and discarded at
/// its end. Never persisted.
///
/// # Example
///
/// ```rust
/// use aperture::visibility::EvaluationContext;
///
/// let ctx = EvaluationContext::new()
///     .with("is_admin", true)
///     .with("org", "acme");
///
/// assert!(ctx.flag("is_admin"));
/// assert_eq!(ctx.get("org").and_then(|v| v.as_str()), Some("acme"));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluationContext {
    #[serde(flatten)]
    values: HashMap<String, Value>,
}

impl EvaluationContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from a JSON object. Non-object values yield an empty
    /// context.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self {
                values: map.into_iter().collect(),
            },
            _ => Self::default(),
        }
    }

    /// Builder: attach a value.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Get a value by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Read a boolean feature flag. Missing or non-boolean values are `false`.
    pub fn flag(&self, key: &str) -> bool {
        self.values.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Whether the context carries any data.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
