//! Capability entry definitions — the units served by a disclosure-aware server.
//!
//! A capability is a tool, resource, or prompt registered on the server. Each
//! entry carries its public metadata (name/URI, description, schema), a
//! [`Visibility`] deciding whether it appears in discovery listings, and an
//! optional handler used when the entry is invoked or read directly by exact
//! identifier. Visibility never gates direct invocation.

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::visibility::EvaluationContext;

// ---------------------------------------------------------------------------
// Shared closure aliases
// ---------------------------------------------------------------------------

/// Boxed error type used by predicates and handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A visibility predicate evaluated against the per-request context.
///
/// Returns `true` when the entry should be *hidden* from discovery listings.
/// Shared by `Arc` so the same rule can be attached to several entries; the
/// evaluator runs each distinct `Arc` at most once per discovery call.
pub type VisibilityPredicate =
    Arc<dyn Fn(Arc<EvaluationContext>) -> BoxFuture<'static, Result<bool, BoxError>> + Send + Sync>;

/// Handler invoked when a tool is called directly by name.
pub type ToolHandler =
    Arc<dyn Fn(Arc<EvaluationContext>, Value) -> BoxFuture<'static, Result<Value, BoxError>> + Send + Sync>;

/// Reader invoked when a resource is read directly by URI.
pub type ResourceReader =
    Arc<dyn Fn(Arc<EvaluationContext>) -> BoxFuture<'static, Result<String, BoxError>> + Send + Sync>;

// ---------------------------------------------------------------------------
// Visibility
// ---------------------------------------------------------------------------

/// Discovery visibility of a capability entry.
///
/// Evaluation switches on the variant, never on runtime type probing:
///
/// - `Always`: the entry was declared without a visibility rule.
/// - `Static(true)`: hidden from every listing; `Static(false)`: always shown.
/// - `Predicate(_)`: resolved per request against the [`EvaluationContext`];
///   a truthy result hides the entry.
#[derive(Clone, Default)]
pub enum Visibility {
    /// No rule declared; the entry appears in every listing.
    #[default]
    Always,
    /// Fixed hidden flag (`true` = hidden).
    Static(bool),
    /// Context-dependent rule; truthy means hidden.
    Predicate(VisibilityPredicate),
}

impl Visibility {
    /// A statically hidden entry.
    pub fn hidden() -> Self {
        Visibility::Static(true)
    }

    /// Wrap an async rule. The closure receives the shared per-request
    /// context and resolves to `true` when the entry should be hidden.
    pub fn predicate<F, Fut>(f: F) -> Self
    where
        F: Fn(Arc<EvaluationContext>) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<bool, BoxError>> + Send + 'static,
    {
        Visibility::Predicate(Arc::new(move |ctx| Box::pin(f(ctx))))
    }

    /// Wrap a synchronous, infallible rule.
    pub fn predicate_fn<F>(f: F) -> Self
    where
        F: Fn(&EvaluationContext) -> bool + Send + Sync + 'static,
    {
        Visibility::Predicate(Arc::new(move |ctx| {
            let hidden = f(ctx.as_ref());
            Box::pin(async move { Ok(hidden) })
        }))
    }
}

impl fmt::Debug for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Always => write!(f, "Always"),
            Visibility::Static(hidden) => f.debug_tuple("Static").field(hidden).finish(),
            Visibility::Predicate(_) => write!(f, "Predicate(..)"),
        }
    }
}

// ---------------------------------------------------------------------------
// ToolEntry
// ---------------------------------------------------------------------------

/// How a tool entry answers a direct invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolKind {
    /// Ordinary tool; invocation dispatches to its registered handler.
    Plain,
    /// Compiled router; invocation reports the current visibility-filtered
    /// metadata of its declared members.
    Router {
        /// Member tool names in declaration order.
        members: Vec<String>,
    },
}

/// A registered tool.
#[derive(Clone)]
pub struct ToolEntry {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description shown in listings and skill documents.
    pub description: String,
    /// JSON Schema for the tool arguments. Opaque to this crate.
    pub args_schema: Value,
    /// Discovery visibility.
    pub visibility: Visibility,
    /// Optional direct-invocation handler.
    pub handler: Option<ToolHandler>,
    /// Plain tool or compiled router.
    pub kind: ToolKind,
}

impl ToolEntry {
    /// Create a plain, always-visible tool with an empty args schema.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            args_schema: Value::Object(serde_json::Map::new()),
            visibility: Visibility::Always,
            handler: None,
            kind: ToolKind::Plain,
        }
    }

    /// Builder: set the args schema.
    pub fn with_args_schema(mut self, schema: Value) -> Self {
        self.args_schema = schema;
        self
    }

    /// Builder: set the visibility rule.
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Builder: set the direct-invocation handler.
    pub fn with_handler<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(Arc<EvaluationContext>, Value) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<Value, BoxError>> + Send + 'static,
    {
        self.handler = Some(Arc::new(move |ctx, args| Box::pin(handler(ctx, args))));
        self
    }

    /// Whether this entry is a compiled router.
    pub fn is_router(&self) -> bool {
        matches!(self.kind, ToolKind::Router { .. })
    }
}

impl fmt::Debug for ToolEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolEntry")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("visibility", &self.visibility)
            .field("has_handler", &self.handler.is_some())
            .field("kind", &self.kind)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ResourceEntry
// ---------------------------------------------------------------------------

/// A registered resource, identified by URI.
#[derive(Clone)]
pub struct ResourceEntry {
    /// Unique resource URI.
    pub uri: String,
    /// Short display name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// MIME type of the resource content, if known.
    pub mime_type: Option<String>,
    /// Discovery visibility.
    pub visibility: Visibility,
    /// Optional direct-read handler.
    pub reader: Option<ResourceReader>,
}

impl ResourceEntry {
    /// Create an always-visible resource.
    pub fn new(
        uri: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            uri: uri.into(),
            name: name.into(),
            description: description.into(),
            mime_type: None,
            visibility: Visibility::Always,
            reader: None,
        }
    }

    /// Builder: set the MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Builder: set the visibility rule.
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Builder: set the direct-read handler.
    pub fn with_reader<F, Fut>(mut self, reader: F) -> Self
    where
        F: Fn(Arc<EvaluationContext>) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<String, BoxError>> + Send + 'static,
    {
        self.reader = Some(Arc::new(move |ctx| Box::pin(reader(ctx))));
        self
    }
}

impl fmt::Debug for ResourceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceEntry")
            .field("uri", &self.uri)
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("visibility", &self.visibility)
            .field("has_reader", &self.reader.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// PromptEntry
// ---------------------------------------------------------------------------

/// One declared argument of a prompt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromptArg {
    /// Argument name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the argument must be supplied.
    #[serde(default)]
    pub required: bool,
}

impl PromptArg {
    /// Create a required argument.
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            required: true,
        }
    }

    /// Create an optional argument.
    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            required: false,
        }
    }

    /// Builder: set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A registered prompt.
#[derive(Debug, Clone)]
pub struct PromptEntry {
    /// Unique prompt name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Declared arguments.
    pub args: Vec<PromptArg>,
    /// Discovery visibility.
    pub visibility: Visibility,
}

impl PromptEntry {
    /// Create an always-visible prompt with no arguments.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            args: Vec::new(),
            visibility: Visibility::Always,
        }
    }

    /// Builder: set the declared arguments.
    pub fn with_args(mut self, args: Vec<PromptArg>) -> Self {
        self.args = args;
        self
    }

    /// Builder: set the visibility rule.
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }
}
