//! Discovery façade — the public surface composing registry, visibility
//! evaluation, and response shaping.
//!
//! Listing methods are always asynchronous, even when every visibility rule
//! in the registry happens to be static, so callers get one uniform calling
//! convention and context-dependent rules can be added without an API break.
//! The direct surface (`invoke_tool`, `read_resource`) ignores visibility
//! entirely: hidden entries behave exactly like visible ones, and only a
//! never-registered identifier yields a not-found error.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::capabilities::{BoxError, CapabilityKind, CapabilityRegistry, ToolEntry, ToolKind};
use crate::discovery::summaries::{
    PromptSummary, ResourceContent, ResourceSummary, ToolSummary,
};
use crate::skills::{render, SKILL_MIME_TYPE, SKILL_URI_SCHEME};
use crate::visibility::{EvaluationContext, HiddenEvaluator};

// ---------------------------------------------------------------------------
// DiscoveryError
// ---------------------------------------------------------------------------

/// Client-visible errors from the direct invocation/read surface.
///
/// Listing methods never return errors; visibility evaluation failures are
/// absorbed inside the evaluator.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// No capability was ever registered under this identifier.
    #[error("{kind} not found: `{name}`")]
    NotFound {
        kind: CapabilityKind,
        name: String,
    },

    /// The tool exists but has no registered handler.
    #[error("tool `{name}` has no handler")]
    NotInvokable { name: String },

    /// The resource exists but has no registered reader.
    #[error("resource `{uri}` has no reader")]
    NotReadable { uri: String },

    /// A handler or reader ran and failed.
    #[error("handler for `{name}` failed: {source}")]
    HandlerFailed {
        name: String,
        #[source]
        source: BoxError,
    },

    /// Shaping a router response failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// DiscoverySurface
// ---------------------------------------------------------------------------

/// The listing surface consumed by the transport/session collaborator.
#[async_trait]
pub trait DiscoverySurface: Send + Sync {
    /// List visible tools for the given context.
    async fn list_tools(&self, ctx: Option<EvaluationContext>) -> Vec<ToolSummary>;

    /// List visible resources, plus every skill, for the given context.
    async fn list_resources(&self, ctx: Option<EvaluationContext>) -> Vec<ResourceSummary>;

    /// List visible prompts for the given context.
    async fn list_prompts(&self, ctx: Option<EvaluationContext>) -> Vec<PromptSummary>;
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// The public discovery surface over a finished registry.
#[derive(Debug, Clone)]
pub struct Discovery {
    registry: Arc<CapabilityRegistry>,
    evaluator: HiddenEvaluator,
}

impl Discovery {
    /// Create a façade over a finished (post-compilation) registry.
    pub fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self {
            registry,
            evaluator: HiddenEvaluator::new(),
        }
    }

    /// Builder: replace the visibility evaluator.
    pub fn with_evaluator(mut self, evaluator: HiddenEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// The underlying registry.
    pub fn registry(&self) -> &Arc<CapabilityRegistry> {
        &self.registry
    }

    // -----------------------------------------------------------------------
    // Listings
    // -----------------------------------------------------------------------

    /// List the tools visible under `ctx`, in registration order.
    pub async fn list_tools(&self, ctx: Option<EvaluationContext>) -> Vec<ToolSummary> {
        let ctx = Arc::new(ctx.unwrap_or_default());
        let items: Vec<&ToolEntry> = self.registry.tools().iter().collect();
        self.filter_tools(items, &ctx)
            .await
            .into_iter()
            .map(ToolSummary::from_entry)
            .collect()
    }

    /// List the resources visible under `ctx`, in registration order, then
    /// every skill as a `skill://` entry. Skills are the disclosure gateway
    /// and are never filtered.
    pub async fn list_resources(&self, ctx: Option<EvaluationContext>) -> Vec<ResourceSummary> {
        let ctx = Arc::new(ctx.unwrap_or_default());
        let items = self.registry.resources().iter().collect();
        let mut summaries: Vec<ResourceSummary> = self
            .evaluator
            .filter_visible(
                items,
                |entry| {
                    self.registry
                        .resource(&entry.uri)
                        .map(|r| r.visibility.clone())
                },
                &ctx,
            )
            .await
            .into_iter()
            .map(ResourceSummary::from_entry)
            .collect();
        summaries.extend(self.registry.skills().iter().map(ResourceSummary::from_skill));
        summaries
    }

    /// List the prompts visible under `ctx`, in registration order.
    pub async fn list_prompts(&self, ctx: Option<EvaluationContext>) -> Vec<PromptSummary> {
        let ctx = Arc::new(ctx.unwrap_or_default());
        let items = self.registry.prompts().iter().collect();
        self.evaluator
            .filter_visible(
                items,
                |entry| {
                    self.registry
                        .prompt(&entry.name)
                        .map(|p| p.visibility.clone())
                },
                &ctx,
            )
            .await
            .into_iter()
            .map(PromptSummary::from_entry)
            .collect()
    }

    // -----------------------------------------------------------------------
    // Direct surface (visibility-independent)
    // -----------------------------------------------------------------------

    /// Invoke a tool by exact name. Hidden tools are invokable exactly like
    /// visible ones. Router tools answer with the current metadata of their
    /// members, filtered for the caller's context.
    pub async fn invoke_tool(
        &self,
        name: &str,
        ctx: Option<EvaluationContext>,
        args: Value,
    ) -> Result<Value, DiscoveryError> {
        let entry = self.registry.tool(name).ok_or_else(|| DiscoveryError::NotFound {
            kind: CapabilityKind::Tool,
            name: name.to_string(),
        })?;
        let ctx = Arc::new(ctx.unwrap_or_default());

        match &entry.kind {
            ToolKind::Router { members } => {
                let items: Vec<&ToolEntry> = members
                    .iter()
                    .filter_map(|member| self.registry.tool(member))
                    .collect();
                let summaries: Vec<ToolSummary> = self
                    .filter_tools(items, &ctx)
                    .await
                    .into_iter()
                    .map(ToolSummary::from_entry)
                    .collect();
                Ok(serde_json::to_value(summaries)?)
            }
            ToolKind::Plain => {
                let handler = entry
                    .handler
                    .as_ref()
                    .ok_or_else(|| DiscoveryError::NotInvokable {
                        name: name.to_string(),
                    })?;
                handler(Arc::clone(&ctx), args)
                    .await
                    .map_err(|source| DiscoveryError::HandlerFailed {
                        name: name.to_string(),
                        source,
                    })
            }
        }
    }

    /// Read a resource by exact URI. `skill://` URIs render the skill
    /// against the live registry; hidden resources read exactly like
    /// visible ones.
    pub async fn read_resource(
        &self,
        uri: &str,
        ctx: Option<EvaluationContext>,
    ) -> Result<ResourceContent, DiscoveryError> {
        if let Some(name) = uri.strip_prefix(SKILL_URI_SCHEME) {
            let skill = self.registry.skill(name).ok_or_else(|| DiscoveryError::NotFound {
                kind: CapabilityKind::Skill,
                name: uri.to_string(),
            })?;
            let rendered = render(skill, &self.registry);
            return Ok(ResourceContent {
                uri: uri.to_string(),
                mime_type: Some(SKILL_MIME_TYPE.to_string()),
                text: rendered.body,
            });
        }

        let entry = self.registry.resource(uri).ok_or_else(|| DiscoveryError::NotFound {
            kind: CapabilityKind::Resource,
            name: uri.to_string(),
        })?;
        let reader = entry
            .reader
            .as_ref()
            .ok_or_else(|| DiscoveryError::NotReadable {
                uri: uri.to_string(),
            })?;
        let ctx = Arc::new(ctx.unwrap_or_default());
        let text = reader(ctx)
            .await
            .map_err(|source| DiscoveryError::HandlerFailed {
                name: uri.to_string(),
                source,
            })?;
        Ok(ResourceContent {
            uri: entry.uri.clone(),
            mime_type: entry.mime_type.clone(),
            text,
        })
    }

    async fn filter_tools<'a>(
        &self,
        items: Vec<&'a ToolEntry>,
        ctx: &Arc<EvaluationContext>,
    ) -> Vec<&'a ToolEntry> {
        self.evaluator
            .filter_visible(
                items,
                |entry| self.registry.tool(&entry.name).map(|t| t.visibility.clone()),
                ctx,
            )
            .await
    }
}

#[async_trait]
impl DiscoverySurface for Discovery {
    async fn list_tools(&self, ctx: Option<EvaluationContext>) -> Vec<ToolSummary> {
        Discovery::list_tools(self, ctx).await
    }

    async fn list_resources(&self, ctx: Option<EvaluationContext>) -> Vec<ResourceSummary> {
        Discovery::list_resources(self, ctx).await
    }

    async fn list_prompts(&self, ctx: Option<EvaluationContext>) -> Vec<PromptSummary> {
        Discovery::list_prompts(self, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{PromptArg, PromptEntry, ResourceEntry, Visibility};
    use crate::routers::{compile, RouterDef};
    use crate::skills::{Skill, SkillContent};
    use serde_json::json;

    /// Registry from the canonical scenario: `a` visible, `b` statically
    /// hidden, `c` hidden unless the context carries `is_admin`.
    fn scenario_registry() -> CapabilityRegistry {
        let mut registry = CapabilityRegistry::new();
        registry
            .register_tool(
                ToolEntry::new("a", "Public tool")
                    .with_handler(|_ctx, _args| async { Ok(json!("a ran")) }),
            )
            .unwrap();
        registry
            .register_tool(
                ToolEntry::new("b", "Hidden tool")
                    .with_visibility(Visibility::hidden())
                    .with_handler(|_ctx, _args| async { Ok(json!("b ran")) }),
            )
            .unwrap();
        registry
            .register_tool(
                ToolEntry::new("c", "Admin tool")
                    .with_visibility(Visibility::predicate_fn(|ctx| !ctx.flag("is_admin"))),
            )
            .unwrap();
        registry
    }

    fn admin_ctx() -> EvaluationContext {
        EvaluationContext::new().with("is_admin", true)
    }

    async fn tool_names(discovery: &Discovery, ctx: Option<EvaluationContext>) -> Vec<String> {
        discovery
            .list_tools(ctx)
            .await
            .into_iter()
            .map(|t| t.name)
            .collect()
    }

    #[tokio::test]
    async fn test_listing_depends_on_context_only() {
        let discovery = Discovery::new(Arc::new(scenario_registry()));
        assert_eq!(tool_names(&discovery, None).await, vec!["a"]);
        assert_eq!(
            tool_names(&discovery, Some(admin_ctx())).await,
            vec!["a", "c"]
        );
        // No registry mutation happened between the two calls.
        assert_eq!(tool_names(&discovery, None).await, vec!["a"]);
    }

    #[tokio::test]
    async fn test_hidden_tool_is_still_invokable() {
        let discovery = Discovery::new(Arc::new(scenario_registry()));
        let result = discovery.invoke_tool("b", None, json!({})).await.unwrap();
        assert_eq!(result, json!("b ran"));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_not_found() {
        let discovery = Discovery::new(Arc::new(scenario_registry()));
        let err = discovery.invoke_tool("nope", None, json!({})).await.unwrap_err();
        assert!(matches!(err, DiscoveryError::NotFound { kind: CapabilityKind::Tool, .. }));
        assert!(err.to_string().contains("`nope`"));
    }

    #[tokio::test]
    async fn test_tool_without_handler_is_not_invokable() {
        let discovery = Discovery::new(Arc::new(scenario_registry()));
        let err = discovery.invoke_tool("c", None, json!({})).await.unwrap_err();
        assert!(matches!(err, DiscoveryError::NotInvokable { .. }));
    }

    #[tokio::test]
    async fn test_routers_are_listed_and_filter_members() {
        let mut registry = scenario_registry();
        compile(
            &[
                RouterDef::new("r1", vec!["a".into(), "b".into()]),
                RouterDef::new("r2", vec!["b".into(), "c".into()]),
            ],
            &mut registry,
        )
        .unwrap();
        let discovery = Discovery::new(Arc::new(registry));

        // Router tools are themselves always visible.
        assert_eq!(
            tool_names(&discovery, None).await,
            vec!["a", "r1", "r2"]
        );

        // Invoking a router never reveals a member the caller could not
        // discover directly.
        let members = discovery.invoke_tool("r1", None, json!({})).await.unwrap();
        let names: Vec<&str> = members
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a"]);

        let members = discovery
            .invoke_tool("r2", Some(admin_ctx()), json!({}))
            .await
            .unwrap();
        let names: Vec<&str> = members
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["c"]);
    }

    #[tokio::test]
    async fn test_empty_router_reports_empty_list() {
        let mut registry = scenario_registry();
        compile(&[RouterDef::new("empty", vec![])], &mut registry).unwrap();
        let discovery = Discovery::new(Arc::new(registry));
        let members = discovery.invoke_tool("empty", None, json!({})).await.unwrap();
        assert_eq!(members, json!([]));
    }

    #[tokio::test]
    async fn test_skills_always_listed_among_resources() {
        let mut registry = scenario_registry();
        registry
            .register_resource(
                ResourceEntry::new("doc://secret", "secret", "Hidden doc")
                    .with_visibility(Visibility::hidden()),
            )
            .unwrap();
        registry
            .register_skill(Skill::new(
                "ops",
                "Operational capabilities",
                SkillContent::Generated {
                    tools: vec!["b".into()],
                    resources: vec![],
                },
            ))
            .unwrap();
        let discovery = Discovery::new(Arc::new(registry));

        let resources = discovery.list_resources(None).await;
        let uris: Vec<&str> = resources.iter().map(|r| r.uri.as_str()).collect();
        assert_eq!(uris, vec!["skill://ops"]);
        assert_eq!(resources[0].mime_type.as_deref(), Some("text/markdown"));
    }

    #[tokio::test]
    async fn test_read_skill_document_reflects_live_registry() {
        let mut registry = scenario_registry();
        registry
            .register_skill(Skill::new(
                "ops",
                "Operational capabilities",
                SkillContent::Generated {
                    tools: vec!["a".into(), "b".into()],
                    resources: vec![],
                },
            ))
            .unwrap();
        let discovery = Discovery::new(Arc::new(registry));

        let content = discovery.read_resource("skill://ops", None).await.unwrap();
        assert!(content.text.contains("Public tool"));
        assert!(content.text.contains("Hidden tool"));

        let err = discovery.read_resource("skill://missing", None).await.unwrap_err();
        assert!(matches!(err, DiscoveryError::NotFound { kind: CapabilityKind::Skill, .. }));
    }

    #[tokio::test]
    async fn test_read_plain_resource_ignores_visibility() {
        let mut registry = CapabilityRegistry::new();
        registry
            .register_resource(
                ResourceEntry::new("doc://secret", "secret", "Hidden doc")
                    .with_visibility(Visibility::hidden())
                    .with_reader(|_ctx| async { Ok("classified".to_string()) }),
            )
            .unwrap();
        let discovery = Discovery::new(Arc::new(registry));

        assert!(discovery.list_resources(None).await.is_empty());
        let content = discovery.read_resource("doc://secret", None).await.unwrap();
        assert_eq!(content.text, "classified");

        let err = discovery.read_resource("doc://absent", None).await.unwrap_err();
        assert!(matches!(err, DiscoveryError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_prompts_filters_by_visibility() {
        let mut registry = CapabilityRegistry::new();
        registry
            .register_prompt(
                PromptEntry::new("summarize", "Summarize a document")
                    .with_args(vec![PromptArg::required("path")]),
            )
            .unwrap();
        registry
            .register_prompt(
                PromptEntry::new("internal_review", "Internal review prompt")
                    .with_visibility(Visibility::hidden()),
            )
            .unwrap();
        let discovery = Discovery::new(Arc::new(registry));

        let prompts = discovery.list_prompts(None).await;
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].name, "summarize");
        assert_eq!(prompts[0].args[0].name, "path");
    }

    #[tokio::test]
    async fn test_facade_is_usable_as_trait_object() {
        let discovery = Discovery::new(Arc::new(scenario_registry()));
        let surface: &dyn DiscoverySurface = &discovery;
        let tools = surface.list_tools(None).await;
        assert_eq!(tools.len(), 1);
    }
}
