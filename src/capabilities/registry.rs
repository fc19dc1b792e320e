//! Capability Registry — the single store for everything a server exposes.
//!
//! Entries are registered during server setup and read many times during
//! serving. The registry is append-only: there is no removal operation, and
//! the only post-registration writer is the router compiler, which runs
//! before the server accepts traffic. Because registration completes before
//! serving begins, no interior locking is needed; share the finished registry
//! behind an `Arc`.
//!
//! Listings iterate in registration order so discovery output is stable.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use super::capability::{PromptEntry, ResourceEntry, ToolEntry};
use crate::skills::{skill_uri, Skill};

// ---------------------------------------------------------------------------
// CapabilityKind
// ---------------------------------------------------------------------------

/// The kind of a registered capability, used in error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityKind {
    Tool,
    Resource,
    Prompt,
    Skill,
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityKind::Tool => write!(f, "tool"),
            CapabilityKind::Resource => write!(f, "resource"),
            CapabilityKind::Prompt => write!(f, "prompt"),
            CapabilityKind::Skill => write!(f, "skill"),
        }
    }
}

// ---------------------------------------------------------------------------
// RegistryError
// ---------------------------------------------------------------------------

/// Errors raised while populating the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The name or URI is already taken within its kind.
    #[error("duplicate {kind} registration: `{name}` already exists")]
    Duplicate {
        kind: CapabilityKind,
        name: String,
    },
}

// ---------------------------------------------------------------------------
// CapabilityRegistry
// ---------------------------------------------------------------------------

/// Registry of all tools, resources, prompts, and skills on a server.
///
/// Keys are tool/prompt/skill names and resource URIs. Skills live in the
/// resource URI space under the `skill://` scheme, so a skill name also
/// reserves its derived URI against plain-resource registrations.
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    tools: Vec<ToolEntry>,
    tool_index: HashMap<String, usize>,
    resources: Vec<ResourceEntry>,
    resource_index: HashMap<String, usize>,
    prompts: Vec<PromptEntry>,
    prompt_index: HashMap<String, usize>,
    skills: Vec<Skill>,
    skill_index: HashMap<String, usize>,
}

impl CapabilityRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Register a tool. Fails if the name is already taken.
    pub fn register_tool(&mut self, tool: ToolEntry) -> Result<(), RegistryError> {
        if self.tool_index.contains_key(&tool.name) {
            return Err(RegistryError::Duplicate {
                kind: CapabilityKind::Tool,
                name: tool.name,
            });
        }
        self.tool_index.insert(tool.name.clone(), self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// Register a resource. Fails if the URI is already taken, including by
    /// the derived URI of a registered skill.
    pub fn register_resource(&mut self, resource: ResourceEntry) -> Result<(), RegistryError> {
        let skill_collision = resource
            .uri
            .strip_prefix(crate::skills::SKILL_URI_SCHEME)
            .is_some_and(|name| self.skill_index.contains_key(name));
        if self.resource_index.contains_key(&resource.uri) || skill_collision {
            return Err(RegistryError::Duplicate {
                kind: CapabilityKind::Resource,
                name: resource.uri,
            });
        }
        self.resource_index
            .insert(resource.uri.clone(), self.resources.len());
        self.resources.push(resource);
        Ok(())
    }

    /// Register a prompt. Fails if the name is already taken.
    pub fn register_prompt(&mut self, prompt: PromptEntry) -> Result<(), RegistryError> {
        if self.prompt_index.contains_key(&prompt.name) {
            return Err(RegistryError::Duplicate {
                kind: CapabilityKind::Prompt,
                name: prompt.name,
            });
        }
        self.prompt_index
            .insert(prompt.name.clone(), self.prompts.len());
        self.prompts.push(prompt);
        Ok(())
    }

    /// Register a skill. Fails if the skill name, or its derived
    /// `skill://<name>` URI, is already taken.
    pub fn register_skill(&mut self, skill: Skill) -> Result<(), RegistryError> {
        if self.skill_index.contains_key(&skill.name)
            || self.resource_index.contains_key(&skill_uri(&skill.name))
        {
            return Err(RegistryError::Duplicate {
                kind: CapabilityKind::Skill,
                name: skill.name,
            });
        }
        self.skill_index
            .insert(skill.name.clone(), self.skills.len());
        self.skills.push(skill);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// Look up a tool by exact name.
    pub fn tool(&self, name: &str) -> Option<&ToolEntry> {
        self.tool_index.get(name).map(|&i| &self.tools[i])
    }

    /// Mutable tool lookup, for setup-time metadata adjustments.
    pub fn tool_mut(&mut self, name: &str) -> Option<&mut ToolEntry> {
        self.tool_index.get(name).map(|&i| &mut self.tools[i])
    }

    /// Look up a resource by exact URI.
    pub fn resource(&self, uri: &str) -> Option<&ResourceEntry> {
        self.resource_index.get(uri).map(|&i| &self.resources[i])
    }

    /// Look up a prompt by exact name.
    pub fn prompt(&self, name: &str) -> Option<&PromptEntry> {
        self.prompt_index.get(name).map(|&i| &self.prompts[i])
    }

    /// Look up a skill by name.
    pub fn skill(&self, name: &str) -> Option<&Skill> {
        self.skill_index.get(name).map(|&i| &self.skills[i])
    }

    // -----------------------------------------------------------------------
    // Ordered listings
    // -----------------------------------------------------------------------

    /// All tools, in registration order.
    pub fn tools(&self) -> &[ToolEntry] {
        &self.tools
    }

    /// All resources, in registration order.
    pub fn resources(&self) -> &[ResourceEntry] {
        &self.resources
    }

    /// All prompts, in registration order.
    pub fn prompts(&self) -> &[PromptEntry] {
        &self.prompts
    }

    /// All skills, in registration order.
    pub fn skills(&self) -> &[Skill] {
        &self.skills
    }

    /// All tool names, in registration order.
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name.clone()).collect()
    }

    /// Names of installed router tools, in registration order.
    pub fn router_names(&self) -> Vec<String> {
        self.tools
            .iter()
            .filter(|t| t.is_router())
            .map(|t| t.name.clone())
            .collect()
    }

    /// Total number of registered entries across all kinds.
    pub fn len(&self) -> usize {
        self.tools.len() + self.resources.len() + self.prompts.len() + self.skills.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::Visibility;
    use crate::skills::SkillContent;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = CapabilityRegistry::new();
        registry
            .register_tool(ToolEntry::new("search", "Search the index"))
            .unwrap();
        registry
            .register_resource(ResourceEntry::new("doc://readme", "readme", "Readme"))
            .unwrap();
        registry
            .register_prompt(PromptEntry::new("summarize", "Summarize a document"))
            .unwrap();

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.tool("search").unwrap().name, "search");
        assert_eq!(registry.resource("doc://readme").unwrap().name, "readme");
        assert_eq!(registry.prompt("summarize").unwrap().name, "summarize");
        assert!(registry.tool("missing").is_none());
    }

    #[test]
    fn test_duplicate_tool_rejected() {
        let mut registry = CapabilityRegistry::new();
        registry
            .register_tool(ToolEntry::new("search", "Search the index"))
            .unwrap();
        let err = registry
            .register_tool(ToolEntry::new("search", "Other"))
            .unwrap_err();
        assert!(err.to_string().contains("duplicate tool"));
        assert!(err.to_string().contains("`search`"));
        // First registration is unaffected.
        assert_eq!(registry.tool("search").unwrap().description, "Search the index");
    }

    #[test]
    fn test_registration_order_preserved() {
        let mut registry = CapabilityRegistry::new();
        for name in ["c", "a", "b"] {
            registry
                .register_tool(ToolEntry::new(name, format!("{name} tool")))
                .unwrap();
        }
        assert_eq!(registry.tool_names(), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_skill_uri_space_is_shared_with_resources() {
        let mut registry = CapabilityRegistry::new();
        registry
            .register_skill(Skill::new(
                "setup",
                "Setup guide",
                SkillContent::Manual("Install and run.".into()),
            ))
            .unwrap();

        // The skill's derived URI is reserved.
        let err = registry
            .register_resource(ResourceEntry::new("skill://setup", "setup", "clash"))
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Duplicate { kind: CapabilityKind::Resource, .. }
        ));

        // And a resource URI blocks the matching skill name.
        registry
            .register_resource(ResourceEntry::new("skill://ops", "ops", "claims the URI"))
            .unwrap();
        let err = registry
            .register_skill(Skill::new("ops", "Ops", SkillContent::Manual(String::new())))
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Duplicate { kind: CapabilityKind::Skill, .. }
        ));
    }

    #[test]
    fn test_hidden_entries_are_registered_like_visible_ones() {
        let mut registry = CapabilityRegistry::new();
        registry
            .register_tool(
                ToolEntry::new("internal_reindex", "Rebuild the index")
                    .with_visibility(Visibility::hidden()),
            )
            .unwrap();
        assert!(registry.tool("internal_reindex").is_some());
        assert_eq!(registry.router_names(), Vec::<String>::new());
    }
}
