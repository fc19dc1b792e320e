//! Skill definitions — always-visible documentation resources.
//!
//! A skill is the gateway to capabilities deliberately kept out of discovery
//! listings: it is itself always listed, addressed as `skill://<name>`, and
//! its body either is authored directly or is synthesized from referenced
//! registry entries at read time.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

/// URI scheme under which skills appear in resource listings.
pub const SKILL_URI_SCHEME: &str = "skill://";

/// MIME type reported for rendered skill documents.
pub const SKILL_MIME_TYPE: &str = "text/markdown";

/// Derive the resource URI for a skill name.
pub fn skill_uri(name: &str) -> String {
    format!("{SKILL_URI_SCHEME}{name}")
}

/// Author-supplied content function for provider skills.
pub type SkillProvider = Arc<dyn Fn() -> String + Send + Sync>;

// ---------------------------------------------------------------------------
// SkillContent
// ---------------------------------------------------------------------------

/// Where a skill's document body comes from.
#[derive(Clone)]
pub enum SkillContent {
    /// Fixed markdown body, returned verbatim.
    Manual(String),
    /// Author-supplied function invoked with no context on every read.
    Provider(SkillProvider),
    /// Synthesized from referenced registry entries, lazily on every read so
    /// the document always reflects the live registry.
    Generated {
        /// Referenced tool names.
        tools: Vec<String>,
        /// Referenced resource URIs.
        resources: Vec<String>,
    },
}

impl fmt::Debug for SkillContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkillContent::Manual(body) => f.debug_tuple("Manual").field(&body.len()).finish(),
            SkillContent::Provider(_) => write!(f, "Provider(..)"),
            SkillContent::Generated { tools, resources } => f
                .debug_struct("Generated")
                .field("tools", tools)
                .field("resources", resources)
                .finish(),
        }
    }
}

// ---------------------------------------------------------------------------
// Skill
// ---------------------------------------------------------------------------

/// A named, URI-addressable documentation artifact.
///
/// Skills are never passed through visibility filtering; discovery always
/// returns them.
#[derive(Debug, Clone)]
pub struct Skill {
    /// Unique skill name; also determines the `skill://<name>` URI.
    pub name: String,
    /// Human-readable description shown in resource listings.
    pub description: String,
    /// Document body source.
    pub content: SkillContent,
}

impl Skill {
    /// Create a skill.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        content: SkillContent,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            content,
        }
    }

    /// Create a provider skill from a content function.
    pub fn from_provider<F>(
        name: impl Into<String>,
        description: impl Into<String>,
        provider: F,
    ) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        Self::new(
            name,
            description,
            SkillContent::Provider(Arc::new(provider)),
        )
    }

    /// The skill's resource URI.
    pub fn uri(&self) -> String {
        skill_uri(&self.name)
    }
}

// ---------------------------------------------------------------------------
// Declarations
// ---------------------------------------------------------------------------

/// Errors raised while loading skill declarations.
#[derive(Debug, Error)]
pub enum SkillError {
    /// YAML parsing failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Declaration validation failed.
    #[error("invalid skill declaration `{name}`: {reason}")]
    Invalid { name: String, reason: String },
}

/// YAML-expressible skill declaration.
///
/// Either `content` (a manual skill) or `tools`/`resources` references (a
/// generated skill) must be given, not both. Provider skills are registered
/// programmatically and have no declaration form.
///
/// Example YAML:
/// ```yaml
/// skills:
///   - name: maintenance
///     description: "Operational tools kept out of the default listing"
///     tools:
///       - reindex
///       - purge_cache
///   - name: onboarding
///     description: "Getting started"
///     content: |
///       Start with the `search` tool.
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct SkillDecl {
    /// Skill name.
    pub name: String,
    /// Description shown in listings.
    pub description: String,
    /// Manual markdown body.
    #[serde(default)]
    pub content: Option<String>,
    /// Referenced tool names for a generated skill.
    #[serde(default)]
    pub tools: Vec<String>,
    /// Referenced resource URIs for a generated skill.
    #[serde(default)]
    pub resources: Vec<String>,
}

impl SkillDecl {
    /// Parse a declaration list from a YAML string.
    pub fn list_from_yaml(yaml: &str) -> Result<Vec<Self>, SkillError> {
        let wrapper: SkillListWrapper = serde_yaml::from_str(yaml)?;
        Ok(wrapper.skills)
    }

    /// Convert into a [`Skill`], validating the content/reference split.
    pub fn into_skill(self) -> Result<Skill, SkillError> {
        match (self.content, self.tools.is_empty() && self.resources.is_empty()) {
            (Some(body), true) => Ok(Skill::new(self.name, self.description, SkillContent::Manual(body))),
            (None, _) => Ok(Skill::new(
                self.name,
                self.description,
                SkillContent::Generated {
                    tools: self.tools,
                    resources: self.resources,
                },
            )),
            (Some(_), false) => Err(SkillError::Invalid {
                name: self.name,
                reason: "declares both manual content and generated references".into(),
            }),
        }
    }
}

/// Wrapper for the YAML list form (`skills:` key).
#[derive(Debug, Deserialize)]
struct SkillListWrapper {
    skills: Vec<SkillDecl>,
}
