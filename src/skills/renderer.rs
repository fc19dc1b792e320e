//! Skill rendering — produce a skill's markdown body from the live registry.
//!
//! Rendering is a pure function of the skill definition and the registry
//! snapshot: no caching, byte-identical output for identical inputs, and a
//! registry description change is picked up on the next read. Unresolved
//! references are non-fatal: the document is still produced with the dangling
//! reference flagged inline, and a warning is recorded and logged.

use serde_json::Value;

use crate::capabilities::CapabilityRegistry;
use crate::skills::{Skill, SkillContent};

// ---------------------------------------------------------------------------
// RenderWarning
// ---------------------------------------------------------------------------

/// Non-fatal problem noticed while rendering a generated skill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderWarning {
    /// A referenced tool name is not in the registry.
    UnknownTool { skill: String, name: String },
    /// A referenced resource URI is not in the registry.
    UnknownResource { skill: String, uri: String },
}

impl std::fmt::Display for RenderWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderWarning::UnknownTool { skill, name } => {
                write!(f, "skill `{skill}` references unknown tool `{name}`")
            }
            RenderWarning::UnknownResource { skill, uri } => {
                write!(f, "skill `{skill}` references unknown resource `{uri}`")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// RenderedSkill
// ---------------------------------------------------------------------------

/// The rendered document plus any warnings recorded along the way.
#[derive(Debug, Clone)]
pub struct RenderedSkill {
    /// Markdown body.
    pub body: String,
    /// Unresolved-reference warnings, in reference order.
    pub warnings: Vec<RenderWarning>,
}

// ---------------------------------------------------------------------------
// render
// ---------------------------------------------------------------------------

/// Render a skill's document body against the current registry state.
///
/// Manual and provider skills return their authored content verbatim.
/// Generated skills get one section per referenced tool (description plus a
/// rendering of its args schema) and one per referenced resource (URI plus
/// description).
pub fn render(skill: &Skill, registry: &CapabilityRegistry) -> RenderedSkill {
    let rendered = match &skill.content {
        SkillContent::Manual(body) => RenderedSkill {
            body: body.clone(),
            warnings: Vec::new(),
        },
        SkillContent::Provider(provider) => RenderedSkill {
            body: provider(),
            warnings: Vec::new(),
        },
        SkillContent::Generated { tools, resources } => render_generated(skill, tools, resources, registry),
    };

    for warning in &rendered.warnings {
        log::warn!("{warning}");
    }
    rendered
}

fn render_generated(
    skill: &Skill,
    tools: &[String],
    resources: &[String],
    registry: &CapabilityRegistry,
) -> RenderedSkill {
    let mut sections: Vec<String> = Vec::new();
    let mut warnings: Vec<RenderWarning> = Vec::new();

    sections.push(format!("# {}\n\n{}", skill.name, skill.description));

    for name in tools {
        match registry.tool(name) {
            Some(tool) => {
                let mut section = format!("## {}\n\n{}", tool.name, tool.description);
                if !schema_is_empty(&tool.args_schema) {
                    // Map keys serialize in a stable order, so repeated
                    // renders are byte-identical.
                    let schema = serde_json::to_string_pretty(&tool.args_schema)
                        .unwrap_or_else(|_| tool.args_schema.to_string());
                    section.push_str(&format!("\n\n```json\n{schema}\n```"));
                }
                sections.push(section);
            }
            None => {
                warnings.push(RenderWarning::UnknownTool {
                    skill: skill.name.clone(),
                    name: name.clone(),
                });
                sections.push(format!("## {name}\n\n_unresolved tool reference_"));
            }
        }
    }

    for uri in resources {
        match registry.resource(uri) {
            Some(resource) => {
                sections.push(format!(
                    "## {}\n\nURI: `{}`\n\n{}",
                    resource.name, resource.uri, resource.description
                ));
            }
            None => {
                warnings.push(RenderWarning::UnknownResource {
                    skill: skill.name.clone(),
                    uri: uri.clone(),
                });
                sections.push(format!("## {uri}\n\n_unresolved resource reference_"));
            }
        }
    }

    let mut body = sections.join("\n\n");
    body.push('\n');
    RenderedSkill { body, warnings }
}

fn schema_is_empty(schema: &Value) -> bool {
    match schema {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
