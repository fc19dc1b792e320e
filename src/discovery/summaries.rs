//! Public summary shapes returned by discovery listings.
//!
//! These are the wire-facing views of registry entries: everything a client
//! may learn about a capability from discovery, and nothing else. The
//! transport collaborator serializes them as it sees fit.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::capabilities::{PromptArg, PromptEntry, ResourceEntry, ToolEntry};
use crate::skills::{Skill, SKILL_MIME_TYPE};

/// Public view of a tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolSummary {
    pub name: String,
    pub description: String,
    pub args_schema: Value,
}

impl ToolSummary {
    /// Project a registry entry to its public shape.
    pub fn from_entry(entry: &ToolEntry) -> Self {
        Self {
            name: entry.name.clone(),
            description: entry.description.clone(),
            args_schema: entry.args_schema.clone(),
        }
    }
}

/// Public view of a resource. Skills appear here with their `skill://` URI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceSummary {
    pub uri: String,
    pub name: String,
    pub description: String,
    pub mime_type: Option<String>,
}

impl ResourceSummary {
    /// Project a registry entry to its public shape.
    pub fn from_entry(entry: &ResourceEntry) -> Self {
        Self {
            uri: entry.uri.clone(),
            name: entry.name.clone(),
            description: entry.description.clone(),
            mime_type: entry.mime_type.clone(),
        }
    }

    /// The resource-listing view of a skill.
    pub fn from_skill(skill: &Skill) -> Self {
        Self {
            uri: skill.uri(),
            name: skill.name.clone(),
            description: skill.description.clone(),
            mime_type: Some(SKILL_MIME_TYPE.to_string()),
        }
    }
}

/// Public view of a prompt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromptSummary {
    pub name: String,
    pub description: String,
    pub args: Vec<PromptArg>,
}

impl PromptSummary {
    /// Project a registry entry to its public shape.
    pub fn from_entry(entry: &PromptEntry) -> Self {
        Self {
            name: entry.name.clone(),
            description: entry.description.clone(),
            args: entry.args.clone(),
        }
    }
}

/// Content returned by a direct resource read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceContent {
    pub uri: String,
    pub mime_type: Option<String>,
    pub text: String,
}
