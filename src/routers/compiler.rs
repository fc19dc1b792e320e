//! Router compilation — validate declarations and install router tools.
//!
//! Compilation runs once during server setup, after all plain tools are
//! registered and before the server accepts traffic. Every validation failure
//! is fatal at startup, never at call time, and the error message carries
//! enough context to fix the declaration: the offending name, the valid set,
//! and typo suggestions where applicable.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::capabilities::{
    CapabilityRegistry, RegistryError, ToolEntry, ToolKind, Visibility,
};
use crate::routers::RouterDef;

// ---------------------------------------------------------------------------
// RouterCompileError
// ---------------------------------------------------------------------------

/// Fatal setup-time validation failures.
#[derive(Debug, Error)]
pub enum RouterCompileError {
    /// A router name was declared twice, or clashes with an installed router.
    #[error("{}", duplicate_name_message(.name, .registered))]
    DuplicateName {
        name: String,
        /// Router names registered before the offending declaration.
        registered: Vec<String>,
    },

    /// A router references tool names the registry does not know.
    #[error("{}", unknown_members_message(.router, .unknown, .known, .suggestions))]
    UnknownMembers {
        router: String,
        /// The unresolved member names, in declaration order.
        unknown: Vec<String>,
        /// Every currently known tool name, in registration order.
        known: Vec<String>,
        /// "Did you mean" candidates, substring-matched case-insensitively.
        suggestions: Vec<String>,
    },

    /// The router name collides with an existing non-router capability.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

fn duplicate_name_message(name: &str, registered: &[String]) -> String {
    format!(
        "duplicate router name `{name}`; routers already registered: [{}]",
        registered.join(", ")
    )
}

fn unknown_members_message(
    router: &str,
    unknown: &[String],
    known: &[String],
    suggestions: &[String],
) -> String {
    let mut message = format!(
        "router `{router}` references unknown tool(s): [{}]; valid tool names: [{}]",
        unknown.join(", "),
        known.join(", ")
    );
    if !suggestions.is_empty() {
        message.push_str(&format!("; did you mean: [{}]?", suggestions.join(", ")));
    }
    message
}

// ---------------------------------------------------------------------------
// compile
// ---------------------------------------------------------------------------

/// Validate `defs` and install one router tool per declaration.
///
/// Declarations are processed in order and installation is incremental, so a
/// later router may legally reference an earlier one. Fails fast on the first
/// invalid declaration; routers installed before the failure stay installed,
/// matching the append-only registry contract.
pub fn compile(
    defs: &[RouterDef],
    registry: &mut CapabilityRegistry,
) -> Result<(), RouterCompileError> {
    for def in defs {
        let registered = registry.router_names();
        if registered.iter().any(|name| name == &def.name) {
            return Err(RouterCompileError::DuplicateName {
                name: def.name.clone(),
                registered,
            });
        }

        let known = registry.tool_names();
        let unknown: Vec<String> = def
            .tools
            .iter()
            .filter(|member| !known.iter().any(|name| name == *member))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            let suggestions = suggest(&unknown, &known);
            return Err(RouterCompileError::UnknownMembers {
                router: def.name.clone(),
                unknown,
                known,
                suggestions,
            });
        }

        registry.register_tool(ToolEntry {
            name: def.name.clone(),
            description: def.effective_description(),
            args_schema: empty_object_schema(),
            visibility: Visibility::Always,
            handler: None,
            kind: ToolKind::Router {
                members: def.tools.clone(),
            },
        })?;
    }
    Ok(())
}

/// Best-effort typo candidates: a known name qualifies when it contains the
/// unknown name, or the unknown name contains it, case-insensitively.
pub fn suggest(unknown: &[String], known: &[String]) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::new();
    for missing in unknown {
        let missing_lower = missing.to_lowercase();
        for name in known {
            let name_lower = name.to_lowercase();
            if (name_lower.contains(&missing_lower) || missing_lower.contains(&name_lower))
                && !candidates.contains(name)
            {
                candidates.push(name.clone());
            }
        }
    }
    candidates
}

fn empty_object_schema() -> Value {
    let mut schema = Map::new();
    schema.insert("type".into(), Value::String("object".into()));
    schema.insert("properties".into(), Value::Object(Map::new()));
    Value::Object(schema)
}
