//! # Aperture
//!
//! Progressive capability disclosure for tool/resource/prompt-serving
//! servers. Aperture decides, per request, which registered capabilities are
//! visible in discovery listings, synthesizes skill documents describing
//! capabilities deliberately kept out of those listings, and compiles named
//! capability groupings ("routers") into invokable meta-tools with setup-time
//! reference validation.
//!
//! The crate is deliberately narrow: transports, declaration compilation,
//! argument validation, and authentication are collaborator concerns. What it
//! guarantees:
//!
//! - Visibility only ever affects listings; direct invocation by exact
//!   name/URI works identically for hidden and visible entries.
//! - Visibility predicates are evaluated concurrently per discovery call,
//!   each bounded by a timeout, and fail open: a defective rule can at worst
//!   over-expose an entry's existence, never take discovery down.
//! - Skill documents are rendered lazily from the live registry, so they
//!   always reflect current metadata.
//! - Router declarations are validated fatally at startup, with typo
//!   suggestions, never at call time.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use aperture::capabilities::{CapabilityRegistry, ToolEntry, Visibility};
//! use aperture::discovery::Discovery;
//! use aperture::routers::{compile, RouterDef};
//! use aperture::visibility::EvaluationContext;
//!
//! # tokio_test::block_on(async {
//! let mut registry = CapabilityRegistry::new();
//! registry.register_tool(ToolEntry::new("search", "Search the index")).unwrap();
//! registry.register_tool(
//!     ToolEntry::new("reindex", "Rebuild the index")
//!         .with_visibility(Visibility::predicate_fn(|ctx| !ctx.flag("is_admin"))),
//! ).unwrap();
//! compile(&[RouterDef::new("ops", vec!["reindex".into()])], &mut registry).unwrap();
//!
//! let discovery = Discovery::new(Arc::new(registry));
//! let tools = discovery.list_tools(Some(EvaluationContext::new())).await;
//! assert_eq!(tools.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(), vec!["search", "ops"]);
//! # });
//! ```

pub mod capabilities;
pub mod discovery;
pub mod routers;
pub mod skills;
pub mod visibility;

pub use capabilities::{
    CapabilityKind, CapabilityRegistry, PromptArg, PromptEntry, RegistryError, ResourceEntry,
    ToolEntry, ToolKind, Visibility,
};
pub use discovery::{
    Discovery, DiscoveryError, DiscoverySurface, PromptSummary, ResourceContent, ResourceSummary,
    ToolSummary,
};
pub use routers::{compile, RouterCompileError, RouterDef};
pub use skills::{render, Skill, SkillContent, SkillDecl, SkillError};
pub use visibility::{EvaluationContext, HiddenEvaluator};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
