//! # Capability model and registry
//!
//! Everything a disclosure-aware server can expose is a capability: a tool,
//! a resource, or a prompt, plus the skill documents that describe them. This
//! module defines the entry types, the [`Visibility`] rules attached to them,
//! and the [`CapabilityRegistry`] that holds them all.
//!
//! ## Lifecycle
//!
//! 1. The setup collaborator registers plain tools, resources, and prompts.
//! 2. Skill declarations are registered (always visible, `skill://` URIs).
//! 3. The router compiler validates router declarations and appends one
//!    router tool per declaration.
//! 4. The finished registry is wrapped in an `Arc` and handed to the
//!    discovery façade; from then on it is read-only.

pub mod capability;
pub mod registry;

pub use capability::{
    BoxError, PromptArg, PromptEntry, ResourceEntry, ResourceReader, ToolEntry, ToolHandler,
    ToolKind, Visibility, VisibilityPredicate,
};
pub use registry::{CapabilityKind, CapabilityRegistry, RegistryError};
