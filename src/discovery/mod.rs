//! # Discovery
//!
//! The public surface of the crate: listing methods that compose registry
//! lookup, visibility evaluation, and response shaping, plus the direct
//! invocation/read surface used by the invocation collaborator. Listings are
//! always asynchronous; the direct surface ignores visibility entirely.

pub mod facade;
pub mod summaries;

pub use facade::{Discovery, DiscoveryError, DiscoverySurface};
pub use summaries::{PromptSummary, ResourceContent, ResourceSummary, ToolSummary};
