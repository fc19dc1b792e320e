//! # Routers
//!
//! Named, validated groupings of tool names, compiled at setup into
//! invokable meta-tools. A router's tool answers an invocation with the
//! current metadata of its members, filtered through the same visibility
//! evaluation as discovery — a router never reveals a member the caller
//! could not have discovered directly.

pub mod compiler;
pub mod router;

pub use compiler::{compile, suggest, RouterCompileError};
pub use router::RouterDef;
