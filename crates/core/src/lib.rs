//! # persona-relay core
//!
//! Domain types, traits, and error definitions for the persona-relay
//! pipeline. This crate has **no framework dependencies**: it defines the
//! model that the store, provider, tool and gateway crates implement against.
//!
//! ## Seams
//!
//! - [`ContextStore`] holds the retrieval snippets.
//! - [`Provider`] is the transport behind generation (real or mock).
//! - [`Tool`] is one named capability; [`ToolRegistry`] is the closed
//!   dispatcher over them.

pub mod context;
pub mod error;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use context::{ContextEntry, ContextStore, NO_CONTEXT_AVAILABLE, NO_RELEVANT_CONTEXT};
pub use error::{Error, MemoryError, ProviderError, Result, ToolError};
pub use message::{ChatMessage, Role};
pub use provider::{GenerationRequest, GenerationResult, Provider};
pub use tool::{Tool, ToolDefinition, ToolRegistry, ToolResult};
