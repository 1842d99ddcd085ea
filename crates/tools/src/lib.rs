//! Built-in tool implementations for persona-relay.
//!
//! Tools are the named capabilities callers invoke through the registry:
//! `personaAnalysis` runs the retrieve → assemble → generate pipeline,
//! `echo` is a connectivity check.

pub mod echo;
pub mod persona;
pub mod persona_analysis;
pub mod prompt;

use persona_core::context::ContextStore;
use persona_core::tool::ToolRegistry;
use persona_providers::GenerationClient;
use std::sync::Arc;

pub use persona_analysis::{PersonaAnalysis, PersonaAnalysisTool, PersonaInput};

/// Create the registry with every built-in tool.
///
/// The set is closed: this is the only place tools are registered.
pub fn default_registry(
    store: Arc<dyn ContextStore>,
    client: GenerationClient,
    search_limit: usize,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(
        PersonaAnalysisTool::new(store, client).with_search_limit(search_limit),
    ));
    registry.register(Box::new(echo::EchoTool));
    registry
}
