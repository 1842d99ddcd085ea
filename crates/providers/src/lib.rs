//! Generation client and LLM provider implementations for persona-relay.
//!
//! All backends implement the `persona_core::Provider` trait.
//! [`GenerationClient`] validates prompts and delegates to whichever backend
//! [`build_from_config`] selected.

pub mod azure_openai;
pub mod client;
pub mod mock;
pub mod router;

pub use azure_openai::AzureOpenAiProvider;
pub use client::GenerationClient;
pub use mock::MockProvider;
pub use router::build_from_config;
