//! Error types for the persona-relay domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; the dispatcher wraps them
//! with `#[from]` and never re-classifies a failure.

use thiserror::Error;

/// The top-level error type for one persona-relay invocation.
#[derive(Debug, Error)]
pub enum Error {
    // --- Context store errors ---
    #[error("Context store error: {0}")]
    Memory(#[from] MemoryError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// A prompt input was empty or whitespace; raised before any I/O.
    #[error("Invalid generation request: {0}")]
    Validation(String),

    /// The endpoint answered with a non-success status.
    #[error("Remote service returned status {status_code}: {body}")]
    RemoteService { status_code: u16, body: String },

    /// The endpoint answered 2xx but the body was not a JSON document.
    #[error("Invalid response from provider: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Generation cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid payload for {tool_name}: {reason}")]
    InvalidPayload { tool_name: String, reason: String },

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Context(#[from] MemoryError),
}

impl ToolError {
    /// A short stable identifier for structured error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::NotFound(_) => "not_found",
            ToolError::InvalidPayload { .. } => "invalid_payload",
            ToolError::Provider(ProviderError::Validation(_)) => "validation",
            ToolError::Provider(ProviderError::RemoteService { .. }) => "remote_service",
            ToolError::Provider(ProviderError::InvalidResponse(_)) => "invalid_response",
            ToolError::Provider(ProviderError::Network(_)) => "network",
            ToolError::Provider(ProviderError::Cancelled) => "cancelled",
            ToolError::Context(_) => "context_store",
        }
    }
}
