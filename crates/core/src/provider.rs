//! Provider trait: the abstraction over the generation backend.
//!
//! A Provider knows how to send one system + user exchange to a language
//! model and return the generated text. Implementations: Azure OpenAI
//! (production) and a deterministic mock used by tests and offline runs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use crate::error::ProviderError;
use crate::message::ChatMessage;

/// A validated single-turn generation request.
///
/// Both fields are non-empty after trimming; [`GenerationRequest::new`] is
/// the only way to build one outside this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    system_instruction: String,
    user_content: String,
}

impl GenerationRequest {
    pub fn new(
        system_instruction: impl Into<String>,
        user_content: impl Into<String>,
    ) -> std::result::Result<Self, ProviderError> {
        let system_instruction = system_instruction.into();
        let user_content = user_content.into();

        if system_instruction.trim().is_empty() {
            return Err(ProviderError::Validation(
                "System prompt must be provided.".into(),
            ));
        }
        if user_content.trim().is_empty() {
            return Err(ProviderError::Validation(
                "User prompt must be provided.".into(),
            ));
        }

        Ok(Self {
            system_instruction,
            user_content,
        })
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    pub fn user_content(&self) -> &str {
        &self.user_content
    }

    /// The two ordered chat messages: system first, then user.
    pub fn messages(&self) -> [ChatMessage; 2] {
        [
            ChatMessage::system(&self.system_instruction),
            ChatMessage::user(&self.user_content),
        ]
    }
}

/// The generated answer. Empty text means "no answer", not failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub text: String,
}

impl GenerationResult {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// The core Provider trait.
///
/// One best-effort attempt per call: no retries, no timeouts. The call must
/// return [`ProviderError::Cancelled`] promptly once `cancel` fires.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "azure_openai", "mock").
    fn name(&self) -> &str;

    /// Send a request and get the generated text back.
    async fn complete(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> std::result::Result<GenerationResult, ProviderError>;
}
