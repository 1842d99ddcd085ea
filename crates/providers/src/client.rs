//! Generation client: the single entry point for model calls.
//!
//! Validates the two prompt parts, then hands the request to the configured
//! backend. Validation failures never reach the backend.

use persona_core::error::ProviderError;
use persona_core::provider::{GenerationRequest, GenerationResult, Provider};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct GenerationClient {
    provider: Arc<dyn Provider>,
}

impl GenerationClient {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self { provider }
    }

    /// Name of the backend in use.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Generate an answer for a system instruction and user content.
    ///
    /// An empty [`GenerationResult`] is a successful "no answer".
    pub async fn generate(
        &self,
        system_instruction: &str,
        user_content: &str,
        cancel: &CancellationToken,
    ) -> Result<GenerationResult, ProviderError> {
        let request = GenerationRequest::new(system_instruction, user_content)
            .inspect_err(|e| warn!(error = %e, "Rejected generation request"))?;

        debug!(
            provider = self.provider.name(),
            user_len = request.user_content().len(),
            "Generating response"
        );

        let result = self.provider.complete(&request, cancel).await?;
        if result.is_empty() {
            debug!(provider = self.provider.name(), "Provider returned no candidate text");
        }
        Ok(result)
    }
}
