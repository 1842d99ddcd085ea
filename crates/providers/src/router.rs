//! Backend selection: builds the configured provider at startup.
//!
//! Missing Azure settings fail here, before any request is served.

use persona_config::{AppConfig, ConfigError, GenerationBackend};
use persona_core::provider::Provider;
use std::sync::Arc;
use tracing::{info, warn};
use crate::azure_openai::AzureOpenAiProvider;
use crate::mock::MockProvider;

/// Build the generation backend named by `generation.backend`.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ConfigError> {
    let provider: Arc<dyn Provider> = match config.generation.backend {
        GenerationBackend::Azure => {
            let provider = AzureOpenAiProvider::from_config(&config.azure_openai)?;
            info!(
                deployment = config.azure_openai.deployment.as_deref().unwrap_or_default(),
                "Using Azure OpenAI generation backend"
            );
            Arc::new(provider)
        }
        GenerationBackend::Mock => {
            warn!("Using mock generation backend; responses are not model-generated");
            Arc::new(MockProvider::new())
        }
    };

    Ok(provider)
}
