//! Azure OpenAI chat-completion provider.
//!
//! Talks to a deployment-scoped endpoint:
//! `POST {endpoint}/openai/deployments/{deployment}/chat/completions?api-version=...`
//! authenticated with an `api-key` header.
//!
//! Status failures are errors; a well-formed response without a candidate
//! answer is an empty result plus a warning.

use async_trait::async_trait;
use persona_config::{AzureOpenAiConfig, AzureOpenAiSettings, ConfigError};
use persona_core::error::ProviderError;
use persona_core::message::ChatMessage;
use persona_core::provider::{GenerationRequest, GenerationResult, Provider};
use reqwest::Url;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// A provider backed by one Azure OpenAI deployment.
pub struct AzureOpenAiProvider {
    completions_url: Url,
    api_key: String,
    api_version: String,
    client: reqwest::Client,
}

impl AzureOpenAiProvider {
    /// Create a provider from resolved settings.
    ///
    /// No request timeout is set; callers bound a call with cancellation.
    pub fn new(settings: AzureOpenAiSettings) -> Result<Self, ConfigError> {
        let completions_url = completions_url(&settings.endpoint, &settings.deployment)?;

        let client = reqwest::Client::builder().build().map_err(|e| {
            ConfigError::ValidationError(format!("failed to create HTTP client: {e}"))
        })?;

        Ok(Self {
            completions_url,
            api_key: settings.api_key,
            api_version: settings.api_version,
            client,
        })
    }

    /// Create a provider from the config section, failing on missing fields.
    pub fn from_config(config: &AzureOpenAiConfig) -> Result<Self, ConfigError> {
        Self::new(config.require()?)
    }

    async fn send(&self, request: &GenerationRequest) -> Result<GenerationResult, ProviderError> {
        let body = ApiRequest {
            messages: request.messages(),
        };

        debug!(
            url = %self.completions_url,
            api_version = %self.api_version,
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(self.completions_url.clone())
            .query(&[("api-version", self.api_version.as_str())])
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %error_body, "Azure OpenAI request failed");
            return Err(ProviderError::RemoteService {
                status_code: status.as_u16(),
                body: error_body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let document: serde_json::Value = serde_json::from_slice(&bytes)
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        Ok(GenerationResult::new(first_choice_content(&document)))
    }
}

/// Build the chat-completions URL. The path replaces any path on the
/// configured endpoint; the deployment is percent-encoded as one segment.
fn completions_url(endpoint: &str, deployment: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(endpoint).map_err(|e| {
        ConfigError::ValidationError(format!("azure_openai.endpoint is not a valid URL: {e}"))
    })?;

    url.path_segments_mut()
        .map_err(|_| {
            ConfigError::ValidationError("azure_openai.endpoint cannot carry a path".into())
        })?
        .clear()
        .extend(["openai", "deployments", deployment, "chat", "completions"]);
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}

/// `choices[0].message.content`, or an empty string (with a warning) when any
/// step of that path is absent.
fn first_choice_content(document: &serde_json::Value) -> String {
    let content = document
        .get("choices")
        .and_then(|choices| choices.as_array())
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(|content| content.as_str());

    match content {
        Some(text) => text.to_string(),
        None => {
            warn!(payload = %document, "Azure OpenAI response did not contain any choices");
            String::new()
        }
    }
}

#[async_trait]
impl Provider for AzureOpenAiProvider {
    fn name(&self) -> &str {
        "azure_openai"
    }

    async fn complete(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<GenerationResult, ProviderError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Chat completion cancelled by caller");
                Err(ProviderError::Cancelled)
            }
            result = self.send(request) => result,
        }
    }
}

// --- Azure OpenAI API types (internal) ---

#[derive(Debug, Serialize)]
struct ApiRequest {
    messages: [ChatMessage; 2],
}
