//! Persona analysis tool: retrieval-grounded, persona-conditioned answers.
//!
//! Pipeline per invocation, in fixed order:
//! 1. rank stored context against the query (top N),
//! 2. resolve the persona directive,
//! 3. assemble the prompt,
//! 4. call the generation client.
//!
//! The first failure ends the invocation and is returned unchanged.

use async_trait::async_trait;
use persona_core::context::ContextStore;
use persona_core::error::ToolError;
use persona_core::tool::{Tool, ToolResult, decode_payload};
use persona_providers::GenerationClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use crate::{persona, prompt};

/// How many context entries are retrieved per invocation by default.
pub const DEFAULT_CONTEXT_LIMIT: usize = 5;

/// The decoded invocation payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaInput {
    pub query: String,
    pub persona: String,
}

/// The composite result returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaAnalysis {
    pub persona: String,
    pub query: String,
    /// Generated text; empty when the model produced no answer.
    pub response: String,
}

pub struct PersonaAnalysisTool {
    store: Arc<dyn ContextStore>,
    client: GenerationClient,
    search_limit: usize,
}

impl PersonaAnalysisTool {
    pub fn new(store: Arc<dyn ContextStore>, client: GenerationClient) -> Self {
        Self {
            store,
            client,
            search_limit: DEFAULT_CONTEXT_LIMIT,
        }
    }

    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit;
        self
    }

    /// Run the pipeline for an already-decoded input.
    pub async fn analyze(
        &self,
        input: PersonaInput,
        cancel: &CancellationToken,
    ) -> Result<PersonaAnalysis, ToolError> {
        let context_block = self.store.search(&input.query, self.search_limit).await?;
        let instruction = persona::resolve(&input.persona);
        let prompt = prompt::assemble(instruction, &context_block, &input.query, &input.persona);

        debug!(
            persona = %input.persona,
            directive = persona::directive(&input.persona).label,
            context_len = context_block.len(),
            "Assembled persona prompt"
        );

        let result = self
            .client
            .generate(&prompt.system_instruction, &prompt.user_content, cancel)
            .await?;

        Ok(PersonaAnalysis {
            persona: input.persona,
            query: input.query,
            response: result.text,
        })
    }
}

#[async_trait]
impl Tool for PersonaAnalysisTool {
    fn name(&self) -> &str {
        "personaAnalysis"
    }

    fn description(&self) -> &str {
        "Answer a query in the voice of a persona (optimistic, pessimistic, neutral), grounded in stored context."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The user's question"
                },
                "persona": {
                    "type": "string",
                    "description": "Persona label: optimistic, pessimistic, or neutral. Anything else answers neutrally.",
                    "enum": ["optimistic", "pessimistic", "neutral"]
                }
            },
            "required": ["query", "persona"]
        })
    }

    async fn execute(
        &self,
        payload: serde_json::Value,
        cancel: &CancellationToken,
    ) -> Result<ToolResult, ToolError> {
        let input: PersonaInput = decode_payload(self.name(), payload)?;
        let analysis = self.analyze(input, cancel).await?;

        Ok(ToolResult {
            tool: self.name().to_string(),
            output: serde_json::json!({
                "persona": analysis.persona,
                "query": analysis.query,
                "response": analysis.response,
            }),
        })
    }
}
