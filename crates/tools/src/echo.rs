//! Echo tool: answers `hello {message}`; handy for checking the wiring.

use async_trait::async_trait;
use persona_core::error::ToolError;
use persona_core::tool::{Tool, ToolResult, decode_payload};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

#[derive(Deserialize)]
struct EchoInput {
    message: String,
}

pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echoes the message back to the client."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "message": { "type": "string" }
            },
            "required": ["message"]
        })
    }

    async fn execute(
        &self,
        payload: serde_json::Value,
        _cancel: &CancellationToken,
    ) -> Result<ToolResult, ToolError> {
        let input: EchoInput = decode_payload(self.name(), payload)?;
        Ok(ToolResult {
            tool: self.name().to_string(),
            output: serde_json::Value::String(format!("hello {}", input.message)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn echoes_with_greeting() {
        let result = EchoTool
            .execute(serde_json::json!({"message": "world"}), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(result.output, "hello world");
    }

    #[tokio::test]
    async fn missing_message_is_invalid_payload() {
        let err = EchoTool
            .execute(serde_json::json!({}), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidPayload { .. }));
    }
}
