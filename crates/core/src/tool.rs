//! Tool trait: the abstraction over named capabilities.
//!
//! Every inbound invocation names a tool and carries an opaque payload.
//! The [`ToolRegistry`] is the dispatcher: a closed map from tool name to a
//! statically known handler, populated once at startup.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use crate::error::ToolError;

/// Describes a registered tool to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON Schema describing the tool's payload
    pub parameters: serde_json::Value,
}

/// The result of a tool execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// The tool that produced this result
    pub tool: String,

    /// The structured output returned to the caller
    pub output: serde_json::Value,
}

/// The core Tool trait.
///
/// Each capability (`personaAnalysis`, `echo`) implements this trait and is
/// registered in the ToolRegistry.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "personaAnalysis").
    fn name(&self) -> &str;

    /// A description of what this tool does.
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's payload.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with an already-normalized JSON object payload.
    async fn execute(
        &self,
        payload: serde_json::Value,
        cancel: &CancellationToken,
    ) -> std::result::Result<ToolResult, ToolError>;

    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// Decode a normalized payload into a tool's typed request.
pub fn decode_payload<T: DeserializeOwned>(
    tool_name: &str,
    payload: serde_json::Value,
) -> std::result::Result<T, ToolError> {
    serde_json::from_value(payload).map_err(|e| ToolError::InvalidPayload {
        tool_name: tool_name.to_string(),
        reason: e.to_string(),
    })
}

/// Turn an opaque payload into the JSON object a tool expects.
///
/// A JSON string is treated as the text form of the payload and parsed once
/// more. `null` and non-object values are rejected.
fn normalize_payload(
    tool_name: &str,
    payload: serde_json::Value,
) -> std::result::Result<serde_json::Value, ToolError> {
    let invalid = |reason: String| ToolError::InvalidPayload {
        tool_name: tool_name.to_string(),
        reason,
    };

    let payload = match payload {
        serde_json::Value::String(text) => serde_json::from_str(&text)
            .map_err(|e| invalid(format!("payload text is not JSON: {e}")))?,
        other => other,
    };

    match payload {
        serde_json::Value::Object(_) => Ok(payload),
        serde_json::Value::Null => Err(invalid("payload is null".into())),
        other => Err(invalid(format!("expected a JSON object, got {other}"))),
    }
}

/// The closed tool registry.
///
/// Built once at startup and shared read-only afterwards; there is no
/// runtime discovery.
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Get all tool definitions, sorted by name.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> =
            self.tools.values().map(|t| t.to_definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Invoke a tool with a JSON payload.
    ///
    /// The first failure is returned as-is; nothing is translated here.
    pub async fn invoke(
        &self,
        name: &str,
        payload: serde_json::Value,
        cancel: &CancellationToken,
    ) -> std::result::Result<ToolResult, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        let payload = normalize_payload(name, payload).inspect_err(|e| {
            warn!(tool = name, error = %e, "Rejected tool payload");
        })?;

        debug!(tool = name, "Invoking tool");
        tool.execute(payload, cancel).await
    }

    /// Invoke a tool with the raw text of a payload.
    pub async fn invoke_raw(
        &self,
        name: &str,
        raw: &str,
        cancel: &CancellationToken,
    ) -> std::result::Result<ToolResult, ToolError> {
        if !self.tools.contains_key(name) {
            return Err(ToolError::NotFound(name.to_string()));
        }
        let payload = serde_json::from_str(raw).map_err(|e| ToolError::InvalidPayload {
            tool_name: name.to_string(),
            reason: format!("payload text is not JSON: {e}"),
        })?;
        self.invoke(name, payload, cancel).await
    }

    /// List all registered tool names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct EchoPayload {
        text: String,
    }

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str { "echo" }
        fn description(&self) -> &str { "Echoes back the input" }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({
                "type": "object",
                "properties": {
                    "text": { "type": "string" }
                },
                "required": ["text"]
            })
        }
        async fn execute(
            &self,
            payload: serde_json::Value,
            _cancel: &CancellationToken,
        ) -> std::result::Result<ToolResult, ToolError> {
            let payload: EchoPayload = decode_payload(self.name(), payload)?;
            Ok(ToolResult {
                tool: self.name().into(),
                output: serde_json::json!({ "text": payload.text }),
            })
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        registry
    }

    #[test]
    fn registry_register_and_lookup() {
        let registry = registry();
        assert!(registry.get("echo").is_some());
        assert!(registry.get("nonexistent").is_none());
        assert_eq!(registry.names(), vec!["echo"]);
        assert_eq!(registry.definitions()[0].name, "echo");
    }

    #[tokio::test]
    async fn invoke_with_object_payload() {
        let result = registry()
            .invoke("echo", serde_json::json!({"text": "hello world"}), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(result.tool, "echo");
        assert_eq!(result.output["text"], "hello world");
    }

    #[tokio::test]
    async fn invoke_with_text_payload() {
        let payload = serde_json::Value::String(r#"{"text": "from text"}"#.into());
        let result = registry()
            .invoke("echo", payload, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(result.output["text"], "from text");
    }

    #[tokio::test]
    async fn invoke_missing_tool() {
        let err = registry()
            .invoke("nonexistent", serde_json::json!({}), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
    }

    #[tokio::test]
    async fn null_payload_is_rejected() {
        let err = registry()
            .invoke("echo", serde_json::Value::Null, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidPayload { .. }));
    }

    #[tokio::test]
    async fn raw_payload_that_is_not_json_is_rejected() {
        let err = registry()
            .invoke_raw("echo", "{not json", &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_payload");
    }

    #[tokio::test]
    async fn raw_json_null_is_rejected() {
        let err = registry()
            .invoke_raw("echo", "null", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidPayload { .. }));
    }

    #[tokio::test]
    async fn missing_field_is_rejected_by_decode() {
        let err = registry()
            .invoke("echo", serde_json::json!({"other": 1}), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidPayload { ref tool_name, .. } if tool_name == "echo"));
    }
}
