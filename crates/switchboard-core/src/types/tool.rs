//! Tool/function calling types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tool definition offered to the model for function calling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name (function name), unique within a registry
    pub name: String,
    /// Description of what the tool does, written for the model
    pub description: String,
    /// JSON Schema for the input parameters
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl ToolDefinition {
    /// Create a new tool definition with an empty object schema
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: serde_json::json!({ "type": "object", "properties": {} }),
        }
    }

    /// Set the input schema
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.input_schema = schema;
        self
    }

    /// Names listed under the schema's `required` key
    pub fn required_params(&self) -> Vec<&str> {
        self.input_schema
            .get("required")
            .and_then(|r| r.as_array())
            .map(|r| r.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default()
    }
}

/// Function call requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Unique identifier for this call
    pub id: String,
    /// Name of the tool being called
    pub name: String,
    /// Arguments for the tool
    pub arguments: Value,
    /// Opaque reasoning signatures some providers attach to a call batch;
    /// they must be sent back with the calls on the follow-up request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought_signatures: Option<Vec<String>>,
}

impl FunctionCall {
    /// Create a new function call
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
            thought_signatures: None,
        }
    }

    pub fn with_thought_signatures(mut self, signatures: Vec<String>) -> Self {
        self.thought_signatures = Some(signatures);
        self
    }
}

/// Why a tool invocation did not succeed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    /// The call named a tool the registry does not know
    UnknownTool,
    /// Arguments were not an object or missed a required key
    InvalidArguments,
    /// The tool ran and reported a failure (or panicked)
    Execution,
    /// The tool did not finish within its deadline
    Timeout,
}

/// Uniform envelope for one tool invocation
///
/// Serialized into the tool-role message that answers the call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolExecutionResult {
    pub success: bool,
    pub tool_name: String,
    pub result: Option<Value>,
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ToolErrorKind>,
    pub execution_time_ms: u64,
}

impl ToolExecutionResult {
    /// Create a successful result
    pub fn success(tool_name: impl Into<String>, result: Value, execution_time_ms: u64) -> Self {
        Self {
            success: true,
            tool_name: tool_name.into(),
            result: Some(result),
            error: None,
            error_kind: None,
            execution_time_ms,
        }
    }

    /// Create a failed result
    pub fn failure(
        tool_name: impl Into<String>,
        kind: ToolErrorKind,
        error: impl Into<String>,
        execution_time_ms: u64,
    ) -> Self {
        Self {
            success: false,
            tool_name: tool_name.into(),
            result: None,
            error: Some(error.into()),
            error_kind: Some(kind),
            execution_time_ms,
        }
    }

    /// JSON text placed in the tool-role message
    pub fn to_message_content(&self) -> String {
        // Serializing a struct of strings and JSON values cannot fail
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                "{{\"success\":false,\"tool_name\":{:?},\"error\":\"unserializable result\"}}",
                self.tool_name
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_creation() {
        let tool = ToolDefinition::new("get_weather", "Get the current weather").with_schema(json!({
            "type": "object",
            "properties": {
                "location": { "type": "string" }
            },
            "required": ["location"]
        }));

        assert_eq!(tool.name, "get_weather");
        assert_eq!(tool.required_params(), vec!["location"]);
    }

    #[test]
    fn test_default_schema_has_no_required() {
        let tool = ToolDefinition::new("memory", "Recall facts");
        assert!(tool.required_params().is_empty());
        assert_eq!(tool.input_schema["type"], "object");
    }

    #[test]
    fn test_function_call_signatures_are_optional() {
        let call = FunctionCall::new("call_123", "get_budget", json!({ "amount": 42 }));
        let value = serde_json::to_value(&call).unwrap();
        assert!(value.get("thought_signatures").is_none());

        let parsed: FunctionCall =
            serde_json::from_value(json!({ "id": "c", "name": "memory", "arguments": {} })).unwrap();
        assert_eq!(parsed.thought_signatures, None);

        let signed = call.with_thought_signatures(vec!["sig-a".into()]);
        let back: FunctionCall = serde_json::from_value(serde_json::to_value(&signed).unwrap()).unwrap();
        assert_eq!(back.thought_signatures, Some(vec!["sig-a".to_string()]));
    }

    #[test]
    fn test_result_message_content_parses_back() {
        let ok = ToolExecutionResult::success("get_budget", json!({ "remaining": 120 }), 3);
        let parsed: ToolExecutionResult = serde_json::from_str(&ok.to_message_content()).unwrap();
        assert!(parsed.success);
        assert_eq!(parsed.tool_name, "get_budget");
        assert_eq!(parsed.error_kind, None);

        let failed = ToolExecutionResult::failure("nope", ToolErrorKind::UnknownTool, "unknown tool", 0);
        let value: Value = serde_json::from_str(&failed.to_message_content()).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "unknown tool");
        assert_eq!(value["error_kind"], "unknown_tool");
    }
}
