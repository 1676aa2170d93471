//! Chat message types

use serde::{Deserialize, Serialize};

use super::tool::{FunctionCall, ToolExecutionResult};

/// Message role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
            MessageRole::Tool => write!(f, "tool"),
        }
    }
}

/// A chat message for LLM requests
///
/// Tool-role messages carry the id of the function call they answer, and
/// assistant messages carry the function calls they requested, so adapters
/// can pair calls with results in provider-native formats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the message sender
    pub role: MessageRole,
    /// The text content of the message
    pub content: String,
    /// For tool messages: the function call this message answers
    #[serde(rename = "toolCallId", default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// For assistant messages: function calls requested by the model
    #[serde(rename = "functionCalls", default, skip_serializing_if = "Vec::is_empty")]
    pub function_calls: Vec<FunctionCall>,
}

impl ChatMessage {
    fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_call_id: None,
            function_calls: Vec::new(),
        }
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// Create an assistant message that records the function calls it made
    pub fn assistant_with_calls(content: impl Into<String>, calls: Vec<FunctionCall>) -> Self {
        Self {
            function_calls: calls,
            ..Self::new(MessageRole::Assistant, content)
        }
    }

    /// Create a tool message answering `call_id`
    pub fn tool(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(call_id.into()),
            ..Self::new(MessageRole::Tool, content)
        }
    }

    /// Create a tool message whose content is the serialized execution result
    pub fn tool_result(call_id: impl Into<String>, result: &ToolExecutionResult) -> Self {
        Self::tool(call_id, result.to_message_content())
    }

    /// Get the text content
    pub fn text(&self) -> &str {
        &self.content
    }

    /// Approximate number of characters this message contributes to a prompt
    pub fn char_len(&self) -> usize {
        let calls: usize = self
            .function_calls
            .iter()
            .map(|c| c.name.len() + c.arguments.to_string().len())
            .sum();
        self.content.chars().count() + calls
    }
}

/// Find the content of the most recent user message
pub fn last_user_message(messages: &[ChatMessage]) -> Option<&str> {
    messages
        .iter()
        .rev()
        .find(|m| m.role == MessageRole::User)
        .map(|m| m.content.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chat_message_creation() {
        let sys = ChatMessage::system("You are helpful");
        assert_eq!(sys.role, MessageRole::System);
        assert_eq!(sys.text(), "You are helpful");

        let user = ChatMessage::user("Hello");
        assert_eq!(user.role, MessageRole::User);

        let asst = ChatMessage::assistant("Hi there!");
        assert_eq!(asst.role, MessageRole::Assistant);

        let tool = ChatMessage::tool("call_1", "{}");
        assert_eq!(tool.role, MessageRole::Tool);
        assert_eq!(tool.tool_call_id.as_deref(), Some("call_1"));
    }

    #[test]
    fn test_message_serialization() {
        let msg = ChatMessage::user("Hello");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"role\":\"user\""));
        assert!(json.contains("\"content\":\"Hello\""));
        assert!(!json.contains("toolCallId"));
        assert!(!json.contains("functionCalls"));
    }

    #[test]
    fn test_assistant_with_calls_serialization() {
        let call = FunctionCall::new("call_1", "get_budget", json!({"month": "may"}));
        let msg = ChatMessage::assistant_with_calls("", vec![call]);
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("functionCalls"));
        assert!(json.contains("get_budget"));
    }

    #[test]
    fn test_last_user_message() {
        let messages = vec![
            ChatMessage::system("sys"),
            ChatMessage::user("first"),
            ChatMessage::assistant("reply"),
            ChatMessage::user("second"),
            ChatMessage::tool("c1", "{}"),
        ];
        assert_eq!(last_user_message(&messages), Some("second"));
        assert_eq!(last_user_message(&messages[..1]), None);
    }
}
