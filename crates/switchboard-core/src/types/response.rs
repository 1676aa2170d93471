//! Normalized completion response types

use serde::{Deserialize, Serialize};

use super::tool::FunctionCall;

/// Token usage reported by a provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl Usage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }

    /// Sum of two usage records (e.g. initial call plus follow-up)
    pub fn combine(self, other: Usage) -> Usage {
        Usage {
            prompt_tokens: self.prompt_tokens + other.prompt_tokens,
            completion_tokens: self.completion_tokens + other.completion_tokens,
            total_tokens: self.total_tokens + other.total_tokens,
        }
    }
}

/// Why the model stopped generating
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    #[default]
    Stop,
    ToolCalls,
    Length,
    Other,
}

/// A completion as returned by any provider adapter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: String,
    pub usage: Usage,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub function_calls: Vec<FunctionCall>,
    pub finish_reason: FinishReason,
}

impl ChatResponse {
    /// A plain text answer
    pub fn text(content: impl Into<String>, usage: Usage) -> Self {
        Self {
            content: content.into(),
            usage,
            function_calls: Vec::new(),
            finish_reason: FinishReason::Stop,
        }
    }

    /// A response requesting function calls
    pub fn with_calls(content: impl Into<String>, calls: Vec<FunctionCall>, usage: Usage) -> Self {
        Self {
            content: content.into(),
            usage,
            function_calls: calls,
            finish_reason: FinishReason::ToolCalls,
        }
    }

    /// Whether the model asked for at least one function call
    pub fn has_function_calls(&self) -> bool {
        !self.function_calls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_usage_combine() {
        let total = Usage::new(10, 5).combine(Usage::new(20, 7));
        assert_eq!(total, Usage::new(30, 12));
        assert_eq!(total.total_tokens, 42);
    }

    #[test]
    fn test_response_kinds() {
        let plain = ChatResponse::text("hi", Usage::default());
        assert!(!plain.has_function_calls());
        assert_eq!(plain.finish_reason, FinishReason::Stop);

        let call = FunctionCall::new("c1", "memory", json!({}));
        let calls = ChatResponse::with_calls("", vec![call], Usage::default());
        assert!(calls.has_function_calls());
        assert_eq!(calls.finish_reason, FinishReason::ToolCalls);
    }
}
