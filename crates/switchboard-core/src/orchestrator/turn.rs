//! Turn request/response types and turn errors

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::router::{Priority, RouterError};
use crate::types::{last_user_message, ChatMessage, ToolExecutionResult, Usage};

/// One user turn to run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRequest {
    pub user_id: String,
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub needs_tools: bool,
    #[serde(default)]
    pub long_context: bool,
    #[serde(default)]
    pub streaming: bool,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl TurnRequest {
    pub fn new(user_id: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            user_id: user_id.into(),
            messages,
            needs_tools: false,
            long_context: false,
            streaming: false,
            priority: Priority::Normal,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_tools(mut self) -> Self {
        self.needs_tools = true;
        self
    }

    pub fn with_long_context(mut self) -> Self {
        self.long_context = true;
        self
    }

    pub fn with_streaming(mut self) -> Self {
        self.streaming = true;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Reject requests that cannot be routed
    pub fn validate(&self) -> Result<(), TurnError> {
        if self.user_id.trim().is_empty() {
            return Err(TurnError::validation("user_id is required"));
        }
        if self.messages.is_empty() {
            return Err(TurnError::validation("at least one message is required"));
        }
        if last_user_message(&self.messages).is_none() {
            return Err(TurnError::validation("a user message is required"));
        }
        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(TurnError::validation("temperature must be between 0 and 2"));
            }
        }
        if self.max_tokens == Some(0) {
            return Err(TurnError::validation("max_tokens must be greater than 0"));
        }
        Ok(())
    }
}

/// Steps of a turn, recorded in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    Start,
    Prefiltering,
    Routing,
    ProviderCall,
    ToolExecution,
    FollowUp,
    Done,
    Failed,
}

/// Final answer for a turn
#[derive(Debug, Clone, Serialize)]
pub struct TurnResponse {
    pub content: String,
    /// Model that produced `content`
    pub model: String,
    pub provider: String,
    /// Summed across the initial call and the follow-up
    pub usage: Usage,
    pub latency_ms: u64,
    pub tool_results: Vec<ToolExecutionResult>,
    pub states: Vec<TurnState>,
}

/// Why a turn failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnErrorKind {
    Validation,
    NoCapableModel,
    ProvidersExhausted,
    Timeout,
    Cancelled,
}

/// Turn-fatal error carrying one user-facing message
///
/// Provider detail stays in the logs and metrics.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("{message}")]
pub struct TurnError {
    pub kind: TurnErrorKind,
    pub message: String,
}

impl TurnError {
    pub fn new(kind: TurnErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(TurnErrorKind::Validation, message)
    }

    pub fn timeout(after: Duration) -> Self {
        Self::new(
            TurnErrorKind::Timeout,
            format!("The request took longer than {}s and was stopped.", after.as_secs()),
        )
    }

    pub fn cancelled() -> Self {
        Self::new(TurnErrorKind::Cancelled, "The request was cancelled.")
    }
}

impl From<RouterError> for TurnError {
    fn from(err: RouterError) -> Self {
        match err {
            RouterError::NoCapableModel { .. } => Self::new(
                TurnErrorKind::NoCapableModel,
                "No available model can handle this request.",
            ),
            RouterError::AllProvidersExhausted { .. } => Self::new(
                TurnErrorKind::ProvidersExhausted,
                "All AI providers are currently unavailable. Please try again shortly.",
            ),
            RouterError::Cancelled => Self::cancelled(),
        }
    }
}

pub type TurnResult<T> = Result<T, TurnError>;
