//! Mock provider for testing
//!
//! Provides deterministic, scriptable responses without network dependencies.
//! Every request is recorded so tests can inspect what the router and the
//! orchestration loop actually sent.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use super::error::{ProviderError, ProviderErrorKind, ProviderResult};
use super::traits::{ChatOptions, Provider, ProviderModelConfig};
use crate::logging::Logger;
use crate::types::{
    last_user_message, CancellationToken, ChatMessage, ChatResponse, FunctionCall, Usage,
};

/// One scripted reply
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Answer with this text
    Text(String),
    /// Ask for these function calls
    Calls(Vec<FunctionCall>),
    /// Fail with an error of this kind
    Fail(ProviderErrorKind, String),
}

/// Mock response mode
#[derive(Debug, Clone, Default)]
pub enum MockMode {
    /// Echo back the last user message
    #[default]
    Echo,
    /// Return a fixed response
    Fixed(String),
    /// Play replies in order, then fall back to echo
    Script(Vec<MockReply>),
    /// Fail every call with this kind
    Error { kind: ProviderErrorKind, message: String },
}

/// Configuration for the mock provider
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Provider name reported by `name()`
    pub name: String,
    /// Response mode
    pub mode: MockMode,
    /// Delay before answering in milliseconds (0 = no delay)
    pub delay_ms: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            mode: MockMode::Echo,
            delay_ms: 0,
        }
    }
}

/// What the mock received on one call
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub model: String,
    pub api_base: Option<String>,
    pub messages: Vec<ChatMessage>,
    /// Names of the tools offered, `None` for answer-only calls
    pub tools: Option<Vec<String>>,
}

/// Mock LLM provider for testing
pub struct MockProvider {
    config: MockConfig,
    script: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<RecordedRequest>>,
    logger: Arc<dyn Logger>,
}

impl MockProvider {
    /// Create with specific config
    pub fn with_config(config: MockConfig, logger: Arc<dyn Logger>) -> Self {
        let script = match &config.mode {
            MockMode::Script(replies) => replies.iter().cloned().collect(),
            _ => VecDeque::new(),
        };
        Self {
            config,
            script: Mutex::new(script),
            requests: Mutex::new(Vec::new()),
            logger,
        }
    }

    /// Create an echo provider (echoes back user message)
    pub fn echo(logger: Arc<dyn Logger>) -> Self {
        Self::with_config(MockConfig::default(), logger)
    }

    /// Create a fixed response provider
    pub fn fixed(response: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self::with_config(
            MockConfig {
                mode: MockMode::Fixed(response.into()),
                ..Default::default()
            },
            logger,
        )
    }

    /// Create a provider that plays `replies` in order
    pub fn scripted(replies: Vec<MockReply>, logger: Arc<dyn Logger>) -> Self {
        Self::with_config(
            MockConfig {
                mode: MockMode::Script(replies),
                ..Default::default()
            },
            logger,
        )
    }

    /// Create a provider whose every call fails with `kind`
    pub fn failing(kind: ProviderErrorKind, message: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self::with_config(
            MockConfig {
                mode: MockMode::Error {
                    kind,
                    message: message.into(),
                },
                ..Default::default()
            },
            logger,
        )
    }

    /// Report a different provider name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Set the answer delay
    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.config.delay_ms = delay_ms;
        self
    }

    /// Every request received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Number of calls received
    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    fn echo_reply(messages: &[ChatMessage]) -> String {
        let text = last_user_message(messages).unwrap_or("Hello from MockProvider!");
        format!("Echo: {}", text)
    }

    fn next_reply(&self, messages: &[ChatMessage]) -> MockReply {
        match &self.config.mode {
            MockMode::Echo => MockReply::Text(Self::echo_reply(messages)),
            MockMode::Fixed(text) => MockReply::Text(text.clone()),
            MockMode::Error { kind, message } => MockReply::Fail(*kind, message.clone()),
            MockMode::Script(_) => self
                .script
                .lock()
                .pop_front()
                .unwrap_or_else(|| MockReply::Text(Self::echo_reply(messages))),
        }
    }

    /// Rough usage figures so cost and metrics code has something to add up
    fn usage_for(messages: &[ChatMessage], output: &str) -> Usage {
        let prompt: usize = messages.iter().map(|m| m.char_len()).sum();
        Usage::new((prompt / 4) as u32, (output.len() / 4) as u32)
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        model: ProviderModelConfig,
        options: ChatOptions,
        cancel_token: CancellationToken,
    ) -> ProviderResult<ChatResponse> {
        self.logger.debug(&format!(
            "MockProvider[{}]: chat called, model={}, {} messages, tools={}",
            self.config.name,
            model.model,
            messages.len(),
            options.has_tools()
        ));

        self.requests.lock().push(RecordedRequest {
            model: model.model.clone(),
            api_base: model.api_base.clone(),
            messages: messages.clone(),
            tools: options
                .tools
                .as_ref()
                .map(|tools| tools.iter().map(|t| t.name.clone()).collect()),
        });

        let delay = tokio::time::sleep(Duration::from_millis(self.config.delay_ms));
        if cancel_token.run_until_cancelled(delay).await.is_none() {
            return Err(ProviderError::Cancelled);
        }

        match self.next_reply(&messages) {
            MockReply::Text(text) => {
                let usage = Self::usage_for(&messages, &text);
                Ok(ChatResponse::text(text, usage))
            }
            MockReply::Calls(calls) => {
                let usage = Self::usage_for(&messages, "");
                Ok(ChatResponse::with_calls("", calls, usage))
            }
            MockReply::Fail(kind, message) => {
                self.logger.debug(&format!(
                    "MockProvider[{}]: failing with {}",
                    self.config.name, kind
                ));
                Err(ProviderError::from_kind(self.config.name.clone(), kind, message))
            }
        }
    }
}
