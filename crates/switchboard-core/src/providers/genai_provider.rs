//! GenaiProvider - Unified provider using the genai crate
//!
//! Handles every genai-supported backend (OpenAI, Anthropic, Gemini, etc.)
//! plus OpenAI-compatible endpoints (Azure, OpenRouter, Mistral) via the
//! ServiceTargetResolver.

use async_trait::async_trait;
use std::sync::Arc;

use genai::chat::ChatRequest;

use crate::logging::Logger;
use crate::secrets::SecretStore;
use crate::types::{CancellationToken, ChatMessage, ChatResponse};

use super::error::{ProviderError, ProviderResult};
use super::genai_adapter::{
    create_client, from_genai_error, from_genai_response, is_genai_supported, to_genai_messages, to_genai_options,
    to_genai_tools, ProviderConnection,
};
use super::traits::{ChatOptions, Provider, ProviderModelConfig};

/// Unified provider using genai for all supported LLM APIs
pub struct GenaiProvider {
    /// Provider identifier
    provider_id: String,
    /// Where API keys come from when the model config has none
    secrets: Arc<dyn SecretStore>,
    logger: Arc<dyn Logger>,
}

impl GenaiProvider {
    /// Create a new GenaiProvider
    pub fn new(provider_id: impl Into<String>, secrets: Arc<dyn SecretStore>, logger: Arc<dyn Logger>) -> Self {
        Self {
            provider_id: provider_id.into(),
            secrets,
            logger,
        }
    }

    /// Check if this provider can handle the given provider ID
    pub fn supports(provider_id: &str) -> bool {
        is_genai_supported(provider_id)
    }

    /// Extract model name from a model string (e.g., "openai/gpt-4" -> "gpt-4")
    pub fn extract_model_name(model: &str) -> &str {
        model.split_once('/').map(|(_, name)| name).unwrap_or(model)
    }
}

#[async_trait]
impl Provider for GenaiProvider {
    fn name(&self) -> &str {
        &self.provider_id
    }

    async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        model_config: ProviderModelConfig,
        options: ChatOptions,
        cancel_token: CancellationToken,
    ) -> ProviderResult<ChatResponse> {
        let model_name = Self::extract_model_name(&model_config.model).to_string();

        self.logger.info(&format!(
            "[GenaiProvider] chat: provider={}, model={}, tools={}",
            self.provider_id,
            model_name,
            options.tools.as_ref().map(|t| t.len()).unwrap_or(0)
        ));

        let connection = ProviderConnection {
            provider: self.provider_id.clone(),
            api_key: model_config.api_key.clone(),
            api_base: model_config.api_base.clone(),
        };
        let client = create_client(&connection, Arc::clone(&self.secrets));

        let mut chat_req = ChatRequest::new(to_genai_messages(messages));
        if let Some(tools) = &options.tools {
            chat_req = chat_req.with_tools(to_genai_tools(tools.clone()));
        }
        let genai_options = to_genai_options(&options);

        let call = client.exec_chat(&model_name, chat_req, Some(&genai_options));
        let Some(result) = cancel_token.run_until_cancelled(call).await else {
            self.logger.info("[GenaiProvider] Request cancelled");
            return Err(ProviderError::Cancelled);
        };
        let response = result.map_err(|e| {
            self.logger.warn(&format!("[GenaiProvider] {} error: {}", self.provider_id, e));
            from_genai_error(&self.provider_id, &e)
        })?;

        let normalized = from_genai_response(&self.provider_id, &response)?;
        self.logger.debug(&format!(
            "[GenaiProvider] completed: {} chars, {} function calls, {} tokens",
            normalized.content.len(),
            normalized.function_calls.len(),
            normalized.usage.total_tokens
        ));
        Ok(normalized)
    }
}
