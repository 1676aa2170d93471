//! Orchestrator - runs one user turn end to end
//!
//! ```text
//! Start -> Prefiltering -> Routing -> ProviderCall
//!                                        │ function calls?
//!                                        ├── no ──────────────────────────► Done
//!                                        └── yes -> ToolExecution -> FollowUp -> Done
//! ```
//!
//! A turn makes at most one tool round-trip. The follow-up call is sent
//! without a tool schema, and function calls it returns are ignored.

use std::sync::Arc;
use std::time::Instant;

use super::settings::OrchestratorSettings;
use super::turn::{TurnError, TurnRequest, TurnResponse, TurnResult, TurnState};
use crate::config::ConfigFile;
use crate::logging::Logger;
use crate::providers::{create_provider, ChatOptions};
use crate::router::{MetricsSnapshot, ModelRouter, RouteRequest};
use crate::secrets::SecretStore;
use crate::tools::{ToolPrefilter, ToolRegistry};
use crate::types::{last_user_message, CancellationToken, ChatMessage, MessageRole};

/// Shared entry point for turns; cheap to put behind an `Arc`
pub struct Orchestrator {
    router: ModelRouter,
    registry: Arc<ToolRegistry>,
    prefilter: ToolPrefilter,
    settings: OrchestratorSettings,
    logger: Arc<dyn Logger>,
}

impl Orchestrator {
    pub fn new(
        router: ModelRouter,
        registry: Arc<ToolRegistry>,
        prefilter: ToolPrefilter,
        settings: OrchestratorSettings,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            router,
            registry,
            prefilter,
            settings,
            logger,
        }
    }

    /// Build a router with real adapters for every enabled provider in `config`
    ///
    /// Providers referenced only by catalog entries get an adapter too;
    /// providers explicitly disabled are skipped.
    pub fn from_config(
        config: &ConfigFile,
        registry: Arc<ToolRegistry>,
        secrets: Arc<dyn SecretStore>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        let mut router = ModelRouter::new(config.catalog(), config.router.clone(), Arc::clone(&logger));

        for provider in &config.providers {
            router.configure_provider(provider.clone());
        }

        let mut names: Vec<String> = config
            .providers
            .iter()
            .filter(|p| p.enabled)
            .map(|p| p.name.to_lowercase())
            .collect();
        for model in &config.models {
            let name = model.provider.to_lowercase();
            let disabled = config.find_provider(&name).is_some_and(|p| !p.enabled);
            if !disabled && !names.contains(&name) {
                names.push(name);
            }
        }
        for name in &names {
            router.register_provider(create_provider(name, Arc::clone(&secrets), Arc::clone(&logger)));
        }

        logger.info(&format!(
            "[Orchestrator] Configured {} providers, {} models, {} tools",
            names.len(),
            config.models.len(),
            registry.len()
        ));

        Self::new(
            router,
            registry,
            config.prefilter.clone(),
            config.orchestrator.clone(),
            logger,
        )
    }

    pub fn router(&self) -> &ModelRouter {
        &self.router
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.router.get_metrics()
    }

    /// Run one turn
    ///
    /// The turn timeout and `cancel_token` both drop whatever is in flight,
    /// provider calls and tool executors alike.
    pub async fn run_turn(&self, request: TurnRequest, cancel_token: CancellationToken) -> TurnResult<TurnResponse> {
        if let Err(e) = request.validate() {
            self.logger.warn(&format!("[Orchestrator] Rejected turn: {}", e));
            return Err(e);
        }

        let timeout = self.settings.turn_timeout();
        let outcome = tokio::select! {
            _ = cancel_token.cancelled() => Err(TurnError::cancelled()),
            result = tokio::time::timeout(timeout, self.drive(&request, &cancel_token)) => {
                result.unwrap_or_else(|_| Err(TurnError::timeout(timeout)))
            }
        };

        if let Err(e) = &outcome {
            self.logger.error(&format!(
                "[Orchestrator] Turn for {} reached {:?} ({:?}): {}",
                request.user_id,
                TurnState::Failed,
                e.kind,
                e
            ));
        }
        outcome
    }

    async fn drive(&self, request: &TurnRequest, cancel_token: &CancellationToken) -> TurnResult<TurnResponse> {
        let start = Instant::now();
        let mut states = vec![TurnState::Start];

        let tools = if request.needs_tools {
            states.push(TurnState::Prefiltering);
            let user_message = last_user_message(&request.messages).unwrap_or_default();
            let tools = self.prefilter.filter(
                user_message,
                &self.registry.get_all_definitions(),
                self.settings.max_tools,
            );
            self.logger.debug(&format!(
                "[Orchestrator] Prefiltered {} of {} tools",
                tools.len(),
                self.registry.len()
            ));
            tools
        } else {
            Vec::new()
        };

        states.push(TurnState::Routing);
        let mut conversation = self.conversation_for(&request.messages);
        let route_request = RouteRequest {
            user_id: request.user_id.clone(),
            messages: conversation.clone(),
            needs_tools: !tools.is_empty(),
            long_context: request.long_context,
            streaming: request.streaming,
            priority: request.priority,
        };
        let decision = self.router.recommend(&route_request)?;

        states.push(TurnState::ProviderCall);
        let options = ChatOptions::new()
            .with_temperature(request.temperature.unwrap_or(self.settings.temperature))
            .with_max_tokens(request.max_tokens.unwrap_or(self.settings.max_tokens))
            .with_tools(tools);
        let first = self
            .router
            .execute(&decision, &conversation, &options, cancel_token)
            .await?;

        let mut usage = first.response.usage;
        let mut tool_results = Vec::new();

        if !first.response.has_function_calls() {
            states.push(TurnState::Done);
            return Ok(TurnResponse {
                content: first.response.content,
                model: first.target.model,
                provider: first.target.provider,
                usage,
                latency_ms: start.elapsed().as_millis() as u64,
                tool_results,
                states,
            });
        }

        states.push(TurnState::ToolExecution);
        let calls = first.response.function_calls.clone();
        conversation.push(ChatMessage::assistant_with_calls(first.response.content.clone(), calls.clone()));
        for call in &calls {
            let result = self
                .registry
                .execute_call(call, &request.user_id, self.settings.tool_timeout())
                .await;
            conversation.push(ChatMessage::tool_result(&call.id, &result));
            tool_results.push(result);
        }

        states.push(TurnState::FollowUp);
        let follow_up_decision = decision.resume_after(&first);
        let follow_up = self
            .router
            .execute(&follow_up_decision, &conversation, &options.without_tools(), cancel_token)
            .await?;
        if follow_up.response.has_function_calls() {
            self.logger.warn(&format!(
                "[Orchestrator] Ignoring {} function calls in follow-up from {}",
                follow_up.response.function_calls.len(),
                follow_up.target
            ));
        }
        usage = usage.combine(follow_up.response.usage);

        states.push(TurnState::Done);
        self.logger.info(&format!(
            "[Orchestrator] Turn done via {} with {} tool calls",
            follow_up.target,
            tool_results.len()
        ));

        Ok(TurnResponse {
            content: follow_up.response.content,
            model: follow_up.target.model,
            provider: follow_up.target.provider,
            usage,
            latency_ms: start.elapsed().as_millis() as u64,
            tool_results,
            states,
        })
    }

    /// Request messages with the configured system prompt in front
    fn conversation_for(&self, messages: &[ChatMessage]) -> Vec<ChatMessage> {
        let mut conversation = Vec::with_capacity(messages.len() + 1);
        if let Some(prompt) = &self.settings.system_prompt {
            if !messages.iter().any(|m| m.role == MessageRole::System) {
                conversation.push(ChatMessage::system(prompt.clone()));
            }
        }
        conversation.extend_from_slice(messages);
        conversation
    }
}
