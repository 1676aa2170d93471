//! ModelRouter - capability-aware model selection with fallback
//!
//! `recommend` picks a primary (provider, model) and an ordered fallback
//! chain; `execute` walks that chain until a provider answers.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use super::catalog::{approx_tokens, estimate_cost, ModelCatalog};
use super::error::{AttemptFailure, RouterError, RouterResult};
use super::metrics::{MetricsSnapshot, RouterMetrics};
use super::request::{Completion, Priority, RouteDecision, RouteRequest, RouterSettings};
use crate::logging::Logger;
use crate::providers::{ChatOptions, Provider, ProviderError, ProviderErrorKind, ProviderModelConfig};
use crate::types::{CancellationToken, ChatMessage, ModelConfig, ModelTarget, ProviderConfig};

struct Candidate<'a> {
    index: usize,
    model: &'a ModelConfig,
    cost: f64,
}

/// Chooses and calls models
pub struct ModelRouter {
    /// Adapters keyed by lowercase provider name
    providers: HashMap<String, Arc<dyn Provider>>,
    /// Optional per-provider settings keyed by lowercase name
    provider_configs: HashMap<String, ProviderConfig>,
    catalog: ModelCatalog,
    settings: RouterSettings,
    metrics: RouterMetrics,
    logger: Arc<dyn Logger>,
}

impl ModelRouter {
    pub fn new(catalog: ModelCatalog, settings: RouterSettings, logger: Arc<dyn Logger>) -> Self {
        Self {
            providers: HashMap::new(),
            provider_configs: HashMap::new(),
            catalog,
            settings,
            metrics: RouterMetrics::new(),
            logger,
        }
    }

    /// Register an adapter under its own `name()`
    pub fn register_provider(&mut self, provider: Arc<dyn Provider>) {
        let name = provider.name().to_lowercase();
        self.logger.debug(&format!("[ModelRouter] Registered provider: {}", name));
        self.providers.insert(name, provider);
    }

    /// Attach configuration (enabled flag, api_base) to a provider name
    pub fn configure_provider(&mut self, config: ProviderConfig) {
        self.provider_configs.insert(config.name.to_lowercase(), config);
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn settings(&self) -> &RouterSettings {
        &self.settings
    }

    /// Registered and not disabled
    pub fn is_available(&self, provider: &str) -> bool {
        let key = provider.to_lowercase();
        self.providers.contains_key(&key)
            && self.provider_configs.get(&key).map_or(true, |c| c.enabled)
    }

    /// Pick a primary model and fallback chain for `request`
    pub fn recommend(&self, request: &RouteRequest) -> RouterResult<RouteDecision> {
        let required = request.required_capabilities();
        let prompt_tokens = approx_tokens(&request.messages);
        let completion_tokens = self.settings.expected_completion_tokens;

        let candidates: Vec<Candidate> = self
            .catalog
            .capable(&required)
            .filter(|(_, m)| self.is_available(&m.provider))
            .map(|(index, model)| Candidate {
                index,
                model,
                cost: estimate_cost(model, prompt_tokens, completion_tokens),
            })
            .collect();

        if candidates.is_empty() {
            let required = required.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(", ");
            self.logger.warn(&format!("[ModelRouter] No capable model for: {}", required));
            return Err(RouterError::NoCapableModel { required });
        }

        let primary = pick_primary(&candidates, request.priority);

        let mut rest: Vec<&Candidate> = candidates
            .iter()
            .filter(|c| c.index != primary.index)
            .collect();
        rest.sort_by(|a, b| a.cost.total_cmp(&b.cost).then(a.index.cmp(&b.index)));

        let primary_target = primary.model.target();
        let mut seen: HashSet<ModelTarget> = HashSet::from([primary_target.clone()]);
        let fallback_chain: Vec<ModelTarget> = rest
            .into_iter()
            .map(|c| c.model.target())
            .filter(|t| seen.insert(t.clone()))
            .take(self.settings.max_fallbacks)
            .collect();

        let reason = match request.priority {
            Priority::Normal => format!(
                "cheapest capable model (${:.4} estimated)",
                primary.cost
            ),
            Priority::High => format!(
                "most capable model (quality {})",
                primary.model.quality
            ),
        };

        self.metrics.record_decision(&primary.model.provider);
        self.logger.info(&format!(
            "[ModelRouter] {} priority -> {} ({} fallbacks, {} candidates)",
            request.priority,
            primary_target,
            fallback_chain.len(),
            candidates.len()
        ));

        Ok(RouteDecision {
            provider: primary.model.provider.clone(),
            model: primary.model.model.clone(),
            reason,
            estimated_cost_usd: primary.cost,
            fallback_chain,
            capabilities: required,
        })
    }

    /// Call the primary, then each fallback until one answers
    ///
    /// Every distinct pair is tried at most once. Cancellation stops the
    /// walk immediately and is not counted as a provider failure.
    pub async fn execute(
        &self,
        decision: &RouteDecision,
        messages: &[ChatMessage],
        options: &ChatOptions,
        cancel_token: &CancellationToken,
    ) -> RouterResult<Completion> {
        let timeout = self.settings.attempt_timeout();
        let mut attempts: Vec<AttemptFailure> = Vec::new();
        let mut tried: HashSet<ModelTarget> = HashSet::new();

        for target in decision.targets() {
            if !tried.insert(target.clone()) {
                continue;
            }
            if cancel_token.is_cancelled() {
                return Err(RouterError::Cancelled);
            }
            if tried.len() > 1 {
                self.metrics.record_fallback();
                self.logger.info(&format!("[ModelRouter] Falling back to {}", target));
            }

            let provider_key = target.provider.to_lowercase();
            let Some(provider) = self.providers.get(&provider_key) else {
                let err = ProviderError::NotConfigured(target.provider.clone());
                self.logger.warn(&format!("[ModelRouter] {}: {}", target, err));
                attempts.push(AttemptFailure {
                    target,
                    kind: err.kind(),
                    message: err.to_string(),
                });
                continue;
            };

            let mut model_config = ProviderModelConfig::new(&target.model);
            if let Some(base) = self.provider_configs.get(&provider_key).and_then(|c| c.api_base.clone()) {
                model_config = model_config.with_api_base(base);
            }

            let start = Instant::now();
            let call = provider.chat(messages.to_vec(), model_config, options.clone(), cancel_token.clone());
            let outcome = match tokio::time::timeout(timeout, call).await {
                Ok(result) => result,
                Err(_) => Err(ProviderError::timeout(target.provider.clone(), timeout.as_millis() as u64)),
            };
            let latency_ms = start.elapsed().as_millis() as u64;

            match outcome {
                Ok(response) => {
                    self.metrics.record_success(&target.provider, latency_ms);
                    self.logger.debug(&format!(
                        "[ModelRouter] {} answered in {}ms",
                        target, latency_ms
                    ));
                    return Ok(Completion {
                        response,
                        target,
                        attempts,
                        latency_ms,
                    });
                }
                Err(e) if e.kind() == ProviderErrorKind::Cancelled => {
                    self.logger.info(&format!("[ModelRouter] {} cancelled", target));
                    return Err(RouterError::Cancelled);
                }
                Err(e) => {
                    self.metrics.record_failure(&target.provider, latency_ms);
                    self.logger.warn(&format!(
                        "[ModelRouter] {} failed ({}): {}",
                        target,
                        e.kind(),
                        e
                    ));
                    attempts.push(AttemptFailure {
                        target,
                        kind: e.kind(),
                        message: e.to_string(),
                    });
                }
            }
        }

        self.metrics.record_exhausted();
        self.logger.error(&format!(
            "[ModelRouter] All providers exhausted after {} attempts",
            attempts.len()
        ));
        Err(RouterError::AllProvidersExhausted { attempts })
    }

    /// Recommend, then execute without tools
    pub async fn complete(
        &self,
        request: &RouteRequest,
        temperature: Option<f32>,
        max_tokens: Option<u32>,
    ) -> RouterResult<Completion> {
        let decision = self.recommend(request)?;
        let options = ChatOptions {
            temperature,
            max_tokens,
            tools: None,
        };
        self.execute(&decision, &request.messages, &options, &CancellationToken::new())
            .await
    }

    pub fn get_metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

/// Highest weighted score; ties go to lower cost, then catalog order
fn pick_primary<'a, 'b>(candidates: &'b [Candidate<'a>], priority: Priority) -> &'b Candidate<'a> {
    let (cost_weight, quality_weight) = priority.weights();

    let (min_cost, max_cost) = bounds(candidates.iter().map(|c| c.cost));
    let (min_q, max_q) = bounds(candidates.iter().map(|c| c.model.quality as f64));
    let normalize = |v: f64, lo: f64, hi: f64| if hi > lo { (v - lo) / (hi - lo) } else { 0.0 };

    let score = |c: &Candidate| {
        cost_weight * (1.0 - normalize(c.cost, min_cost, max_cost))
            + quality_weight * normalize(c.model.quality as f64, min_q, max_q)
    };

    let mut best = &candidates[0];
    for candidate in &candidates[1..] {
        let ordering = score(candidate)
            .total_cmp(&score(best))
            .then(best.cost.total_cmp(&candidate.cost))
            .then(best.index.cmp(&candidate.index));
        if ordering.is_gt() {
            best = candidate;
        }
    }
    best
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{NoOpLogger, RecordingLogger};
    use crate::providers::MockProvider;
    use crate::types::{Capability, ModelCapabilities};

    fn logger() -> Arc<dyn Logger> {
        Arc::new(NoOpLogger)
    }

    fn messages() -> Vec<ChatMessage> {
        vec![ChatMessage::user("What's my remaining budget?")]
    }

    /// Completion-only pricing so per-call cost is exactly the output rate
    fn settings() -> RouterSettings {
        RouterSettings {
            expected_completion_tokens: 1000,
            ..Default::default()
        }
    }

    fn tool_model(provider: &str, model: &str, cost: f64, quality: u8) -> ModelConfig {
        ModelConfig::new(provider, model)
            .with_capabilities(ModelCapabilities::with_tools())
            .with_costs(0.0, cost)
            .with_quality(quality)
    }

    fn router_with(models: Vec<ModelConfig>, providers: Vec<Arc<dyn Provider>>) -> ModelRouter {
        let mut router = ModelRouter::new(ModelCatalog::new(models), settings(), logger());
        for provider in providers {
            router.register_provider(provider);
        }
        router
    }

    fn echo(name: &str) -> Arc<MockProvider> {
        Arc::new(MockProvider::echo(logger()).named(name))
    }

    fn failing(name: &str, kind: ProviderErrorKind) -> Arc<MockProvider> {
        Arc::new(MockProvider::failing(kind, "scripted failure", logger()).named(name))
    }

    #[test]
    fn test_cheapest_primary_with_costlier_fallback() {
        let router = router_with(
            vec![tool_model("premium", "big", 0.05, 5), tool_model("budget", "small", 0.01, 1)],
            vec![echo("premium"), echo("budget")],
        );
        let request = RouteRequest::new("u1", messages()).with_tools(true);

        let decision = router.recommend(&request).unwrap();
        assert_eq!(decision.target(), ModelTarget::new("budget", "small"));
        assert!((decision.estimated_cost_usd - 0.01).abs() < 1e-9);
        assert_eq!(decision.fallback_chain, vec![ModelTarget::new("premium", "big")]);
        assert!(decision.capabilities.contains(&Capability::ToolCalling));
    }

    #[test]
    fn test_high_priority_prefers_quality() {
        let router = router_with(
            vec![tool_model("budget", "small", 0.01, 1), tool_model("premium", "big", 0.05, 5)],
            vec![echo("premium"), echo("budget")],
        );
        let request = RouteRequest::new("u1", messages()).with_priority(Priority::High);

        let decision = router.recommend(&request).unwrap();
        assert_eq!(decision.provider, "premium");
        assert_eq!(decision.fallback_chain, vec![ModelTarget::new("budget", "small")]);
    }

    #[test]
    fn test_ties_break_by_catalog_order() {
        let router = router_with(
            vec![tool_model("a", "m", 0.01, 1), tool_model("b", "m", 0.01, 1)],
            vec![echo("a"), echo("b")],
        );
        let decision = router.recommend(&RouteRequest::new("u1", messages())).unwrap();
        assert_eq!(decision.provider, "a");
    }

    #[test]
    fn test_candidates_respect_capabilities() {
        let chat_only = ModelConfig::new("cheap", "chat").with_costs(0.0, 0.001);
        let no_chat = ModelConfig::new("odd", "embed").with_capabilities(ModelCapabilities {
            chat: false,
            tool_calling: true,
            long_context: false,
            streaming: false,
        });
        let router = router_with(
            vec![chat_only, no_chat, tool_model("tools", "fn", 0.02, 2)],
            vec![echo("cheap"), echo("odd"), echo("tools")],
        );

        let plain = router.recommend(&RouteRequest::new("u1", messages())).unwrap();
        assert_eq!(plain.provider, "cheap");
        assert!(plain.targets().all(|t| t.provider != "odd"));

        let tools = router
            .recommend(&RouteRequest::new("u1", messages()).with_tools(true))
            .unwrap();
        for target in tools.targets() {
            let model = router.catalog().get(&target).unwrap();
            assert!(model.capabilities.chat && model.capabilities.tool_calling);
        }
    }

    #[test]
    fn test_unregistered_and_disabled_providers_excluded() {
        let mut router = router_with(
            vec![
                tool_model("ghost", "m", 0.001, 1),
                tool_model("off", "m", 0.002, 1),
                tool_model("live", "m", 0.01, 1),
            ],
            vec![echo("off"), echo("live")],
        );
        router.configure_provider(ProviderConfig::new("off").disabled());

        let decision = router.recommend(&RouteRequest::new("u1", messages())).unwrap();
        assert_eq!(decision.provider, "live");
        assert!(decision.fallback_chain.is_empty());
    }

    #[test]
    fn test_no_capable_model() {
        let router = router_with(vec![ModelConfig::new("cheap", "chat")], vec![echo("cheap")]);
        let err = router
            .recommend(&RouteRequest::new("u1", messages()).with_long_context(true))
            .unwrap_err();
        assert!(matches!(err, RouterError::NoCapableModel { ref required } if required.contains("long_context")));
    }

    #[test]
    fn test_fallback_chain_capped_and_distinct() {
        let models: Vec<ModelConfig> = (0..6)
            .map(|i| tool_model(&format!("p{}", i), "m", 0.01 * (i + 1) as f64, 1))
            .collect();
        let providers: Vec<Arc<dyn Provider>> = (0..6)
            .map(|i| echo(&format!("p{}", i)) as Arc<dyn Provider>)
            .collect();
        let router = router_with(models, providers);

        let decision = router.recommend(&RouteRequest::new("u1", messages())).unwrap();
        assert_eq!(decision.provider, "p0");
        let chain: Vec<String> = decision.fallback_chain.iter().map(|t| t.provider.clone()).collect();
        assert_eq!(chain, vec!["p1", "p2", "p3"]);
    }

    #[test]
    fn test_cost_grows_with_message_length() {
        let router = router_with(
            vec![ModelConfig::new("a", "m").with_costs(0.01, 0.0)],
            vec![echo("a")],
        );
        let short = router
            .recommend(&RouteRequest::new("u1", vec![ChatMessage::user("hi")]))
            .unwrap();
        let long = router
            .recommend(&RouteRequest::new("u1", vec![ChatMessage::user("hi ".repeat(500))]))
            .unwrap();
        assert!(long.estimated_cost_usd > short.estimated_cost_usd);
    }

    #[tokio::test]
    async fn test_rate_limit_falls_back_transparently() {
        let primary = failing("budget", ProviderErrorKind::RateLimited);
        let backup = Arc::new(MockProvider::fixed("from backup", logger()).named("premium"));
        let router = router_with(
            vec![tool_model("budget", "small", 0.01, 1), tool_model("premium", "big", 0.05, 5)],
            vec![primary.clone(), backup.clone()],
        );

        let completion = router
            .complete(&RouteRequest::new("u1", messages()), Some(0.2), Some(64))
            .await
            .unwrap();

        assert_eq!(completion.response.content, "from backup");
        assert_eq!(completion.target.provider, "premium");
        assert_eq!(completion.attempts.len(), 1);
        assert_eq!(completion.attempts[0].kind, ProviderErrorKind::RateLimited);
        assert_eq!(primary.call_count(), 1);
        assert_eq!(backup.requests()[0].tools, None);

        let metrics = router.get_metrics();
        assert_eq!(metrics.fallback_triggers, 1);
        assert_eq!(metrics.total_failures, 1);
        assert_eq!(metrics.providers["budget"].decisions, 1);
    }

    #[tokio::test]
    async fn test_all_failing_exhausts_exactly_once() {
        let recorder = Arc::new(RecordingLogger::new());
        let kinds = [
            ProviderErrorKind::RateLimited,
            ProviderErrorKind::Auth,
            ProviderErrorKind::Unavailable,
            ProviderErrorKind::MalformedResponse,
        ];
        let mocks: Vec<Arc<MockProvider>> = kinds
            .iter()
            .enumerate()
            .map(|(i, kind)| failing(&format!("p{}", i), *kind))
            .collect();
        let mut router = ModelRouter::new(
            ModelCatalog::new(
                (0..4)
                    .map(|i| tool_model(&format!("p{}", i), "m", 0.01 * (i + 1) as f64, 1))
                    .collect(),
            ),
            settings(),
            recorder.clone(),
        );
        for mock in &mocks {
            router.register_provider(mock.clone());
        }

        let err = router
            .complete(&RouteRequest::new("u1", messages()), None, None)
            .await
            .unwrap_err();

        let attempts = match err {
            RouterError::AllProvidersExhausted { attempts } => attempts,
            other => panic!("expected exhaustion, got {:?}", other),
        };
        assert_eq!(attempts.len(), 4);
        let distinct: HashSet<_> = attempts.iter().map(|a| a.target.clone()).collect();
        assert_eq!(distinct.len(), 4);
        assert_eq!(
            attempts.iter().map(|a| a.kind).collect::<Vec<_>>(),
            kinds.to_vec()
        );
        for mock in &mocks {
            assert_eq!(mock.call_count(), 1);
        }

        let metrics = router.get_metrics();
        assert_eq!(metrics.exhausted, 1);
        assert_eq!(metrics.fallback_triggers, 3);
        assert!(recorder.contains("error", "exhausted"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempt_timeout_advances_chain() {
        let slow = Arc::new(MockProvider::fixed("too late", logger()).named("slow").with_delay(60_000));
        let mut router = ModelRouter::new(
            ModelCatalog::new(vec![tool_model("slow", "m", 0.01, 1), tool_model("fast", "m", 0.02, 1)]),
            RouterSettings {
                attempt_timeout_ms: 100,
                ..settings()
            },
            logger(),
        );
        router.register_provider(slow);
        router.register_provider(echo("fast"));

        let completion = router
            .complete(&RouteRequest::new("u1", messages()), None, None)
            .await
            .unwrap();
        assert_eq!(completion.target.provider, "fast");
        assert_eq!(completion.attempts[0].kind, ProviderErrorKind::Timeout);
    }

    #[tokio::test]
    async fn test_cancelled_before_call() {
        let primary = echo("a");
        let router = router_with(vec![tool_model("a", "m", 0.01, 1)], vec![primary.clone()]);
        let decision = router.recommend(&RouteRequest::new("u1", messages())).unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = router
            .execute(&decision, &messages(), &ChatOptions::new(), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, RouterError::Cancelled));
        assert_eq!(primary.call_count(), 0);
        assert_eq!(router.get_metrics().exhausted, 0);
    }

    #[tokio::test]
    async fn test_api_base_passed_to_provider() {
        let mock = echo("gateway");
        let mut router = router_with(vec![tool_model("gateway", "m", 0.01, 1)], vec![mock.clone()]);
        router.configure_provider(ProviderConfig::new("Gateway").with_api_base("https://gw.invalid/v1/"));

        let completion = router
            .complete(&RouteRequest::new("u1", messages()), None, None)
            .await
            .unwrap();
        assert_eq!(completion.response.content, "Echo: What's my remaining budget?");
        let request = &mock.requests()[0];
        assert_eq!(request.model, "m");
        assert_eq!(request.api_base.as_deref(), Some("https://gw.invalid/v1/"));
    }

    #[tokio::test]
    async fn test_streaming_excludes_non_streaming_from_whole_chain() {
        let streaming = |provider: &str, model: &str, cost: f64| {
            ModelConfig::new(provider, model)
                .with_capabilities(ModelCapabilities::full())
                .with_costs(0.0, cost)
        };
        let budget = failing("budget", ProviderErrorKind::Unavailable);
        let mid = failing("mid", ProviderErrorKind::Unavailable);
        let legacy = echo("legacy");
        let premium = Arc::new(MockProvider::fixed("streamed", logger()).named("premium"));
        let router = router_with(
            vec![
                tool_model("budget", "small", 0.005, 1),
                streaming("mid", "streamer", 0.02),
                tool_model("legacy", "old", 0.03, 3),
                streaming("premium", "big", 0.05),
            ],
            vec![budget.clone(), mid.clone(), legacy.clone(), premium.clone()],
        );
        let request = RouteRequest::new("u1", messages())
            .with_tools(true)
            .with_streaming(true);

        let decision = router.recommend(&request).unwrap();
        assert_eq!(decision.target(), ModelTarget::new("mid", "streamer"));
        assert_eq!(decision.fallback_chain, vec![ModelTarget::new("premium", "big")]);
        assert!(decision.capabilities.contains(&Capability::Streaming));
        for target in decision.targets() {
            let entry = router.catalog().get(&target).unwrap();
            assert!(entry.capabilities.streaming, "{} cannot stream", target);
        }

        // the primary fails, and the only remaining entry is the streaming one
        let completion = router.complete(&request, None, None).await.unwrap();
        assert_eq!(completion.target, ModelTarget::new("premium", "big"));
        assert_eq!(completion.attempts.len(), 1);
        assert_eq!(budget.call_count(), 0);
        assert_eq!(legacy.call_count(), 0);
        assert_eq!(mid.call_count(), 1);

        // without the flag the cheap non-streaming model leads again
        let plain = router.recommend(&RouteRequest::new("u1", messages()).with_tools(true)).unwrap();
        assert_eq!(plain.target(), ModelTarget::new("budget", "small"));
    }
}
