//! Route requests, decisions and settings

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

use super::error::AttemptFailure;
use crate::types::{Capability, ChatMessage, ChatResponse, ModelTarget};

/// How to trade cost against capability
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Cheapest adequate model
    #[default]
    Normal,
    /// Most capable model
    High,
}

impl Priority {
    /// (cost weight, quality weight)
    pub fn weights(self) -> (f64, f64) {
        match self {
            Priority::Normal => (1.0, 0.0),
            Priority::High => (0.0, 1.0),
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Normal => write!(f, "normal"),
            Priority::High => write!(f, "high"),
        }
    }
}

/// What a caller needs from a model
#[derive(Debug, Clone)]
pub struct RouteRequest {
    pub user_id: String,
    pub messages: Vec<ChatMessage>,
    pub needs_tools: bool,
    pub long_context: bool,
    pub streaming: bool,
    pub priority: Priority,
}

impl RouteRequest {
    pub fn new(user_id: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            user_id: user_id.into(),
            messages,
            needs_tools: false,
            long_context: false,
            streaming: false,
            priority: Priority::Normal,
        }
    }

    pub fn with_tools(mut self, needs_tools: bool) -> Self {
        self.needs_tools = needs_tools;
        self
    }

    pub fn with_long_context(mut self, long_context: bool) -> Self {
        self.long_context = long_context;
        self
    }

    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// `chat` always, plus whatever the flags ask for
    pub fn required_capabilities(&self) -> BTreeSet<Capability> {
        let mut required = BTreeSet::from([Capability::Chat]);
        if self.needs_tools {
            required.insert(Capability::ToolCalling);
        }
        if self.long_context {
            required.insert(Capability::LongContext);
        }
        if self.streaming {
            required.insert(Capability::Streaming);
        }
        required
    }
}

/// The router's pick for one request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteDecision {
    pub provider: String,
    pub model: String,
    pub reason: String,
    pub estimated_cost_usd: f64,
    /// Alternates in cost-ascending order; never includes the primary
    pub fallback_chain: Vec<ModelTarget>,
    pub capabilities: BTreeSet<Capability>,
}

impl RouteDecision {
    pub fn target(&self) -> ModelTarget {
        ModelTarget::new(&self.provider, &self.model)
    }

    /// Primary first, then the fallback chain
    pub fn targets(&self) -> impl Iterator<Item = ModelTarget> + '_ {
        std::iter::once(self.target()).chain(self.fallback_chain.iter().cloned())
    }

    /// Decision for a follow-up call in the same turn
    ///
    /// Pins the provider that answered `completion` and keeps only chain
    /// entries that were not tried yet.
    pub fn resume_after(&self, completion: &Completion) -> RouteDecision {
        let answered = &completion.target;
        let fallback_chain = self
            .fallback_chain
            .iter()
            .filter(|t| *t != answered && !completion.attempts.iter().any(|a| &a.target == *t))
            .cloned()
            .collect();

        RouteDecision {
            provider: answered.provider.clone(),
            model: answered.model.clone(),
            reason: format!("follow-up on {}", answered),
            estimated_cost_usd: self.estimated_cost_usd,
            fallback_chain,
            capabilities: self.capabilities.clone(),
        }
    }
}

/// A successful completion and how it was reached
#[derive(Debug, Clone)]
pub struct Completion {
    pub response: ChatResponse,
    /// The pair that actually answered
    pub target: ModelTarget,
    /// Failures before the answer, in attempt order
    pub attempts: Vec<AttemptFailure>,
    pub latency_ms: u64,
}

/// Router tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterSettings {
    /// Longest fallback chain attached to a decision
    pub max_fallbacks: usize,
    /// Deadline for each provider call
    pub attempt_timeout_ms: u64,
    /// Completion tokens assumed when estimating cost
    pub expected_completion_tokens: u32,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            max_fallbacks: 3,
            attempt_timeout_ms: 30_000,
            expected_completion_tokens: 512,
        }
    }
}

impl RouterSettings {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderErrorKind;
    use crate::types::Usage;

    #[test]
    fn test_required_capabilities() {
        let base = RouteRequest::new("u1", vec![ChatMessage::user("hi")]);
        assert_eq!(base.required_capabilities(), BTreeSet::from([Capability::Chat]));

        let all = base.with_tools(true).with_long_context(true).with_streaming(true);
        assert_eq!(all.required_capabilities().len(), 4);
    }

    #[test]
    fn test_resume_after_keeps_untried_entries() {
        let decision = RouteDecision {
            provider: "a".into(),
            model: "m1".into(),
            reason: String::new(),
            estimated_cost_usd: 0.01,
            fallback_chain: vec![
                ModelTarget::new("b", "m2"),
                ModelTarget::new("c", "m3"),
                ModelTarget::new("d", "m4"),
            ],
            capabilities: BTreeSet::from([Capability::Chat]),
        };
        let completion = Completion {
            response: ChatResponse::text("ok", Usage::default()),
            target: ModelTarget::new("c", "m3"),
            attempts: vec![
                AttemptFailure {
                    target: ModelTarget::new("a", "m1"),
                    kind: ProviderErrorKind::RateLimited,
                    message: "429".into(),
                },
                AttemptFailure {
                    target: ModelTarget::new("b", "m2"),
                    kind: ProviderErrorKind::Timeout,
                    message: "slow".into(),
                },
            ],
            latency_ms: 5,
        };

        let follow_up = decision.resume_after(&completion);
        assert_eq!(follow_up.target(), ModelTarget::new("c", "m3"));
        assert_eq!(follow_up.fallback_chain, vec![ModelTarget::new("d", "m4")]);
    }

    #[test]
    fn test_settings_defaults_from_partial_yaml() {
        let settings: RouterSettings = serde_yaml::from_str("max_fallbacks: 1").unwrap();
        assert_eq!(settings.max_fallbacks, 1);
        assert_eq!(settings.attempt_timeout(), Duration::from_secs(30));
        assert_eq!(settings.expected_completion_tokens, 512);
    }
}
