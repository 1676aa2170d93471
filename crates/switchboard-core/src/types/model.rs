//! Model and provider configuration types

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A single capability a model may offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Baseline chat completion
    Chat,
    /// Tool/function calling
    ToolCalling,
    /// Large context window
    LongContext,
    /// Streaming responses
    Streaming,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::Chat => write!(f, "chat"),
            Capability::ToolCalling => write!(f, "tool_calling"),
            Capability::LongContext => write!(f, "long_context"),
            Capability::Streaming => write!(f, "streaming"),
        }
    }
}

/// Model capabilities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCapabilities {
    /// Whether the model can hold a plain conversation
    #[serde(default = "default_true")]
    pub chat: bool,
    /// Whether the model supports tool/function calling
    #[serde(default)]
    pub tool_calling: bool,
    /// Whether the model has a large context window
    #[serde(default)]
    pub long_context: bool,
    /// Whether the model supports streaming
    #[serde(default)]
    pub streaming: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ModelCapabilities {
    fn default() -> Self {
        Self::chat_only()
    }
}

impl ModelCapabilities {
    /// Create capabilities with all features enabled
    pub fn full() -> Self {
        Self {
            chat: true,
            tool_calling: true,
            long_context: true,
            streaming: true,
        }
    }

    /// Plain chat, nothing else
    pub fn chat_only() -> Self {
        Self {
            chat: true,
            tool_calling: false,
            long_context: false,
            streaming: false,
        }
    }

    /// Chat plus tool calling
    pub fn with_tools() -> Self {
        Self {
            tool_calling: true,
            ..Self::chat_only()
        }
    }

    /// The capabilities as a set
    pub fn to_set(&self) -> BTreeSet<Capability> {
        let mut set = BTreeSet::new();
        if self.chat {
            set.insert(Capability::Chat);
        }
        if self.tool_calling {
            set.insert(Capability::ToolCalling);
        }
        if self.long_context {
            set.insert(Capability::LongContext);
        }
        if self.streaming {
            set.insert(Capability::Streaming);
        }
        set
    }

    /// Check whether every required capability is offered
    pub fn satisfies(&self, required: &BTreeSet<Capability>) -> bool {
        required.is_subset(&self.to_set())
    }
}

/// Catalog entry for one (provider, model) pair the router may choose
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Provider name (openai, anthropic, mock, etc.)
    pub provider: String,
    /// Model identifier as used by the provider's API
    pub model: String,
    /// Model capabilities
    #[serde(default)]
    pub capabilities: ModelCapabilities,
    /// Maximum context length in tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_length: Option<u32>,
    /// USD per 1K prompt tokens
    #[serde(default)]
    pub input_cost_per_1k: f64,
    /// USD per 1K completion tokens
    #[serde(default)]
    pub output_cost_per_1k: f64,
    /// Relative capability rank, higher is more capable
    #[serde(default)]
    pub quality: u8,
}

impl ModelConfig {
    /// Create a new catalog entry with chat-only capabilities and zero cost
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            capabilities: ModelCapabilities::default(),
            context_length: None,
            input_cost_per_1k: 0.0,
            output_cost_per_1k: 0.0,
            quality: 0,
        }
    }

    /// Set the capabilities
    pub fn with_capabilities(mut self, capabilities: ModelCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Set the context length
    pub fn with_context_length(mut self, length: u32) -> Self {
        self.context_length = Some(length);
        self
    }

    /// Set prompt and completion rates (USD per 1K tokens)
    pub fn with_costs(mut self, input_per_1k: f64, output_per_1k: f64) -> Self {
        self.input_cost_per_1k = input_per_1k;
        self.output_cost_per_1k = output_per_1k;
        self
    }

    /// Set the quality tier
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    /// The (provider, model) pair identifying this entry
    pub fn target(&self) -> ModelTarget {
        ModelTarget::new(&self.provider, &self.model)
    }
}

/// A (provider, model) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelTarget {
    pub provider: String,
    pub model: String,
}

impl ModelTarget {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
        }
    }
}

impl std::fmt::Display for ModelTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.provider, self.model)
    }
}

/// Where a provider configuration came from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// From user-level config (~/.config/switchboard/config.yaml)
    User,
    /// From workspace-level config (.config/switchboard/config.yaml)
    Workspace,
    /// From environment or runtime
    Runtime,
    /// Unknown source
    #[default]
    Unknown,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::User => write!(f, "~/.config/switchboard/config.yaml"),
            ConfigSource::Workspace => write!(f, ".config/switchboard/config.yaml"),
            ConfigSource::Runtime => write!(f, "Runtime"),
            ConfigSource::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider name (e.g., 'openai', 'anthropic', 'openrouter')
    pub name: String,
    /// Whether this provider is enabled (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Custom API base URL (optional, uses provider default if not set)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Where this config came from (not serialized to file)
    #[serde(skip)]
    pub source: ConfigSource,
}

impl ProviderConfig {
    /// Create a new provider configuration
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            api_base: None,
            source: ConfigSource::Unknown,
        }
    }

    /// Set the API base URL
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = Some(base.into());
        self
    }

    /// Disable the provider
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Set the source of this configuration
    pub fn with_source(mut self, source: ConfigSource) -> Self {
        self.source = source;
        self
    }
}
