//! Switchboard Core
//!
//! Agentic orchestration for LLM applications: pick a model per request,
//! show it only the tools the message needs, run the tool calls it asks
//! for and hand the results back for a final answer.
//!
//! ## Turn pipeline
//!
//! ```text
//! TurnRequest
//!   -> ToolPrefilter   (core tools + keyword-matched categories, capped)
//!   -> ModelRouter     (capability filter, cost/quality score, fallback chain)
//!   -> Provider        (genai adapter or mock)
//!   -> ToolRegistry    (timeouts, panic capture, uniform results)
//!   -> follow-up call  (same provider, tool results appended)
//!   -> TurnResponse
//! ```
//!
//! ```rust,ignore
//! use switchboard_core::{ChatMessage, Orchestrator, TurnRequest, CancellationToken};
//!
//! let orchestrator = Orchestrator::from_config(&config, registry, secrets, logger);
//! let request = TurnRequest::new("user-1", vec![ChatMessage::user("What's my budget?")]).with_tools();
//! let response = orchestrator.run_turn(request, CancellationToken::new()).await?;
//! println!("{} via {}", response.content, response.model);
//! ```

pub mod types;
pub mod secrets;
pub mod logging;
pub mod config;
pub mod providers;
pub mod tools;
pub mod router;
pub mod orchestrator;

// Re-export commonly used types
pub use types::{
    ChatMessage, MessageRole,
    Capability, ModelConfig, ModelCapabilities, ModelTarget, ProviderConfig,
    FunctionCall, ToolDefinition, ToolErrorKind, ToolExecutionResult,
    ChatResponse, FinishReason, Usage,
    CancellationToken,
};

pub use secrets::{
    SecretStore, SecretStoreError, SecretStoreResult,
    EnvSecretStore, MemorySecretStore, ChainSecretStore,
};

pub use logging::{Logger, NoOpLogger, ConsoleLogger, RecordingLogger};

pub use config::{ConfigFile, ConfigProvider, ConfigError, FileConfigProvider, MemoryConfigProvider};

pub use providers::{Provider, ProviderError, ProviderErrorKind, GenaiProvider, MockProvider, create_provider};

pub use tools::{ToolExecutor, ToolError, ToolPrefilter, ToolCategory, ToolRegistry};

pub use router::{ModelRouter, ModelCatalog, RouteRequest, RouteDecision, RouterError, RouterSettings, Priority};

pub use orchestrator::{Orchestrator, OrchestratorSettings, TurnRequest, TurnResponse, TurnError, TurnErrorKind};
