//! Core types shared by providers, the tool registry, the router and the
//! orchestration loop.

mod message;
mod model;
mod tool;
mod response;
mod cancellation;

pub use message::{last_user_message, ChatMessage, MessageRole};
pub use model::{Capability, ConfigSource, ModelCapabilities, ModelConfig, ModelTarget, ProviderConfig};
pub use tool::{FunctionCall, ToolDefinition, ToolErrorKind, ToolExecutionResult};
pub use response::{ChatResponse, FinishReason, Usage};
pub use cancellation::CancellationToken;
