//! Adapter between switchboard types and genai types
//!
//! Auth flows through the configured `SecretStore`, not genai's default env
//! var lookup, so keys injected at startup and keys from the environment
//! resolve the same way.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use genai::chat::{
    ChatMessage as GenaiMessage, ChatOptions as GenaiOptions, ChatResponse as GenaiResponse,
    ChatRole as GenaiRole, ContentPart as GenaiPart, MessageContent as GenaiContent, Tool as GenaiTool,
    ToolCall as GenaiToolCall, ToolResponse as GenaiToolResponse, Usage as GenaiUsage,
};
use genai::resolver::{AuthData, AuthResolver, Endpoint, ServiceTargetResolver};
use genai::webc::Error as WebcError;
use genai::{adapter::AdapterKind, Client, Error as GenaiError, ModelIden, ServiceTarget};

use crate::secrets::SecretStore;
use crate::types::{
    ChatMessage, ChatResponse, FinishReason, FunctionCall, MessageRole, ToolDefinition, Usage,
};

use super::error::{ProviderError, ProviderResult};
use super::traits::ChatOptions;

// ============================================================================
// Message Conversion: switchboard -> genai
// ============================================================================

/// Convert a MessageRole to genai ChatRole
pub fn to_genai_role(role: MessageRole) -> GenaiRole {
    match role {
        MessageRole::System => GenaiRole::System,
        MessageRole::User => GenaiRole::User,
        MessageRole::Assistant => GenaiRole::Assistant,
        MessageRole::Tool => GenaiRole::Tool,
    }
}

/// Convert a FunctionCall into genai's ToolCall
pub fn to_genai_tool_call(call: &FunctionCall) -> GenaiToolCall {
    GenaiToolCall {
        call_id: call.id.clone(),
        fn_name: call.name.clone(),
        fn_arguments: call.arguments.clone(),
        thought_signatures: call.thought_signatures.clone(),
    }
}

/// Assistant turn that emitted tool calls
///
/// Part order is thought signatures (from the first call), then any text,
/// then one part per call.
fn to_genai_assistant_calls(content: String, calls: &[FunctionCall]) -> GenaiMessage {
    let mut parts: Vec<GenaiPart> = calls
        .first()
        .and_then(|first| first.thought_signatures.clone())
        .unwrap_or_default()
        .into_iter()
        .map(GenaiPart::ThoughtSignature)
        .collect();
    if !content.is_empty() {
        parts.push(GenaiPart::Text(content));
    }
    parts.extend(calls.iter().map(|call| GenaiPart::ToolCall(to_genai_tool_call(call))));
    GenaiMessage::assistant(GenaiContent::from_parts(parts))
}

/// Convert a ChatMessage to genai ChatMessage
pub fn to_genai_message(msg: ChatMessage) -> GenaiMessage {
    match msg.role {
        MessageRole::System => GenaiMessage::system(GenaiContent::from(msg.content)),
        MessageRole::User => GenaiMessage::user(GenaiContent::from(msg.content)),
        MessageRole::Assistant if !msg.function_calls.is_empty() => {
            to_genai_assistant_calls(msg.content, &msg.function_calls)
        }
        MessageRole::Assistant => GenaiMessage::assistant(GenaiContent::from(msg.content)),
        MessageRole::Tool => {
            let call_id = msg.tool_call_id.unwrap_or_default();
            GenaiMessage::from(GenaiToolResponse::new(call_id, msg.content))
        }
    }
}

/// Convert a list of messages to genai messages
pub fn to_genai_messages(messages: Vec<ChatMessage>) -> Vec<GenaiMessage> {
    messages.into_iter().map(to_genai_message).collect()
}

// ============================================================================
// Tool Conversion: switchboard -> genai
// ============================================================================

/// Convert a ToolDefinition to genai Tool
pub fn to_genai_tool(tool: ToolDefinition) -> GenaiTool {
    GenaiTool::new(&tool.name)
        .with_description(&tool.description)
        .with_schema(tool.input_schema)
}

/// Convert tool definitions to genai tools
pub fn to_genai_tools(tools: Vec<ToolDefinition>) -> Vec<GenaiTool> {
    tools.into_iter().map(to_genai_tool).collect()
}

// ============================================================================
// Options Conversion: switchboard -> genai
// ============================================================================

/// Convert ChatOptions to genai ChatOptions
pub fn to_genai_options(options: &ChatOptions) -> GenaiOptions {
    let mut genai_opts = GenaiOptions::default();

    if let Some(temp) = options.temperature {
        genai_opts = genai_opts.with_temperature(temp as f64);
    }

    if let Some(max_tokens) = options.max_tokens {
        genai_opts = genai_opts.with_max_tokens(max_tokens);
    }

    genai_opts
}

// ============================================================================
// Response Conversion: genai -> switchboard
// ============================================================================

/// Convert genai ToolCall to FunctionCall
pub fn from_genai_tool_call(tc: &GenaiToolCall) -> FunctionCall {
    FunctionCall {
        id: tc.call_id.clone(),
        name: tc.fn_name.clone(),
        arguments: tc.fn_arguments.clone(),
        thought_signatures: tc.thought_signatures.clone(),
    }
}

/// Convert genai usage, treating missing or negative counts as zero
pub fn from_genai_usage(usage: &GenaiUsage) -> Usage {
    let count = |v: Option<i32>| v.unwrap_or(0).max(0) as u32;
    let prompt = count(usage.prompt_tokens);
    let completion = count(usage.completion_tokens);
    let total = usage
        .total_tokens
        .map(|t| t.max(0) as u32)
        .unwrap_or(prompt + completion);
    Usage {
        prompt_tokens: prompt,
        completion_tokens: completion,
        total_tokens: total,
    }
}

/// Convert a genai ChatResponse into the normalized response
///
/// A completion with neither text nor tool calls is reported as malformed so
/// the router moves on to the next target.
pub fn from_genai_response(provider: &str, response: &GenaiResponse) -> ProviderResult<ChatResponse> {
    let function_calls: Vec<FunctionCall> = response
        .tool_calls()
        .into_iter()
        .map(from_genai_tool_call)
        .collect();
    let content = response.first_text().unwrap_or_default().to_string();

    if content.is_empty() && function_calls.is_empty() {
        return Err(ProviderError::invalid_response(provider, "empty completion"));
    }

    let finish_reason = if function_calls.is_empty() {
        FinishReason::Stop
    } else {
        FinishReason::ToolCalls
    };

    Ok(ChatResponse {
        content,
        usage: from_genai_usage(&response.usage),
        function_calls,
        finish_reason,
    })
}

/// Map a genai failure onto the shared error kinds
///
/// HTTP failures carry a typed status, so only transport errors and
/// variants without one fall back to message classification.
pub fn from_genai_error(provider: &str, error: &GenaiError) -> ProviderError {
    match error {
        GenaiError::WebModelCall { webc_error, .. } | GenaiError::WebAdapterCall { webc_error, .. } => {
            match webc_error {
                WebcError::ResponseFailedStatus { status, body, .. } => {
                    ProviderError::from_status(provider, status.as_u16(), body.clone())
                }
                WebcError::ResponseFailedNotJson { .. }
                | WebcError::ResponseFailedInvalidJson { .. }
                | WebcError::JsonValueExt(_) => ProviderError::invalid_response(provider, webc_error.to_string()),
                WebcError::Reqwest(_) => ProviderError::classify(provider, webc_error.to_string()),
            }
        }
        GenaiError::HttpError { status, body, .. } => {
            ProviderError::from_status(provider, status.as_u16(), body.clone())
        }
        GenaiError::RequiresApiKey { .. } | GenaiError::NoAuthResolver { .. } | GenaiError::NoAuthData { .. } => {
            ProviderError::missing_api_key(provider)
        }
        GenaiError::NoChatResponse { .. }
        | GenaiError::InvalidJsonResponseElement { .. }
        | GenaiError::ChatResponseGeneration { .. }
        | GenaiError::ChatResponse { .. }
        | GenaiError::StreamParse { .. }
        | GenaiError::JsonValueExt(_)
        | GenaiError::SerdeJson(_) => ProviderError::invalid_response(provider, error.to_string()),
        GenaiError::AdapterNotSupported { feature, .. } => ProviderError::CapabilityMismatch {
            provider: provider.to_string(),
            model: String::new(),
            capability: feature.clone(),
        },
        _ => ProviderError::classify(provider, error.to_string()),
    }
}

// ============================================================================
// Provider Resolution
// ============================================================================

/// Connection settings for one genai client
#[derive(Debug, Clone)]
pub struct ProviderConnection {
    /// Provider identifier (e.g., "openai", "azure", "openrouter")
    pub provider: String,
    /// API key for authentication
    pub api_key: Option<String>,
    /// Custom API base URL
    pub api_base: Option<String>,
}

/// Map a genai AdapterKind to the provider name used for secret lookup
pub fn adapter_kind_to_provider(adapter: AdapterKind) -> String {
    match adapter {
        AdapterKind::OpenAI => "openai".to_string(),
        AdapterKind::Anthropic => "anthropic".to_string(),
        AdapterKind::Gemini => "gemini".to_string(),
        AdapterKind::Ollama => "ollama".to_string(),
        AdapterKind::Groq => "groq".to_string(),
        AdapterKind::DeepSeek => "deepseek".to_string(),
        _ => format!("{:?}", adapter).to_lowercase(),
    }
}

// ============================================================================
// Client Creation with Custom Auth
// ============================================================================

/// Create a genai Client with custom auth and endpoint resolution
pub fn create_client(connection: &ProviderConnection, secrets: Arc<dyn SecretStore>) -> Client {
    let auth_provider = connection.provider.clone();
    let auth_explicit_key = connection.api_key.clone();

    let auth_resolver = AuthResolver::from_resolver_async_fn(
        move |model_iden: ModelIden| -> Pin<Box<dyn Future<Output = genai::resolver::Result<Option<AuthData>>> + Send>> {
            let provider = auth_provider.clone();
            let explicit_key = auth_explicit_key.clone();
            let secrets = Arc::clone(&secrets);
            let adapter_kind = model_iden.adapter_kind;

            Box::pin(async move {
                if let Some(key) = explicit_key {
                    return Ok(Some(AuthData::from_single(key)));
                }

                let lookup = if provider.is_empty() {
                    adapter_kind_to_provider(adapter_kind)
                } else {
                    provider
                };

                // None lets genai handle keyless backends such as Ollama
                Ok(secrets.get(&lookup).map(AuthData::from_single))
            })
        },
    );

    let target_provider = connection.provider.clone();
    let target_api_base = connection.api_base.clone();

    let target_resolver = ServiceTargetResolver::from_resolver_fn(
        move |target: ServiceTarget| -> Result<ServiceTarget, genai::resolver::Error> {
            let ServiceTarget { ref model, .. } = target;

            let custom_base = target_api_base
                .as_ref()
                .map(|u| Endpoint::from_owned(u.clone()));

            let endpoint = match target_provider.as_str() {
                "azure" => custom_base.unwrap_or_else(|| {
                    Endpoint::from_static("https://your-resource.openai.azure.com/")
                }),
                "openrouter" => custom_base
                    .unwrap_or_else(|| Endpoint::from_static("https://openrouter.ai/api/v1/")),
                "mistral" => custom_base
                    .unwrap_or_else(|| Endpoint::from_static("https://api.mistral.ai/v1/")),
                // Native genai providers resolve normally
                _ => return Ok(target),
            };

            let resolved_model = ModelIden::new(AdapterKind::OpenAI, model.model_name.clone());

            Ok(ServiceTarget {
                endpoint,
                auth: target.auth,
                model: resolved_model,
            })
        },
    );

    Client::builder()
        .with_auth_resolver(auth_resolver)
        .with_service_target_resolver(target_resolver)
        .build()
}

/// Check if a provider is natively supported by genai
pub fn is_genai_native(provider: &str) -> bool {
    matches!(
        provider.to_lowercase().as_str(),
        "openai"
            | "anthropic"
            | "gemini"
            | "ollama"
            | "groq"
            | "xai"
            | "deepseek"
            | "cohere"
            | "fireworks"
            | "together"
    )
}

/// Check if a provider can be handled by genai (native or via OpenAI-compat)
pub fn is_genai_supported(provider: &str) -> bool {
    is_genai_native(provider)
        || matches!(
            provider.to_lowercase().as_str(),
            "azure" | "openrouter" | "mistral"
        )
}
