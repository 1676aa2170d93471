//! LLM Provider implementations
//!
//! ## Architecture
//!
//! Real backends go through the `genai` crate, which handles the
//! provider-specific protocols (OpenAI, Anthropic, Gemini, etc.) and tool
//! calling. Providers not native to genai (Azure, OpenRouter, Mistral) are
//! handled via genai's `ServiceTargetResolver` using OpenAI-compatible
//! protocols.
//!
//! Auth flows through a `SecretStore`, not genai's env var lookup.
//!
//! The `MockProvider` serves tests and the `mock` provider id.

mod traits;
mod error;
mod genai_adapter;
mod genai_provider;
mod mock;

pub use traits::{ChatOptions, Provider, ProviderModelConfig};
pub use error::{ProviderError, ProviderErrorKind, ProviderResult};

pub use genai_provider::GenaiProvider;
pub use genai_adapter::{is_genai_native, is_genai_supported};

pub use mock::{MockConfig, MockMode, MockProvider, MockReply, RecordedRequest};

use crate::logging::Logger;
use crate::secrets::SecretStore;
use std::sync::Arc;

/// Create a provider for the given provider ID
///
/// `mock` gets an echoing `MockProvider`; everything else goes through
/// `GenaiProvider`, including unknown ids, which are treated as custom
/// OpenAI-compatible endpoints.
pub fn create_provider(
    provider_id: &str,
    secrets: Arc<dyn SecretStore>,
    logger: Arc<dyn Logger>,
) -> Arc<dyn Provider> {
    match provider_id.to_lowercase().as_str() {
        "mock" => Arc::new(MockProvider::echo(logger)),
        _ => {
            if !GenaiProvider::supports(provider_id) {
                logger.warn(&format!(
                    "[Providers] '{}' is not a known genai backend, using it as-is",
                    provider_id
                ));
            }
            Arc::new(GenaiProvider::new(provider_id, secrets, logger))
        }
    }
}

/// List all supported provider IDs
pub fn supported_providers() -> Vec<&'static str> {
    vec![
        // Native genai providers
        "openai",
        "anthropic",
        "gemini",
        "ollama",
        "groq",
        "xai",
        "deepseek",
        "cohere",
        "fireworks",
        "together",
        // OpenAI-compatible providers via resolver
        "azure",
        "openrouter",
        "mistral",
        // Testing
        "mock",
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use crate::secrets::MemorySecretStore;

    #[test]
    fn test_create_provider_names() {
        let secrets: Arc<dyn SecretStore> = Arc::new(MemorySecretStore::new());
        let logger: Arc<dyn Logger> = Arc::new(NoOpLogger);

        assert_eq!(create_provider("mock", Arc::clone(&secrets), Arc::clone(&logger)).name(), "mock");
        assert_eq!(create_provider("openai", Arc::clone(&secrets), Arc::clone(&logger)).name(), "openai");
        assert_eq!(create_provider("my-gateway", secrets, logger).name(), "my-gateway");
    }

    #[test]
    fn test_supported_providers_are_supported() {
        for id in supported_providers() {
            assert!(id == "mock" || is_genai_supported(id), "{} not handled", id);
        }
    }
}
