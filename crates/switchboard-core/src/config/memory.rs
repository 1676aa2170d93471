//! In-memory configuration provider

use async_trait::async_trait;
use parking_lot::RwLock;

use super::schema::ConfigFile;
use super::traits::{ConfigProvider, ConfigResult};
use crate::types::ProviderConfig;

/// In-memory configuration provider for testing
#[derive(Debug, Default)]
pub struct MemoryConfigProvider {
    config: RwLock<ConfigFile>,
}

impl MemoryConfigProvider {
    /// Create a new empty memory config provider
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ConfigFile) -> Self {
        Self {
            config: RwLock::new(config),
        }
    }

    /// Create a memory config provider with initial providers
    pub fn with_providers(providers: Vec<ProviderConfig>) -> Self {
        Self::with_config(ConfigFile {
            providers,
            ..Default::default()
        })
    }

    /// Reset to an empty configuration
    pub fn clear(&self) {
        *self.config.write() = ConfigFile::default();
    }
}

#[async_trait]
impl ConfigProvider for MemoryConfigProvider {
    async fn get_config(&self) -> ConfigResult<ConfigFile> {
        Ok(self.config.read().clone())
    }

    async fn save_config(&self, config: ConfigFile) -> ConfigResult<()> {
        *self.config.write() = config;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::types::ModelConfig;

    #[tokio::test]
    async fn test_memory_provider() {
        let provider = MemoryConfigProvider::with_providers(vec![ProviderConfig::new("openai")]);

        assert_eq!(provider.get_providers().await.len(), 1);

        provider.add_provider(ProviderConfig::new("anthropic")).await.unwrap();
        assert_eq!(provider.get_providers().await.len(), 2);

        let err = provider.add_provider(ProviderConfig::new("Anthropic")).await.unwrap_err();
        assert!(matches!(err, ConfigError::ProviderExists(_)));

        provider.remove_provider("openai").await.unwrap();
        let names: Vec<_> = provider.get_providers().await.into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["anthropic"]);
    }

    #[tokio::test]
    async fn test_models_and_clear() {
        let provider = MemoryConfigProvider::new();
        provider.add_model(ModelConfig::new("mock", "echo")).await.unwrap();
        assert_eq!(provider.get_models().await.len(), 1);

        provider.clear();
        assert!(provider.get_models().await.is_empty());
        assert!(matches!(
            provider.remove_model("mock", "echo").await,
            Err(ConfigError::ModelNotFound(_))
        ));
    }
}
