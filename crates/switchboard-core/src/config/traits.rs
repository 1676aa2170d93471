//! Configuration provider trait

use async_trait::async_trait;

use super::schema::ConfigFile;
use crate::types::{ModelConfig, ProviderConfig};

/// Configuration provider abstraction
///
/// Implementations:
/// - `MemoryConfigProvider`: In-memory for testing
/// - `FileConfigProvider`: Reads from YAML file (~/.config/switchboard/config.yaml)
///
/// Mutations are read-modify-write over the whole `ConfigFile`; callers
/// editing the same store concurrently should serialize themselves.
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    /// Load the full configuration
    async fn get_config(&self) -> ConfigResult<ConfigFile>;

    /// Replace the full configuration
    async fn save_config(&self, config: ConfigFile) -> ConfigResult<()>;

    /// Get all configured providers
    async fn get_providers(&self) -> Vec<ProviderConfig> {
        self.get_config().await.map(|c| c.providers).unwrap_or_default()
    }

    /// Update a provider's configuration
    async fn update_provider(&self, name: &str, config: ProviderConfig) -> ConfigResult<()> {
        let mut file = self.get_config().await?;
        file.update_provider(name, config)?;
        self.save_config(file).await
    }

    /// Add a new provider
    async fn add_provider(&self, config: ProviderConfig) -> ConfigResult<()> {
        let mut file = self.get_config().await?;
        file.add_provider(config)?;
        self.save_config(file).await
    }

    /// Remove a provider
    async fn remove_provider(&self, name: &str) -> ConfigResult<()> {
        let mut file = self.get_config().await?;
        file.remove_provider(name)?;
        self.save_config(file).await
    }

    /// Get the model catalog entries
    async fn get_models(&self) -> Vec<ModelConfig> {
        self.get_config().await.map(|c| c.models).unwrap_or_default()
    }

    /// Add a catalog entry
    async fn add_model(&self, model: ModelConfig) -> ConfigResult<()> {
        let mut file = self.get_config().await?;
        file.add_model(model)?;
        self.save_config(file).await
    }

    /// Remove a catalog entry
    async fn remove_model(&self, provider: &str, model: &str) -> ConfigResult<()> {
        let mut file = self.get_config().await?;
        file.remove_model(provider, model)?;
        self.save_config(file).await
    }
}

/// Errors that can occur during configuration operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    #[error("Provider already exists: {0}")]
    ProviderExists(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Model already exists: {0}")]
    ModelExists(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Other(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
