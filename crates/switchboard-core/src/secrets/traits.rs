//! Secret store trait and errors

use thiserror::Error;

/// Errors that can occur during secret store operations
#[derive(Error, Debug)]
pub enum SecretStoreError {
    #[error("Store is read-only")]
    ReadOnly,

    #[error("Secret not found: {0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Other(String),
}

pub type SecretStoreResult<T> = Result<T, SecretStoreError>;

/// Source of provider credentials
///
/// Keys are either provider names (`"openai"`), which each store maps to
/// its own naming scheme, or store-native names (`"OPENAI_API_KEY"`).
pub trait SecretStore: Send + Sync {
    /// Human-readable name of this store
    fn name(&self) -> &str;

    /// Retrieve a secret by key
    fn get(&self, key: &str) -> Option<String>;

    /// Store a secret; read-only stores keep the default
    fn store(&self, _key: &str, _value: &str) -> SecretStoreResult<()> {
        Err(SecretStoreError::ReadOnly)
    }

    /// Delete a secret; read-only stores keep the default
    fn delete(&self, _key: &str) -> SecretStoreResult<()> {
        Err(SecretStoreError::ReadOnly)
    }

    /// Check if a secret exists
    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Look up the API key for a provider, failing with `NotFound`
    fn api_key(&self, provider: &str) -> SecretStoreResult<String> {
        self.get(provider)
            .ok_or_else(|| SecretStoreError::NotFound(provider.to_string()))
    }
}
