//! Environment variable secret store

use std::collections::HashMap;
use std::env;

use once_cell::sync::Lazy;

use super::traits::SecretStore;

/// Mapping from provider names to environment variable names
static ENV_VAR_MAP: Lazy<HashMap<&'static str, Vec<&'static str>>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("openai", vec!["OPENAI_API_KEY"]);
    m.insert("anthropic", vec!["ANTHROPIC_API_KEY"]);
    m.insert("gemini", vec!["GEMINI_API_KEY", "GOOGLE_API_KEY"]);
    m.insert("google", vec!["GEMINI_API_KEY", "GOOGLE_API_KEY"]);
    m.insert("groq", vec!["GROQ_API_KEY"]);
    m.insert("deepseek", vec!["DEEPSEEK_API_KEY"]);
    m.insert("mistral", vec!["MISTRAL_API_KEY"]);
    m.insert("azure", vec!["AZURE_API_KEY", "AZURE_OPENAI_API_KEY"]);
    m.insert("openrouter", vec!["OPENROUTER_API_KEY"]);
    m.insert("ollama", vec![]);
    m
});

/// Read-only store backed by the process environment
///
/// Provider names map to their conventional variables (`openai` ->
/// `OPENAI_API_KEY`); anything else is tried as-is and then as
/// `<KEY>_API_KEY`.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSecretStore;

impl EnvSecretStore {
    pub fn new() -> Self {
        Self
    }

    /// Get the environment variable names for a provider
    pub fn env_vars_for_provider(provider: &str) -> Option<&'static [&'static str]> {
        ENV_VAR_MAP.get(provider.to_lowercase().as_str()).map(|v| v.as_slice())
    }

    fn read(name: &str) -> Option<String> {
        env::var(name).ok().filter(|v| !v.is_empty())
    }
}

impl SecretStore for EnvSecretStore {
    fn name(&self) -> &str {
        "env"
    }

    fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = Self::read(key) {
            return Some(value);
        }

        if let Some(vars) = Self::env_vars_for_provider(key) {
            if let Some(value) = vars.iter().find_map(|v| Self::read(v)) {
                return Some(value);
            }
        }

        Self::read(&format!("{}_API_KEY", key.to_uppercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::SecretStoreError;

    #[test]
    fn test_env_store_read_only() {
        let store = EnvSecretStore::new();
        assert_eq!(store.name(), "env");
        assert!(matches!(store.store("test", "value"), Err(SecretStoreError::ReadOnly)));
        assert!(matches!(store.delete("test"), Err(SecretStoreError::ReadOnly)));
    }

    #[test]
    fn test_env_store_get_direct() {
        env::set_var("SWITCHBOARD_TEST_SECRET_1", "test_value");

        let store = EnvSecretStore::new();
        assert_eq!(store.get("SWITCHBOARD_TEST_SECRET_1"), Some("test_value".to_string()));

        env::remove_var("SWITCHBOARD_TEST_SECRET_1");
    }

    #[test]
    fn test_env_store_suffix_fallback() {
        env::set_var("SBTESTPROVIDER_API_KEY", "sk-suffix");

        let store = EnvSecretStore::new();
        assert_eq!(store.get("sbtestprovider"), Some("sk-suffix".to_string()));
        assert_eq!(store.api_key("sbtestprovider").unwrap(), "sk-suffix");

        env::remove_var("SBTESTPROVIDER_API_KEY");
    }

    #[test]
    fn test_env_store_not_found() {
        let store = EnvSecretStore::new();
        assert_eq!(store.get("nonexistent_provider_xyz"), None);
        assert!(matches!(
            store.api_key("nonexistent_provider_xyz"),
            Err(SecretStoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_provider_mapping() {
        assert_eq!(
            EnvSecretStore::env_vars_for_provider("OpenAI"),
            Some(&["OPENAI_API_KEY"][..])
        );
        assert!(EnvSecretStore::env_vars_for_provider("ollama").unwrap().is_empty());
    }
}
