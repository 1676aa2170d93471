//! Chained secret store

use std::sync::Arc;

use super::traits::{SecretStore, SecretStoreError, SecretStoreResult};

/// Tries each store in order and returns the first hit
///
/// Writes go to the first store in the chain.
pub struct ChainSecretStore {
    stores: Vec<Arc<dyn SecretStore>>,
}

impl ChainSecretStore {
    pub fn new(stores: Vec<Arc<dyn SecretStore>>) -> Self {
        Self { stores }
    }

    /// Name of the store that holds `key`, if any
    pub fn source_of(&self, key: &str) -> Option<&str> {
        self.stores.iter().find(|s| s.has(key)).map(|s| s.name())
    }
}

impl SecretStore for ChainSecretStore {
    fn name(&self) -> &str {
        "chain"
    }

    fn get(&self, key: &str) -> Option<String> {
        self.stores.iter().find_map(|s| s.get(key))
    }

    fn store(&self, key: &str, value: &str) -> SecretStoreResult<()> {
        match self.stores.first() {
            Some(store) => store.store(key, value),
            None => Err(SecretStoreError::Other("empty secret chain".to_string())),
        }
    }

    fn delete(&self, key: &str) -> SecretStoreResult<()> {
        // Read-only members keep their copy
        for store in self.stores.iter().filter(|s| s.has(key)) {
            let _ = store.delete(key);
        }
        Ok(())
    }
}

impl std::fmt::Debug for ChainSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.stores.iter().map(|s| s.name()).collect();
        f.debug_struct("ChainSecretStore").field("stores", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::{EnvSecretStore, MemorySecretStore};

    #[test]
    fn test_chain_first_hit_wins() {
        let first = Arc::new(MemorySecretStore::with_secrets([("openai", "from-first")]));
        let second = Arc::new(MemorySecretStore::with_secrets([
            ("openai", "from-second"),
            ("anthropic", "only-second"),
        ]));
        let chain = ChainSecretStore::new(vec![first, second]);

        assert_eq!(chain.get("openai"), Some("from-first".to_string()));
        assert_eq!(chain.get("anthropic"), Some("only-second".to_string()));
        assert_eq!(chain.source_of("anthropic"), Some("memory"));
        assert_eq!(chain.get("missing"), None);
    }

    #[test]
    fn test_chain_writes_to_first_store() {
        let memory = Arc::new(MemorySecretStore::new());
        let chain = ChainSecretStore::new(vec![memory.clone(), Arc::new(EnvSecretStore::new())]);

        chain.store("groq", "sk-groq").unwrap();
        assert_eq!(memory.get("groq"), Some("sk-groq".to_string()));

        chain.delete("groq").unwrap();
        assert!(!memory.has("groq"));
    }

    #[test]
    fn test_empty_chain() {
        let chain = ChainSecretStore::new(vec![]);
        assert_eq!(chain.get("openai"), None);
        assert!(chain.store("k", "v").is_err());
    }
}
