//! YAML-backed configuration
//!
//! Two conventional locations:
//! - user: `<config_dir>/switchboard/config.yaml`
//! - workspace: `<root>/.config/switchboard/config.yaml`

use async_trait::async_trait;
use parking_lot::RwLock;
use std::fs;
use std::path::{Path, PathBuf};

use super::schema::ConfigFile;
use super::traits::{ConfigProvider, ConfigResult};
use crate::types::ConfigSource;

const APP_DIR: &str = "switchboard";
const FILE_NAME: &str = "config.yaml";

/// Which of the two conventional locations a file lives at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLevel {
    User,
    Workspace,
}

impl ConfigLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigLevel::User => "user",
            ConfigLevel::Workspace => "workspace",
        }
    }
}

impl From<ConfigLevel> for ConfigSource {
    fn from(level: ConfigLevel) -> Self {
        match level {
            ConfigLevel::User => ConfigSource::User,
            ConfigLevel::Workspace => ConfigSource::Workspace,
        }
    }
}

/// `ConfigProvider` over one YAML file
///
/// The file is parsed on first use and cached; `reload` re-reads it. A
/// missing file is the default configuration, and nothing is written
/// until the first mutation. Providers read from disk are tagged with the
/// file's `ConfigSource`.
///
/// ```no_run
/// use switchboard_core::config::FileConfigProvider;
///
/// let user = FileConfigProvider::user();
/// let workspace = FileConfigProvider::workspace("/path/to/workspace");
/// ```
#[derive(Debug)]
pub struct FileConfigProvider {
    path: PathBuf,
    level: ConfigLevel,
    cache: RwLock<Option<ConfigFile>>,
}

impl FileConfigProvider {
    pub fn new(path: impl Into<PathBuf>, level: ConfigLevel) -> Self {
        Self {
            path: path.into(),
            level,
            cache: RwLock::new(None),
        }
    }

    pub fn user() -> Self {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from(".config"));
        Self::new(base.join(APP_DIR).join(FILE_NAME), ConfigLevel::User)
    }

    pub fn workspace(root: impl AsRef<Path>) -> Self {
        let path = root.as_ref().join(".config").join(APP_DIR).join(FILE_NAME);
        Self::new(path, ConfigLevel::Workspace)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn level(&self) -> ConfigLevel {
        self.level
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Discard the cache and parse the file again
    pub fn reload(&self) -> ConfigResult<ConfigFile> {
        let config = self.read_from_disk()?;
        *self.cache.write() = Some(config.clone());
        Ok(config)
    }

    /// Copy the file to `config.yaml.backup` next to it; `None` if there is no file
    pub fn backup(&self) -> ConfigResult<Option<PathBuf>> {
        if !self.exists() {
            return Ok(None);
        }
        let target = self.path.with_extension("yaml.backup");
        fs::copy(&self.path, &target)?;
        Ok(Some(target))
    }

    fn read_from_disk(&self) -> ConfigResult<ConfigFile> {
        if !self.exists() {
            return Ok(ConfigFile::default());
        }
        let mut config = ConfigFile::from_yaml(&fs::read_to_string(&self.path)?)?;
        let source = ConfigSource::from(self.level);
        for provider in &mut config.providers {
            provider.source = source.clone();
        }
        Ok(config)
    }

    /// Write to a sibling temp file, then rename over the target
    fn write_to_disk(&self, config: &ConfigFile) -> ConfigResult<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let staging = self.path.with_extension("yaml.tmp");
        fs::write(&staging, config.to_yaml()?)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

#[async_trait]
impl ConfigProvider for FileConfigProvider {
    async fn get_config(&self) -> ConfigResult<ConfigFile> {
        if let Some(config) = self.cache.read().clone() {
            return Ok(config);
        }
        self.reload()
    }

    async fn save_config(&self, config: ConfigFile) -> ConfigResult<()> {
        self.write_to_disk(&config)?;
        *self.cache.write() = Some(config);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::types::{ModelCapabilities, ModelConfig, ProviderConfig};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_file_reads_as_default_and_is_created_on_write() {
        let dir = tempdir().unwrap();
        let store = FileConfigProvider::new(dir.path().join("nested").join("config.yaml"), ConfigLevel::User);

        assert!(!store.exists());
        assert_eq!(store.get_config().await.unwrap(), ConfigFile::default());
        assert!(!store.exists());

        store.add_provider(ProviderConfig::new("openai")).await.unwrap();
        assert!(store.exists());
        assert!(!store.path().with_extension("yaml.tmp").exists());

        let reread = store.reload().unwrap();
        assert_eq!(reread.providers.len(), 1);
        assert_eq!(reread.providers[0].source, ConfigSource::User);
    }

    #[tokio::test]
    async fn test_workspace_file_round_trip() {
        let dir = tempdir().unwrap();
        let store = FileConfigProvider::workspace(dir.path());
        assert_eq!(store.level(), ConfigLevel::Workspace);
        assert!(store.path().ends_with(".config/switchboard/config.yaml"));

        store.add_provider(ProviderConfig::new("anthropic")).await.unwrap();
        store
            .add_model(
                ModelConfig::new("anthropic", "claude-3-5-haiku-latest")
                    .with_capabilities(ModelCapabilities::with_tools())
                    .with_costs(0.0008, 0.004),
            )
            .await
            .unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("claude-3-5-haiku-latest"));
        assert!(text.contains("max_fallbacks: 3"));
        // source is runtime-only
        assert!(!text.contains("source"));

        let other = FileConfigProvider::workspace(dir.path());
        let models = other.get_models().await;
        assert_eq!(models.len(), 1);
        assert!(models[0].capabilities.tool_calling);
        assert_eq!(other.get_providers().await[0].source, ConfigSource::Workspace);
    }

    #[tokio::test]
    async fn test_cache_until_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "providers:\n  - name: openai\n").unwrap();
        let store = FileConfigProvider::new(&path, ConfigLevel::User);
        assert_eq!(store.get_providers().await.len(), 1);

        fs::write(&path, "providers: []\n").unwrap();
        assert_eq!(store.get_providers().await.len(), 1);
        store.reload().unwrap();
        assert!(store.get_providers().await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "providers: [unclosed").unwrap();

        let store = FileConfigProvider::new(&path, ConfigLevel::User);
        assert!(matches!(store.get_config().await, Err(ConfigError::Yaml(_))));
        assert!(store.get_providers().await.is_empty());
        assert!(store.add_provider(ProviderConfig::new("openai")).await.is_err());
    }

    #[test]
    fn test_backup_copies_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let store = FileConfigProvider::new(&path, ConfigLevel::User);
        assert!(store.backup().unwrap().is_none());

        fs::write(&path, "providers: []").unwrap();
        let copy = store.backup().unwrap().unwrap();
        assert_eq!(fs::read_to_string(copy).unwrap(), "providers: []");
    }
}
