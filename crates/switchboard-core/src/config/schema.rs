//! Configuration file structure

use serde::{Deserialize, Serialize};

use super::traits::{ConfigError, ConfigResult};
use crate::orchestrator::OrchestratorSettings;
use crate::router::{ModelCatalog, RouterSettings};
use crate::tools::ToolPrefilter;
use crate::types::{ModelConfig, ModelTarget, ProviderConfig};

/// Everything needed to build an `Orchestrator`
///
/// ```yaml
/// providers:
///   - name: openai
///   - name: openrouter
///     api_base: https://openrouter.ai/api/v1/
/// models:
///   - provider: openai
///     model: gpt-4o-mini
///     capabilities: { tool_calling: true, streaming: true }
///     input_cost_per_1k: 0.00015
///     output_cost_per_1k: 0.0006
///     quality: 2
/// router:
///   max_fallbacks: 3
/// orchestrator:
///   max_tools: 8
/// prefilter:
///   core: [memory]
///   categories:
///     - name: financial
///       keywords: [budget, spend]
///       tools: [get_budget]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub providers: Vec<ProviderConfig>,
    pub models: Vec<ModelConfig>,
    pub router: RouterSettings,
    pub orchestrator: OrchestratorSettings,
    pub prefilter: ToolPrefilter,
}

impl ConfigFile {
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Find a provider by case-insensitive name
    pub fn find_provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn add_provider(&mut self, config: ProviderConfig) -> ConfigResult<()> {
        if self.find_provider(&config.name).is_some() {
            return Err(ConfigError::ProviderExists(config.name));
        }
        self.providers.push(config);
        Ok(())
    }

    pub fn update_provider(&mut self, name: &str, config: ProviderConfig) -> ConfigResult<()> {
        match self.providers.iter().position(|p| p.name.eq_ignore_ascii_case(name)) {
            Some(pos) => {
                self.providers[pos] = config;
                Ok(())
            }
            None => Err(ConfigError::ProviderNotFound(name.to_string())),
        }
    }

    pub fn remove_provider(&mut self, name: &str) -> ConfigResult<()> {
        let original_len = self.providers.len();
        self.providers.retain(|p| !p.name.eq_ignore_ascii_case(name));
        if self.providers.len() == original_len {
            return Err(ConfigError::ProviderNotFound(name.to_string()));
        }
        Ok(())
    }

    pub fn add_model(&mut self, model: ModelConfig) -> ConfigResult<()> {
        if self.position_of_model(&model.provider, &model.model).is_some() {
            return Err(ConfigError::ModelExists(model.target().to_string()));
        }
        self.models.push(model);
        Ok(())
    }

    pub fn remove_model(&mut self, provider: &str, model: &str) -> ConfigResult<()> {
        match self.position_of_model(provider, model) {
            Some(pos) => {
                self.models.remove(pos);
                Ok(())
            }
            None => Err(ConfigError::ModelNotFound(ModelTarget::new(provider, model).to_string())),
        }
    }

    /// Router catalog built from `models`
    pub fn catalog(&self) -> ModelCatalog {
        ModelCatalog::new(self.models.clone())
    }

    fn position_of_model(&self, provider: &str, model: &str) -> Option<usize> {
        self.models
            .iter()
            .position(|m| m.provider.eq_ignore_ascii_case(provider) && m.model == model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = ConfigFile::from_yaml("{}").unwrap();
        assert!(config.providers.is_empty());
        assert_eq!(config.router.max_fallbacks, 3);
        assert_eq!(config.router.attempt_timeout_ms, 30_000);
        assert_eq!(config.orchestrator.max_tools, 8);
        assert_eq!(config.orchestrator.tool_timeout_ms, 10_000);
        assert_eq!(config.orchestrator.turn_timeout_ms, 60_000);
        assert_eq!(config.orchestrator.max_tokens, 1024);
    }

    #[test]
    fn test_full_document() {
        let yaml = r#"
providers:
  - name: openai
  - name: openrouter
    api_base: https://openrouter.ai/api/v1/
    enabled: false
models:
  - provider: openai
    model: gpt-4o-mini
    capabilities: { tool_calling: true }
    input_cost_per_1k: 0.00015
    output_cost_per_1k: 0.0006
    quality: 2
router:
  max_fallbacks: 1
orchestrator:
  system_prompt: Be brief.
prefilter:
  core: [memory]
  categories:
    - name: financial
      keywords: [budget]
      tools: [get_budget]
"#;
        let config = ConfigFile::from_yaml(yaml).unwrap();
        assert_eq!(config.providers.len(), 2);
        assert!(!config.find_provider("OpenRouter").unwrap().enabled);
        assert!(config.models[0].capabilities.chat);
        assert!(config.models[0].capabilities.tool_calling);
        assert_eq!(config.router.max_fallbacks, 1);
        assert_eq!(config.orchestrator.system_prompt.as_deref(), Some("Be brief."));
        assert_eq!(config.prefilter.categories[0].tools, vec!["get_budget"]);
        assert_eq!(config.catalog().len(), 1);

        let reparsed = ConfigFile::from_yaml(&config.to_yaml().unwrap()).unwrap();
        assert_eq!(reparsed, config);
    }

    #[test]
    fn test_provider_and_model_edits() {
        let mut config = ConfigFile::default();
        config.add_provider(ProviderConfig::new("openai")).unwrap();
        assert!(matches!(
            config.add_provider(ProviderConfig::new("OpenAI")),
            Err(ConfigError::ProviderExists(_))
        ));
        config
            .update_provider("OPENAI", ProviderConfig::new("openai").with_api_base("https://x.invalid"))
            .unwrap();
        assert!(config.providers[0].api_base.is_some());
        assert!(matches!(config.remove_provider("groq"), Err(ConfigError::ProviderNotFound(_))));
        config.remove_provider("openai").unwrap();

        config.add_model(ModelConfig::new("openai", "gpt-4o")).unwrap();
        assert!(matches!(
            config.add_model(ModelConfig::new("OpenAI", "gpt-4o")),
            Err(ConfigError::ModelExists(_))
        ));
        config.add_model(ModelConfig::new("openai", "gpt-4o-mini")).unwrap();
        config.remove_model("openai", "gpt-4o").unwrap();
        assert!(matches!(
            config.remove_model("openai", "gpt-4o"),
            Err(ConfigError::ModelNotFound(_))
        ));
        assert_eq!(config.models.len(), 1);
    }
}
