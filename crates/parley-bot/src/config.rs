use config::{Config as ConfigLoader, ConfigError, Environment, File};
use parley_dispatch::{ChunkPolicy, DispatchConfig, DEFAULT_SYSTEM_PROMPT};
use parley_llm::ProviderConfig;
use parley_persist::{AccessTier, ModelProfile, StorageConfig, DEFAULT_WINDOW};
use serde::Deserialize;
use std::path::Path;

#[derive(Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub dispatch: DispatchSettings,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub access: AccessConfig,
    #[serde(default)]
    pub models: Vec<ModelSeed>,
    #[serde(default)]
    pub console: ConsoleConfig,

    // Secrets (from ENV only)
    #[serde(skip)]
    pub openrouter_api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DispatchSettings {
    pub system_prompt: String,
    pub context_limit: usize,
    pub chunking: ChunkPolicy,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            context_limit: DEFAULT_WINDOW,
            chunking: ChunkPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

/// Identities allowed to use restricted models
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessConfig {
    #[serde(default)]
    pub allowlist: Vec<String>,
}

/// A model profile loaded at startup
#[derive(Clone, Deserialize)]
pub struct ModelSeed {
    pub name: String,
    pub provider_id: String,
    /// Falls back to `OPENROUTER_API_KEY` when absent
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default)]
    pub tier: AccessTier,
}

fn enabled_by_default() -> bool {
    true
}

impl ModelSeed {
    pub fn into_profile(self, fallback_key: Option<&str>) -> ModelProfile {
        let api_key = self
            .api_key
            .or_else(|| fallback_key.map(str::to_string))
            .unwrap_or_default();

        let mut profile = ModelProfile::new(self.name, self.provider_id, api_key);
        profile.is_enabled = self.enabled;
        profile.access_tier = self.tier;
        profile
    }
}

/// Who the console speaks as
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub user_id: String,
    /// Checked against the allow-list
    pub username: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            user_id: "console".to_string(),
            username: "console".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables prefixed `PARLEY_` (e.g. `PARLEY_PROVIDER__MAX_ATTEMPTS`)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            // 1. Load default config
            .add_source(File::with_name("config/default").required(false))
            // 2. Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // 3. Environment variables override everything
            .add_source(
                Environment::with_prefix("PARLEY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut cfg: Config = builder.build()?.try_deserialize()?;

        // Secrets from ENV (not in TOML)
        cfg.openrouter_api_key = std::env::var("OPENROUTER_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));

        builder.build()?.try_deserialize()
    }

    pub fn dispatch_config(&self) -> DispatchConfig {
        DispatchConfig::new()
            .with_system_prompt(self.dispatch.system_prompt.clone())
            .with_context_limit(self.dispatch.context_limit)
            .with_chunking(self.dispatch.chunking)
    }

    /// Seed profiles with the shared key filled in where none was given
    pub fn model_profiles(&self) -> Vec<ModelProfile> {
        self.models
            .iter()
            .cloned()
            .map(|seed| seed.into_profile(self.openrouter_api_key.as_deref()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_structure() {
        let toml = r#"
            [provider]
            base_url = "http://localhost:8080/api/v1"
            max_attempts = 5
            title = "Parley"

            [dispatch]
            context_limit = 6

            [dispatch.chunking]
            limit = 4000
            chunk_size = 3900

            [logging]
            level = "debug"
            format = "json"

            [storage]
            backend = "sqlite"
            url = "sqlite://parley.db"

            [access]
            allowlist = ["alice", "Bob"]

            [[models]]
            name = "Haiku"
            provider_id = "anthropic/claude-3-haiku"

            [[models]]
            name = "R1"
            provider_id = "deepseek/deepseek-r1"
            api_key = "sk-inline"
            tier = "restricted"
            enabled = false
        "#;

        let mut config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.provider.max_attempts, 5);
        assert_eq!(config.provider.request_timeout_ms, 60_000);
        assert_eq!(config.provider.title.as_deref(), Some("Parley"));
        assert_eq!(config.dispatch.context_limit, 6);
        assert_eq!(config.dispatch.system_prompt, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(config.dispatch.chunking, ChunkPolicy::new(4000, 3900));
        assert_eq!(
            config.storage,
            StorageConfig::Sqlite {
                url: "sqlite://parley.db".to_string(),
                max_connections: 5
            }
        );
        assert_eq!(config.access.allowlist.len(), 2);
        assert_eq!(config.console.user_id, "console");

        config.openrouter_api_key = Some("sk-shared".to_string());
        let profiles = config.model_profiles();
        assert_eq!(profiles[0].api_key, "sk-shared");
        assert_eq!(profiles[0].access_tier, AccessTier::Public);
        assert!(profiles[0].is_enabled);
        assert_eq!(profiles[1].api_key, "sk-inline");
        assert_eq!(profiles[1].access_tier, AccessTier::Restricted);
        assert!(!profiles[1].is_enabled);

        let dispatch = config.dispatch_config();
        assert_eq!(dispatch.chunking.limit, 4000);
        assert_eq!(dispatch.context_limit, 6);
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let toml = r#"
            [logging]
            level = "info"
            format = "pretty"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.provider, ProviderConfig::default());
        assert_eq!(config.storage, StorageConfig::Memory);
        assert!(config.models.is_empty());
        assert!(config.openrouter_api_key.is_none());
    }
}
