use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::prompts::DEFAULT_CONFIG_CONTENT;

pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";
pub const DEFAULT_MODEL: &str = "deepseek-chat";

pub const ENV_API_KEY: &str = "NEWSDIGEST_API_KEY";
pub const ENV_BASE_URL: &str = "NEWSDIGEST_BASE_URL";
pub const ENV_MODEL: &str = "NEWSDIGEST_MODEL";
pub const ENV_LANG: &str = "NEWSDIGEST_LANG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub language: Language,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Zh,
    En,
}

impl Language {
    /// Code accepted by the config file, `NEWSDIGEST_LANG` and `--lang`.
    pub fn code(self) -> &'static str {
        match self {
            Language::Zh => "zh",
            Language::En => "en",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "zh" => Some(Language::Zh),
            "en" => Some(Language::En),
            _ => None,
        }
    }
}

impl UserConfig {
    /// The configured API key, ignoring blank values.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            language: Language::Zh,
        }
    }
}

pub struct ConfigManager {
    source: Option<PathBuf>,
    config: UserConfig,
}

impl ConfigManager {
    const CONFIG_FILE: &'static str = ".newsdigest.yml";

    /// Load `.newsdigest.yml` from `dir`, falling back to the user config directory.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let local = dir.as_ref().join(Self::CONFIG_FILE);
        let global = dirs::config_dir().map(|d| d.join("newsdigest").join("config.yml"));

        match std::iter::once(local).chain(global).find(|p| p.exists()) {
            Some(path) => Self::from_file(path),
            None => Ok(Self {
                source: None,
                config: UserConfig::default(),
            }),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: UserConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Invalid config {}", path.display()))?;

        Ok(Self {
            source: Some(path.to_path_buf()),
            config,
        })
    }

    /// Path the configuration was read from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// File configuration with `NEWSDIGEST_*` environment overrides applied.
    pub fn get(&self) -> UserConfig {
        apply_overrides(self.config.clone(), |key| std::env::var(key).ok())
    }

    pub fn create_default(dir: impl AsRef<Path>) -> Result<bool> {
        let config_path = dir.as_ref().join(Self::CONFIG_FILE);

        if config_path.exists() {
            return Ok(false);
        }

        std::fs::write(&config_path, DEFAULT_CONFIG_CONTENT)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        tracing::info!("Created config at {}", config_path.display());

        Ok(true)
    }
}

/// Overlay environment values on `config`; empty values are ignored.
pub fn apply_overrides<F>(mut config: UserConfig, lookup: F) -> UserConfig
where
    F: Fn(&str) -> Option<String>,
{
    let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(key) = value(ENV_API_KEY) {
        config.api_key = Some(key);
    }
    if let Some(url) = value(ENV_BASE_URL) {
        config.base_url = url;
    }
    if let Some(model) = value(ENV_MODEL) {
        config.model = model;
    }
    if let Some(language) = value(ENV_LANG).and_then(|l| Language::from_code(&l)) {
        config.language = language;
    }

    config
}
