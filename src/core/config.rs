use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{fs, path::PathBuf};
use tracing::debug;

use super::currency::CurrencyMapping;

pub const TOKEN_ENV_VAR: &str = "RATEBOT_TELEGRAM_TOKEN";

fn default_telegram_base_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_poll_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TelegramConfig {
    pub token: Option<String>,
    #[serde(default = "default_telegram_base_url")]
    pub base_url: String,
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        TelegramConfig {
            token: None,
            base_url: default_telegram_base_url(),
            poll_timeout_secs: default_poll_timeout_secs(),
        }
    }
}

impl TelegramConfig {
    /// Bot token from the environment, falling back to the config file.
    pub fn resolve_token(&self) -> Result<String> {
        if let Ok(token) = std::env::var(TOKEN_ENV_VAR) {
            if !token.is_empty() {
                return Ok(token);
            }
        }
        self.token
            .clone()
            .filter(|t| !t.is_empty())
            .with_context(|| format!("No bot token: set telegram.token or {TOKEN_ENV_VAR}"))
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ConverterConfig {
    pub url: String,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    pub currencies_mapping: BTreeMap<String, String>,
}

impl ConverterConfig {
    pub fn mapping(&self) -> CurrencyMapping {
        CurrencyMapping::new(&self.currencies_mapping)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub telegram: TelegramConfig,
    pub converter: ConverterConfig,
    /// Display names for the currency list; the mapping's names when empty.
    #[serde(default)]
    pub currencies: Vec<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "ratebot", "ratebot")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn display_currencies(&self) -> Vec<String> {
        if self.currencies.is_empty() {
            self.converter.mapping().names().map(str::to_string).collect()
        } else {
            self.currencies.clone()
        }
    }
}
