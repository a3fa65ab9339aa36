//! Configuration management
//!
//! YAML file with kebab-case keys. Every section has defaults, so a partial
//! file is fine. Bot tokens can come from the environment instead.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::application::errors::ConfigError;
use crate::application::messaging::formatter::{DEFAULT_MAX_MESSAGE_LEN, TELEGRAM_MAX_MESSAGE_LEN};

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";
pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";
pub const ADMIN_TOKEN_ENV: &str = "ADMIN_BOT_TOKEN";
pub const DRIVER_TOKEN_ENV: &str = "DRIVER_BOT_TOKEN";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub bots: BotsConfig,
    pub database: DatabaseConfig,
    pub http: HttpConfig,
    pub messages: MessagesConfig,
    pub shutdown: ShutdownConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BotsConfig {
    pub admin: AdminBotConfig,
    pub driver: BotConfig,
    pub poll_timeout_secs: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BotConfig {
    pub enabled: bool,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AdminBotConfig {
    pub enabled: bool,
    pub token: Option<String>,
    /// Telegram ids allowed to use the admin bot. Empty allows everyone.
    pub allowed_users: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub seed_cities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct HttpConfig {
    pub enabled: bool,
    pub bind: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct MessagesConfig {
    pub max_length: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ShutdownConfig {
    pub grace_period_secs: u64,
}

impl Default for BotsConfig {
    fn default() -> Self {
        Self {
            admin: AdminBotConfig::default(),
            driver: BotConfig::default(),
            poll_timeout_secs: 30,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("dalnoboy.db"),
            seed_cities: vec![
                "Москва".to_string(),
                "Санкт-Петербург".to_string(),
                "Казань".to_string(),
            ],
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_MESSAGE_LEN,
        }
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self { grace_period_secs: 30 }
    }
}

impl Config {
    /// `--config` wins, then `CONFIG_PATH`, then `config.yaml`.
    pub fn resolve_path(cli: Option<PathBuf>) -> PathBuf {
        cli.or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config {}: {}", path.display(), e)))?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    /// Load the file if it exists, otherwise start from defaults. Environment
    /// overrides are applied either way.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            Self::load(path)?
        } else {
            tracing::warn!(path = %path.display(), "Config file not found, using defaults");
            Self::default()
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// A token found in the environment replaces the file value and enables
    /// the bot.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(token) = lookup(ADMIN_TOKEN_ENV).filter(|t| !t.is_empty()) {
            self.bots.admin.token = Some(token);
            self.bots.admin.enabled = true;
        }
        if let Some(token) = lookup(DRIVER_TOKEN_ENV).filter(|t| !t.is_empty()) {
            self.bots.driver.token = Some(token);
            self.bots.driver.enabled = true;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bots.admin.enabled && is_blank(&self.bots.admin.token) {
            return Err(ConfigError::MissingField("bots.admin.token".to_string()));
        }
        if self.bots.driver.enabled && is_blank(&self.bots.driver.token) {
            return Err(ConfigError::MissingField("bots.driver.token".to_string()));
        }
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::MissingField("database.path".to_string()));
        }
        if !(1..=TELEGRAM_MAX_MESSAGE_LEN).contains(&self.messages.max_length) {
            return Err(ConfigError::InvalidValue(format!(
                "messages.max-length must be between 1 and {}, got {}",
                TELEGRAM_MAX_MESSAGE_LEN, self.messages.max_length
            )));
        }
        if self.http.enabled && self.http.bind.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::InvalidValue(format!("http.bind '{}' is not a socket address", self.http.bind)));
        }
        Ok(())
    }

    /// Write this config as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path.as_ref(), yaml)
            .map_err(|e| ConfigError::InvalidValue(format!("Failed to write {}: {}", path.as_ref().display(), e)))
    }
}

fn is_blank(token: &Option<String>) -> bool {
    token.as_deref().map_or(true, |t| t.trim().is_empty())
}
