//! Configuration system for Ratebot
//!
//! Settings live in a TOML file; every section has defaults so an empty
//! file (or no file at all) yields a working configuration apart from the
//! Discord token, which usually comes from the environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    CoreError, Result,
    chunk::{DEFAULT_CHUNK_SIZE, DISCORD_MESSAGE_LIMIT},
    error::ConfigError,
};

/// Room kept under the platform limit for the code fences around a chunk.
const CODE_FENCE_OVERHEAD: usize = 8;

/// Top-level configuration for Ratebot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatebotConfig {
    /// Discord connection settings
    #[serde(default)]
    pub discord: DiscordSettings,

    /// Currency lookup settings
    #[serde(default)]
    pub rates: RatesConfig,

    /// Endpoints of the fun and utility services
    #[serde(default)]
    pub services: ServicesConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscordSettings {
    /// Bot token. Normally supplied through `DISCORD_TOKEN`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,

    /// Prefix marking a message as a command
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Discord application ID, needed for slash command registration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<u64>,

    /// Only answer in these channels when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_channels: Option<Vec<u64>>,

    /// Register the `/rate` slash command on startup
    #[serde(default = "default_true")]
    pub register_slash_commands: bool,

    /// User allowed to run owner-only commands such as `olist`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<u64>,
}

impl Default for DiscordSettings {
    fn default() -> Self {
        Self {
            token: String::new(),
            prefix: default_prefix(),
            application_id: None,
            allowed_channels: None,
            register_slash_commands: true,
            owner_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatesConfig {
    /// Frankfurter `latest` endpoint
    #[serde(default = "default_rates_endpoint")]
    pub endpoint: String,

    /// Maximum characters per chunk of a rate listing
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Seconds a user must wait between rate lookups
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            endpoint: default_rates_endpoint(),
            chunk_size: default_chunk_size(),
            cooldown_secs: default_cooldown_secs(),
        }
    }
}

impl RatesConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    /// BNM Kuala Lumpur USD/MYR reference rate
    pub reference_rate_url: String,
    pub cat_facts_url: String,
    pub cat_images_url: String,
    /// CheapShark deals endpoint
    pub deals_url: String,
    /// CheapShark games endpoint
    pub games_url: String,
    /// dictionaryapi.dev entries endpoint, the word is appended
    pub dictionary_url: String,
    /// Daily horoscope endpoint, queried with `sign` and `date`
    pub horoscope_url: String,
    /// Wise rates endpoint for `liverate`
    pub live_rate_url: String,
    /// Wise API token. `liverate` is disabled without one; normally
    /// supplied through `WISE_SANDBOX_TOKEN`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_rate_token: Option<String>,
    /// Music search endpoint, queried with `key`
    pub music_search_url: String,
    /// Music download endpoint, queried with `ID`, `quality` and `format`
    pub music_download_url: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            reference_rate_url: "https://api.bnm.gov.my/public/kl-usd-reference-rate".to_string(),
            cat_facts_url: "https://meowfacts.herokuapp.com/".to_string(),
            cat_images_url: "https://api.thecatapi.com/v1/images/search".to_string(),
            deals_url: "https://www.cheapshark.com/api/1.0/deals".to_string(),
            games_url: "https://www.cheapshark.com/api/1.0/games".to_string(),
            dictionary_url: "https://api.dictionaryapi.dev/api/v2/entries/en".to_string(),
            horoscope_url: "https://api.aistrology.beandev.xyz/v1".to_string(),
            live_rate_url: "https://api.sandbox.transferwise.tech/v1/rates".to_string(),
            live_rate_token: None,
            music_search_url: "https://music.wjhe.top/api/music/joox/search".to_string(),
            music_download_url: "https://music.wjhe.top/api/music/joox/url".to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl ServicesConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_prefix() -> String {
    "!".to_string()
}

fn default_true() -> bool {
    true
}

fn default_rates_endpoint() -> String {
    "https://api.frankfurter.dev/v1/latest".to_string()
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_cooldown_secs() -> u64 {
    3
}

/// Load configuration from a TOML file
pub async fn load_config(path: &Path) -> Result<RatebotConfig> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        CoreError::invalid_config(
            path.display().to_string(),
            "file",
            "readable TOML file",
            ConfigError::Io(e.to_string()),
        )
    })?;

    let config: RatebotConfig = toml::from_str(&content).map_err(|e| {
        CoreError::invalid_config(
            path.display().to_string(),
            "content",
            "valid TOML configuration",
            ConfigError::TomlParse(e.to_string()),
        )
    })?;

    tracing::debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Save configuration to a TOML file
pub async fn save_config(config: &RatebotConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            CoreError::invalid_config(
                parent.display().to_string(),
                "directory",
                "writable directory",
                ConfigError::Io(e.to_string()),
            )
        })?;
    }

    let content = toml::to_string_pretty(config).map_err(|e| {
        CoreError::invalid_config(
            path.display().to_string(),
            "serialization",
            "serializable config structure",
            ConfigError::TomlSerialize(e.to_string()),
        )
    })?;

    tokio::fs::write(path, content).await.map_err(|e| {
        CoreError::invalid_config(
            path.display().to_string(),
            "file",
            "writable file location",
            ConfigError::Io(e.to_string()),
        )
    })?;

    Ok(())
}

/// Standard configuration locations, most specific first
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("ratebot.toml")];

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("ratebot").join("config.toml"));
    }

    paths
}

/// Load from the first standard location that exists, or defaults
pub async fn load_config_from_standard_locations() -> Result<RatebotConfig> {
    for path in config_paths() {
        if path.exists() {
            return load_config(&path).await;
        }
    }

    Ok(RatebotConfig::default())
}

impl RatebotConfig {
    pub async fn load() -> Result<Self> {
        load_config_from_standard_locations().await
    }

    pub async fn load_from(path: &Path) -> Result<Self> {
        load_config(path).await
    }

    pub async fn save_to(&self, path: &Path) -> Result<()> {
        save_config(self, path).await
    }

    /// Apply overrides from a variable lookup (normally `std::env::var`).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("DISCORD_TOKEN").filter(|t| !t.is_empty()) {
            self.discord.token = token;
        }
        if let Some(app_id) = lookup("APP_ID").and_then(|id| id.parse().ok()) {
            self.discord.application_id = Some(app_id);
        }
        if let Some(prefix) = lookup("RATEBOT_PREFIX").filter(|p| !p.is_empty()) {
            self.discord.prefix = prefix;
        }
        if let Some(endpoint) = lookup("RATEBOT_RATES_ENDPOINT").filter(|e| !e.is_empty()) {
            self.rates.endpoint = endpoint;
        }
        if let Some(owner) = lookup("BOT_OWNER_ID") {
            match owner.parse() {
                Ok(id) => self.discord.owner_id = Some(id),
                Err(_) => tracing::warn!(
                    "Ignoring BOT_OWNER_ID '{}': not a user ID, owner-only commands stay disabled",
                    owner
                ),
            }
        }
        if let Some(token) = lookup("WISE_SANDBOX_TOKEN").filter(|t| !t.is_empty()) {
            self.services.live_rate_token = Some(token);
        }
    }

    /// A copy with every token removed, safe to print or write to disk.
    pub fn without_secrets(&self) -> Self {
        let mut config = self.clone();
        config.discord.token.clear();
        config.services.live_rate_token = None;
        config
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Check the settings that do not depend on a Discord connection.
    pub fn validate(&self) -> Result<()> {
        if self.discord.prefix.trim().is_empty() {
            return Err(invalid("discord.prefix", "a non-empty prefix", "empty prefix"));
        }

        let max_chunk = DISCORD_MESSAGE_LIMIT - CODE_FENCE_OVERHEAD;
        if self.rates.chunk_size == 0 || self.rates.chunk_size > max_chunk {
            return Err(invalid(
                "rates.chunk_size",
                &format!("a value between 1 and {max_chunk}"),
                &self.rates.chunk_size.to_string(),
            ));
        }

        if self.rates.endpoint.is_empty() {
            return Err(invalid("rates.endpoint", "a URL", "empty endpoint"));
        }

        Ok(())
    }

    /// [`validate`](Self::validate) plus a token check, for starting the bot.
    pub fn validate_for_bot(&self) -> Result<()> {
        self.validate()?;
        if self.discord.token.is_empty() {
            return Err(CoreError::invalid_config(
                "<environment>",
                "discord.token",
                "a bot token (set DISCORD_TOKEN)",
                ConfigError::MissingField("discord.token".to_string()),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &str, expected: &str, actual: &str) -> CoreError {
    CoreError::invalid_config(
        "<config>",
        field,
        expected,
        ConfigError::InvalidValue(actual.to_string()),
    )
}
