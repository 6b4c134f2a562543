//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Every field has a default, so a partial (or empty) file is valid.
//! The API credential is referenced by env-var name in the config and
//! resolved at startup via `std::env::var`.

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::fs;
use std::time::Duration;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub bookmakers: BookmakersConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    /// Sport used when a request names none.
    pub default_sport: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3001,
            default_sport: "icehockey_nhl".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key_env: String,
    /// Region whose matches define the output set and win bookmaker ties.
    pub primary_region: String,
    pub secondary_region: String,
    pub request_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.the-odds-api.com/v4".to_string(),
            api_key_env: "ODDS_API_KEY".to_string(),
            primary_region: "eu".to_string(),
            secondary_region: "se".to_string(),
            request_timeout_secs: 15,
        }
    }
}

impl ProviderConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 300 }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BookmakersConfig {
    pub allowed: Vec<String>,
    pub max_per_match: usize,
}

impl Default for BookmakersConfig {
    fn default() -> Self {
        Self {
            allowed: DEFAULT_ALLOWED_BOOKMAKERS.iter().map(|s| s.to_string()).collect(),
            max_per_match: 10,
        }
    }
}

/// Bookmakers exposed when the config file does not list any.
pub const DEFAULT_ALLOWED_BOOKMAKERS: &[&str] = &[
    "unibet_se",
    "betsson",
    "leovegas_se",
    "mrgreen_se",
    "nordicbet",
    "sport888_se",
    "svenskaspel_se",
    "atg_se",
    "betfair",
];

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Parse configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        let mut config: AppConfig = toml::from_str(contents)?;
        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse().ok()) {
            config.server.port = port;
        }
        Ok(config)
    }

    /// Resolve an environment variable name to its value.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }

    /// Resolve the provider API credential. Empty values are rejected.
    pub fn api_key(&self) -> Result<SecretString> {
        let key = Self::resolve_env(&self.provider.api_key_env)?;
        if key.trim().is_empty() {
            anyhow::bail!("{} is set but empty", self.provider.api_key_env);
        }
        Ok(SecretString::new(key.trim().to_string()))
    }
}
