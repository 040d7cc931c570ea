//! Application configuration.
//!
//! The config file lives in the platform config directory
//! (`~/.config/walletlink/config.json` on Linux). It is read at startup and
//! never written by the application; a missing file yields the defaults.
//! Command-line flags override file values.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::fee::DEFAULT_GAS_LIMIT;

/// Configuration error type.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Other configuration error.
    #[error("{0}")]
    Other(String),
}

/// Theme configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeConfig {
    /// Follow terminal background.
    #[default]
    System,
    Light,
    Dark,
}

impl ThemeConfig {
    pub fn label(&self) -> &'static str {
        match self {
            ThemeConfig::System => "System",
            ThemeConfig::Light => "Light",
            ThemeConfig::Dark => "Dark",
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// JSON-RPC endpoint of the node whose unlocked accounts act as the wallet.
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    /// Balance refresh period while connected.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    /// How often the provider polls for account and chain changes.
    #[serde(default = "default_watch_interval_ms")]
    pub watch_interval_ms: u64,
    /// Receipt polling period after submitting a transaction.
    #[serde(default = "default_receipt_poll_ms")]
    pub receipt_poll_ms: u64,
    /// Gas price used when the provider cannot suggest one.
    #[serde(default = "default_fallback_gas_price_gwei")]
    pub fallback_gas_price_gwei: String,
    /// Gas limit used when estimation fails.
    #[serde(default = "default_gas_limit")]
    pub default_gas_limit: u64,
    #[serde(default)]
    pub theme: ThemeConfig,
}

fn default_rpc_url() -> String {
    "http://127.0.0.1:8545".to_string()
}

fn default_refresh_interval_secs() -> u64 {
    30
}

fn default_watch_interval_ms() -> u64 {
    2_000
}

fn default_receipt_poll_ms() -> u64 {
    1_000
}

fn default_fallback_gas_price_gwei() -> String {
    "20".to_string()
}

fn default_gas_limit() -> u64 {
    DEFAULT_GAS_LIMIT
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            refresh_interval_secs: default_refresh_interval_secs(),
            watch_interval_ms: default_watch_interval_ms(),
            receipt_poll_ms: default_receipt_poll_ms(),
            fallback_gas_price_gwei: default_fallback_gas_price_gwei(),
            default_gas_limit: default_gas_limit(),
            theme: ThemeConfig::default(),
        }
    }
}

impl AppConfig {
    /// Reject values that would stall or spin background tasks.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh_interval_secs == 0 {
            return Err(ConfigError::Other(
                "refresh_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.watch_interval_ms == 0 || self.receipt_poll_ms == 0 {
            return Err(ConfigError::Other(
                "polling intervals must be greater than zero".to_string(),
            ));
        }
        if self.rpc_url.trim().is_empty() {
            return Err(ConfigError::Other("rpc_url is empty".to_string()));
        }
        Ok(())
    }
}

// ==================== Path Utilities ====================

/// Get the config directory.
pub fn get_config_dir() -> Result<PathBuf, ConfigError> {
    ProjectDirs::from("io", "walletlink", "walletlink")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| ConfigError::Other("Could not determine config directory".to_string()))
}

/// Get the config file path.
pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    get_config_dir().map(|dir| dir.join("config.json"))
}

/// Load configuration from the default location.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&get_config_path()?)
}

/// Load configuration from a specific file.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}
