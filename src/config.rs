//! Configuration management for universal-search
//!
//! Handles loading and saving the TOML configuration file.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable overriding the Everything SDK library path
pub const SDK_PATH_ENV: &str = "EVERYTHING_SDK_PATH";

/// Where the Everything SDK DLL is looked up when nothing else is configured
pub const DEFAULT_SDK_PATH: &str = r"D:\dev\tools\Everything-SDK\dll\Everything64.dll";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub everything: EverythingConfig,

    #[serde(default)]
    pub service: ServiceConfig,

    /// Path to config file (not serialized)
    #[serde(skip)]
    pub config_path: PathBuf,
}

/// Search execution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Seconds a single tool call may run before it is reported as failed
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Everything SDK configuration (Windows only)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EverythingConfig {
    /// Path to Everything64.dll; `EVERYTHING_SDK_PATH` takes precedence
    #[serde(default)]
    pub sdk_path: Option<String>,
}

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Log level (overridden by RUST_LOG)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Default location of config.toml
    pub fn default_path() -> PathBuf {
        if let Some(proj_dirs) = ProjectDirs::from("dev", "universal-search", "universal-search") {
            proj_dirs.config_dir().join("config.toml")
        } else {
            #[cfg(windows)]
            {
                let appdata = std::env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(appdata).join("UniversalSearch").join("config.toml")
            }

            #[cfg(not(windows))]
            {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".config/universal-search/config.toml")
            }
        }
    }

    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load configuration from `path`, or create a default file there if missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let mut config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.config_path = path.to_path_buf();
            Ok(config)
        } else {
            info!("Config file not found, creating default at {:?}", path);
            let config = Config {
                config_path: path.to_path_buf(),
                ..Config::default()
            };
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        fs::write(&self.config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", self.config_path))?;

        info!("Configuration saved to {:?}", self.config_path);
        Ok(())
    }

    /// Resolve the Everything SDK path: env var, then config, then default
    pub fn sdk_path(&self) -> PathBuf {
        Self::pick_sdk_path(std::env::var(SDK_PATH_ENV).ok(), self.everything.sdk_path.as_deref())
    }

    fn pick_sdk_path(env: Option<String>, configured: Option<&str>) -> PathBuf {
        env.filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .or_else(|| configured.map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SDK_PATH))
    }
}
