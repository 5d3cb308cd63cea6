//! Briefwire configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BriefwireConfig {
    /// Data directory holding topics.json, schedules.json, instructions.md,
    /// and the per-topic history logs. Empty = ~/.briefwire.
    #[serde(default)]
    pub data_dir: String,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub bulk: BulkConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl Default for BriefwireConfig {
    fn default() -> Self {
        Self {
            data_dir: String::new(),
            generation: GenerationConfig::default(),
            bulk: BulkConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

impl BriefwireConfig {
    /// Load config from the default path (~/.briefwire/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::error::BriefwireError::Config(format!("Failed to read config: {e}"))
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| {
            crate::error::BriefwireError::Config(format!("Failed to parse config: {e}"))
        })?;
        Ok(config)
    }

    /// Save config to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| {
            crate::error::BriefwireError::Config(format!("Failed to serialize config: {e}"))
        })?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the Briefwire home directory (~/.briefwire).
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".briefwire")
    }

    /// Resolve the data directory, falling back to the home directory.
    pub fn resolve_data_dir(&self) -> PathBuf {
        if self.data_dir.is_empty() {
            Self::home_dir()
        } else {
            PathBuf::from(&self.data_dir)
        }
    }

    /// Path of the topic set input.
    pub fn topics_path(&self) -> PathBuf {
        self.resolve_data_dir().join("topics.json")
    }

    /// Path of the rule set input.
    pub fn schedules_path(&self) -> PathBuf {
        self.resolve_data_dir().join("schedules.json")
    }

    /// Path of the shared instructions input.
    pub fn instructions_path(&self) -> PathBuf {
        self.resolve_data_dir().join("instructions.md")
    }

    /// Directory of the per-topic history logs.
    pub fn history_dir(&self) -> PathBuf {
        self.resolve_data_dir().join("history")
    }
}

/// Generation backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Backend base URL. Empty = offline; every generation resolves to
    /// placeholder content.
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_provider() -> String { "openai-compatible".into() }
fn default_model() -> String { "gpt-4o-mini".into() }
fn default_temperature() -> f32 { 0.7 }
fn default_max_tokens() -> u32 { 4000 }

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            endpoint: String::new(),
            api_key: String::new(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Batched generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Topics per bulk request. 0 = all scoped topics in one request.
    #[serde(default)]
    pub max_batch_size: usize,
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_batch_size: 0,
        }
    }
}

/// Gateway (HTTP trigger surface) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Shared secret for the trigger endpoint. Empty = no check.
    #[serde(default)]
    pub trigger_secret: String,
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 3000 }

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            trigger_secret: String::new(),
        }
    }
}
