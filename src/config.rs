use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::gemini::DEFAULT_GEMINI_URL;
use crate::variant::Variant;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// On-disk configuration. Every field is optional; missing ones fall back to
/// the built-in defaults.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub backend_url: Option<String>,
    pub variant: Option<String>,
    pub context: Option<String>,
    pub gemini_url: Option<String>,
    pub gemini_api_key: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from the user config directory, or defaults if there is no file
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_json::from_str(&config_content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("uet-chat").join("config.json"))
    }
}

/// Values that beat the config file: command-line flags and environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub backend_url: Option<String>,
    pub variant: Option<Variant>,
    pub gemini_api_key: Option<String>,
}

/// Configuration resolved once at startup and handed to the chat client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub backend_url: String,
    pub variant: Variant,
    pub context: String,
    pub gemini_url: String,
    pub gemini_api_key: Option<String>,
    pub request_timeout: Option<Duration>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            variant: Variant::default(),
            context: String::new(),
            gemini_url: DEFAULT_GEMINI_URL.to_string(),
            gemini_api_key: None,
            request_timeout: None,
        }
    }
}

impl Settings {
    pub fn resolve(config: Config, overrides: Overrides) -> Result<Self> {
        let defaults = Settings::default();

        let file_variant = match config.variant.as_deref() {
            Some(name) => Some(
                Variant::from_str(name).ok_or_else(|| anyhow!("Unknown variant in config: {}", name))?,
            ),
            None => None,
        };

        Ok(Self {
            backend_url: overrides
                .backend_url
                .or(config.backend_url)
                .unwrap_or(defaults.backend_url),
            variant: overrides.variant.or(file_variant).unwrap_or(defaults.variant),
            context: config.context.unwrap_or(defaults.context),
            gemini_url: config.gemini_url.unwrap_or(defaults.gemini_url),
            gemini_api_key: overrides
                .gemini_api_key
                .filter(|k| !k.trim().is_empty())
                .or(config.gemini_api_key)
                .filter(|k| !k.trim().is_empty()),
            request_timeout: config.request_timeout_secs.map(Duration::from_secs),
        })
    }
}
