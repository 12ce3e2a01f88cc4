use std::path::PathBuf;

use eyre::Result;
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub default_lang: Option<String>,
    pub default_format: Option<String>,
    pub temp_dir: Option<PathBuf>,
}

impl Config {
    /// Load config from ~/.config/ytcap/config.toml if it exists
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }

    /// Flag value, then config value, then `fallback`
    pub fn resolve_lang(&self, flag: Option<&str>, fallback: &str) -> String {
        flag.or(self.default_lang.as_deref()).unwrap_or(fallback).to_string()
    }

    /// Flag value, then config value, then `system` (the process temp dir)
    pub fn resolve_temp_dir(&self, flag: Option<PathBuf>, system: PathBuf) -> PathBuf {
        flag.or_else(|| self.temp_dir.clone()).unwrap_or(system)
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytcap")
        .join("config.toml")
}
