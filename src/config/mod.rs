use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::DEFAULT_SLOT;
use crate::providers::pexels::DEFAULT_BASE_URL;

pub const API_KEY_ENV: &str = "PEXELS_API_KEY";
const CONFIG_FILE: &str = "vidshelf.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    pub page_size: u32,
    pub default_query: String,
    /// Directory holding the saved-library slot.
    pub data_dir: PathBuf,
    pub slot: String,
    /// HTTP timeout in seconds.
    pub timeout: u64,
    pub retries: u32,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: 80,
            default_query: "nature".to_string(),
            data_dir: default_data_dir(),
            slot: DEFAULT_SLOT.to_string(),
            timeout: 30,
            retries: 3,
            user_agent: format!("vidshelf/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("vidshelf"))
        .unwrap_or_else(|| PathBuf::from(".vidshelf"))
}

impl Config {
    /// Load from `explicit`, or the first config file found, or defaults. The
    /// `PEXELS_API_KEY` environment variable wins over any file.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match find_config_file(explicit) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                config.api_key = Some(key.trim().to_string());
            }
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Explicit path, then `./vidshelf.toml`, then `<config dir>/vidshelf/config.toml`.
pub fn find_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_owned());
    }
    let cwd_config = PathBuf::from(CONFIG_FILE);
    if cwd_config.exists() {
        return Some(cwd_config);
    }
    dirs::config_dir()
        .map(|dir| dir.join("vidshelf").join("config.toml"))
        .filter(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml("page_size = 15\ndefault_query = \"city\"\n").unwrap();
        assert_eq!(config.page_size, 15);
        assert_eq!(config.default_query, "city");
        assert_eq!(config.slot, "videos");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(Config::from_toml("page_size = \"many\"").is_err());
    }
}
