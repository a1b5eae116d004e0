use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

use crate::api::client::DEFAULT_BASE_URL;
use crate::mode::ChatMode;
use crate::quiz::Difficulty;

pub const BASE_URL_ENV: &str = "EDUCHAT_BASE_URL";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub base_url: Option<String>,
    pub chat_mode: Option<String>,
    pub default_difficulty: Option<String>,
    pub default_num_questions: Option<u32>,
    /// Location to start from; its `selected_docs` seeds the selection.
    pub start_url: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            base_url: Some(DEFAULT_BASE_URL.to_string()),
            chat_mode: Some(ChatMode::Standard.as_str().to_string()),
            ..Self::default()
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, config_content)?;
        Ok(())
    }

    pub fn save_chat_mode(mode: ChatMode) -> Result<()> {
        let mut config = Self::load().unwrap_or_else(|_| Self::new());
        config.chat_mode = Some(mode.as_str().to_string());
        config.save()
    }

    /// Environment variable first, then the config file, then the default.
    pub fn resolved_base_url(&self) -> String {
        std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| self.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    pub fn resolved_chat_mode(&self) -> ChatMode {
        self.chat_mode
            .as_deref()
            .and_then(ChatMode::from_str)
            .unwrap_or_default()
    }

    pub fn resolved_difficulty(&self) -> Difficulty {
        self.default_difficulty
            .as_deref()
            .and_then(Difficulty::from_str)
            .unwrap_or_default()
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("educhat").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::new());
        assert_eq!(config.resolved_chat_mode(), ChatMode::Standard);
        assert_eq!(config.resolved_difficulty(), Difficulty::Medium);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            base_url: Some("http://school.example:9000".to_string()),
            chat_mode: Some("eli5".to_string()),
            default_difficulty: Some("hard".to_string()),
            default_num_questions: Some(8),
            start_url: None,
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.resolved_chat_mode(), ChatMode::Eli5);
        assert_eq!(loaded.resolved_difficulty(), Difficulty::Hard);
    }

    #[test]
    fn test_unknown_values_fall_back() {
        let config = Config {
            chat_mode: Some("pirate".to_string()),
            default_difficulty: Some("brutal".to_string()),
            ..Config::default()
        };
        assert_eq!(config.resolved_chat_mode(), ChatMode::Standard);
        assert_eq!(config.resolved_difficulty(), Difficulty::Medium);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
