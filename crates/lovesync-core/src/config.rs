//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! the API base URL, where the credential token is persisted, how a failed
//! profile fetch treats the session, and the last used username.
//!
//! Configuration is stored at `~/.config/lovesync/config.json`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::auth::{FetchFailurePolicy, FileTokenStorage, KeyringTokenStorage, MemoryTokenStorage, TokenStorage};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "lovesync";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// API base URL of a local development backend
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000/api/";

/// Where the credential token is persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenStorageKind {
    /// Plain file in the cache directory
    #[default]
    File,
    /// OS keychain
    Keyring,
    /// Not persisted at all
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub token_storage: TokenStorageKind,
    pub fetch_failure: FetchFailurePolicy,
    pub last_username: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Load from an explicit path; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path).context("Failed to read config file")?;
            serde_json::from_str(&contents).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents).context("Failed to write config file")?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn api_base_url(&self) -> &str {
        self.api_base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(DEFAULT_API_BASE_URL)
    }

    /// Build the configured token storage. File storage lives in `cache_dir`.
    pub fn token_storage_in(&self, cache_dir: &Path) -> Box<dyn TokenStorage> {
        match self.token_storage {
            TokenStorageKind::File => Box::new(FileTokenStorage::new(cache_dir)),
            TokenStorageKind::Keyring => Box::new(KeyringTokenStorage::new()),
            TokenStorageKind::Memory => Box::new(MemoryTokenStorage::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();

        assert_eq!(config.api_base_url(), DEFAULT_API_BASE_URL);
        assert_eq!(config.token_storage, TokenStorageKind::File);
        assert_eq!(config.fetch_failure, FetchFailurePolicy::Logout);
        assert!(config.last_username.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lovesync").join("config.json");

        let config = Config {
            api_base_url: Some("https://lovesync.example/api/".to_string()),
            token_storage: TokenStorageKind::Keyring,
            fetch_failure: FetchFailurePolicy::LogoutOnRejection,
            last_username: Some("mia".to_string()),
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api_base_url(), "https://lovesync.example/api/");
        assert_eq!(loaded.token_storage, TokenStorageKind::Keyring);
        assert_eq!(loaded.fetch_failure, FetchFailurePolicy::LogoutOnRejection);
        assert_eq!(loaded.last_username.as_deref(), Some("mia"));
    }

    #[test]
    fn test_partial_file_uses_defaults_for_missing_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"fetch_failure": "logout_on_rejection"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.fetch_failure, FetchFailurePolicy::LogoutOnRejection);
        assert_eq!(config.token_storage, TokenStorageKind::File);
    }

    #[test]
    fn test_blank_base_url_falls_back() {
        let config = Config {
            api_base_url: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(config.api_base_url(), DEFAULT_API_BASE_URL);
    }

    #[test]
    fn test_file_token_storage_in_cache_dir() {
        let dir = TempDir::new().unwrap();
        let config = Config::default();
        let mut storage = config.token_storage_in(dir.path());

        storage.store("abc").unwrap();
        assert_eq!(std::fs::read_to_string(dir.path().join("token")).unwrap(), "abc");
    }
}
