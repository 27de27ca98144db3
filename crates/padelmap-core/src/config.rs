//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the database URL, an optional directory overriding the
//! bundled listings, and the last tab shown.
//!
//! Configuration is stored at `~/.config/padelmap/config.json`. The database
//! URL and API key can also come from the environment (`PADELMAP_DATABASE_URL`,
//! `PADELMAP_DATABASE_KEY`), which wins over the file and the keychain.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::DirectoryClient;
use crate::credentials::CredentialStore;

/// Application name used for config/log directory paths
const APP_NAME: &str = "padelmap";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const DATABASE_URL_ENV: &str = "PADELMAP_DATABASE_URL";
pub const DATABASE_KEY_ENV: &str = "PADELMAP_DATABASE_KEY";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub database_url: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub last_tab: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Location of the config file under the user's config directory.
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for the application log file
    pub fn log_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Database URL from the environment, else from the config file.
    pub fn database_url(&self) -> Option<String> {
        first_non_empty(std::env::var(DATABASE_URL_ENV).ok(), self.database_url.as_deref())
    }

    /// API key from the environment, else from the OS keychain.
    pub fn api_key(&self, database_url: &str) -> Option<String> {
        let stored = match CredentialStore::get_key(database_url) {
            Ok(key) => Some(key),
            Err(e) => {
                debug!(error = %e, "No API key in keychain");
                None
            }
        };
        first_non_empty(std::env::var(DATABASE_KEY_ENV).ok(), stored.as_deref())
    }

    /// Build a database client, or `None` when no endpoint is configured.
    ///
    /// A missing API key is not an error: the request goes out unauthenticated
    /// and the database decides.
    pub fn directory_client(&self) -> Result<Option<DirectoryClient>> {
        let Some(url) = self.database_url() else {
            return Ok(None);
        };
        let key = self.api_key(&url).unwrap_or_default();
        Ok(Some(DirectoryClient::new(&url, key)?))
    }
}

fn first_non_empty(preferred: Option<String>, fallback: Option<&str>) -> Option<String> {
    preferred
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| fallback.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_non_empty_prefers_environment() {
        assert_eq!(
            first_non_empty(Some("https://env".into()), Some("https://file")),
            Some("https://env".to_string())
        );
        assert_eq!(
            first_non_empty(Some("   ".into()), Some("https://file")),
            Some("https://file".to_string())
        );
        assert_eq!(first_non_empty(None, Some("")), None);
        assert_eq!(first_non_empty(None, None), None);
    }

    #[test]
    fn test_missing_file_gives_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            database_url: Some("https://db.example.com".to_string()),
            data_dir: Some(PathBuf::from("/srv/padel")),
            last_tab: Some("communities".to_string()),
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_old_config_without_fields_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"database_url": "https://db.example.com"}"#).unwrap();
        let config = Config::load_from(&path).unwrap();
        assert!(config.data_dir.is_none());
        assert!(config.last_tab.is_none());
    }
}
