//! Persisted application settings.
//!
//! Settings live in a TOML file under the app directory. Every field carries
//! a serde default so configs written by older builds keep loading.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app_dirs;

/// Default filename used to store the app configuration.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Backend cluster counts are clamped to this range on both ends.
pub const CLUSTER_COUNT_RANGE: std::ops::RangeInclusive<u32> = 1..=10;

/// App settings persisted to the TOML config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the unbiasing backend, including the `/api` prefix.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Milliseconds between job status polls.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Cluster count preselected in the upload dialog.
    #[serde(default = "default_cluster_count")]
    pub default_cluster_count: u32,
    /// Ping the backend health endpoint when the app starts.
    #[serde(default = "default_true")]
    pub health_check_on_startup: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            poll_interval_ms: default_poll_interval_ms(),
            default_cluster_count: default_cluster_count(),
            health_check_on_startup: default_true(),
        }
    }
}

fn default_api_base_url() -> String {
    "http://localhost:3002/api".to_string()
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_cluster_count() -> u32 {
    6
}

fn default_true() -> bool {
    true
}

/// Errors raised while loading or saving the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Could not create the directory that holds the config file.
    #[error("Unable to create config directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Could not read the config file.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Could not write the config file.
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The config file exists but does not parse as TOML.
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// The settings could not be serialized to TOML.
    #[error("Failed to serialize config to TOML at {path}: {source}")]
    SerializeToml {
        path: PathBuf,
        source: toml::ser::Error,
    },
    /// No usable config directory on this platform.
    #[error("No suitable config directory found")]
    NoConfigDir,
}

/// Path of the config file inside the app directory.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let dirs = app_dirs::resolve().map_err(map_app_dir_error)?;
    Ok(dirs.root.join(CONFIG_FILE_NAME))
}

/// Load settings from disk, materializing the defaults on first run.
pub fn load_or_default() -> Result<AppConfig, ConfigError> {
    load_or_init(&config_path()?)
}

/// Load settings from `path`. When no file exists yet the defaults are
/// written there, so users always have a file to edit.
pub fn load_or_init(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        let config = AppConfig::default();
        save_to_path(&config, path)?;
        return Ok(config);
    }
    load_from_path(path)
}

/// Load settings from an explicit path.
pub fn load_from_path(path: &Path) -> Result<AppConfig, ConfigError> {
    let bytes = std::fs::read(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8_lossy(&bytes);
    toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

/// Persist settings to an explicit path.
pub fn save_to_path(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let text = toml::to_string_pretty(config).map_err(|source| ConfigError::SerializeToml {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, text).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Clamp a cluster count to the range the backend accepts.
pub fn clamp_cluster_count(count: u32) -> u32 {
    count.clamp(*CLUSTER_COUNT_RANGE.start(), *CLUSTER_COUNT_RANGE.end())
}

fn map_app_dir_error(error: app_dirs::AppDirError) -> ConfigError {
    match error {
        app_dirs::AppDirError::NoBaseDir => ConfigError::NoConfigDir,
        app_dirs::AppDirError::CreateDir { path, source } => {
            ConfigError::CreateDir { path, source }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrips_through_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = AppConfig {
            api_base_url: "http://127.0.0.1:9000/api".into(),
            poll_interval_ms: 500,
            default_cluster_count: 4,
            health_check_on_startup: false,
        };
        save_to_path(&config, &path).unwrap();
        let loaded = load_from_path(&path).unwrap();
        assert_eq!(loaded.api_base_url, config.api_base_url);
        assert_eq!(loaded.poll_interval_ms, 500);
        assert_eq!(loaded.default_cluster_count, 4);
        assert!(!loaded.health_check_on_startup);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "poll_interval_ms = 750\n").unwrap();
        let loaded = load_from_path(&path).unwrap();
        assert_eq!(loaded.poll_interval_ms, 750);
        assert_eq!(loaded.api_base_url, "http://localhost:3002/api");
        assert_eq!(loaded.default_cluster_count, 6);
        assert!(loaded.health_check_on_startup);
    }

    #[test]
    fn first_load_writes_the_default_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = load_or_init(&path).unwrap();
        assert_eq!(config.poll_interval_ms, 2000);
        assert!(path.is_file());
        // A second load reads the materialized file back.
        let reloaded = load_or_init(&path).unwrap();
        assert_eq!(reloaded.api_base_url, config.api_base_url);
    }

    #[test]
    fn cluster_count_is_clamped_to_backend_range() {
        assert_eq!(clamp_cluster_count(0), 1);
        assert_eq!(clamp_cluster_count(6), 6);
        assert_eq!(clamp_cluster_count(99), 10);
    }
}
