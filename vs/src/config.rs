//! Configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::persistence::DEFAULT_SAVE_INTERVAL;
use crate::store::StoreOptions;

/// Main vidstore configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// State file location and persistence tunables
    pub store: StoreSettings,

    /// Retry policy defaults
    pub retry: RetrySettings,

    /// Retention cleanup defaults
    pub cleanup: CleanupSettings,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .vidstore.yml
        let local_config = PathBuf::from(".vidstore.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/vidstore/vidstore.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("vidstore").join("vidstore.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// State file location and persistence tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Path to the snapshot file
    #[serde(rename = "state-file")]
    pub state_file: PathBuf,

    /// Keep the previous snapshot as `<state-file>.backup`
    #[serde(rename = "backup-state")]
    pub backup_state: bool,

    /// Mutations between physical writes
    #[serde(rename = "auto-save-interval")]
    pub auto_save_interval: u32,
}

impl Default for StoreSettings {
    fn default() -> Self {
        // Use XDG data directory (~/.local/share/vidstore on Linux)
        let state_file = dirs::data_dir()
            .map(|d| d.join("vidstore"))
            .unwrap_or_else(|| PathBuf::from(".vidstore"))
            .join("video_state.json");

        Self {
            state_file,
            backup_state: true,
            auto_save_interval: DEFAULT_SAVE_INTERVAL,
        }
    }
}

impl StoreSettings {
    /// Store options for [`crate::StateStore::open_with`]
    pub fn options(&self) -> StoreOptions {
        StoreOptions {
            backup_enabled: self.backup_state,
            save_interval: self.auto_save_interval,
        }
    }
}

/// Retry policy defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Attempts per stage before a failure stops being retryable
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

/// Retention cleanup defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupSettings {
    /// Age in days after which failed records are removed
    #[serde(rename = "stale-days")]
    pub stale_days: i64,
}

impl Default for CleanupSettings {
    fn default() -> Self {
        Self { stale_days: 30 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.store.backup_state);
        assert_eq!(config.store.auto_save_interval, 10);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.cleanup.stale_days, 30);
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
store:
  state-file: /var/lib/vidstore/state.json
  backup-state: false
  auto-save-interval: 25

retry:
  max-attempts: 5

cleanup:
  stale-days: 7
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.store.state_file, PathBuf::from("/var/lib/vidstore/state.json"));
        assert!(!config.store.backup_state);
        assert_eq!(config.store.auto_save_interval, 25);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.cleanup.stale_days, 7);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
retry:
  max-attempts: 10
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        // Specified value
        assert_eq!(config.retry.max_attempts, 10);

        // Defaults for unspecified
        assert!(config.store.backup_state);
        assert_eq!(config.store.auto_save_interval, 10);
        assert_eq!(config.cleanup.stale_days, 30);
    }

    #[test]
    fn test_store_settings_into_options() {
        let settings = StoreSettings {
            backup_state: false,
            auto_save_interval: 42,
            ..Default::default()
        };
        let options = settings.options();
        assert!(!options.backup_enabled);
        assert_eq!(options.save_interval, 42);
    }
}
