//! On-disk persistence of the connection config.
//!
//! The host keeps exactly one record, `{config_dir}/config.json`, read once at
//! startup and replaced as a whole on every save.

use crate::error::config::ConfigError;

use common::ErrorLocation;
use models::ConnectionConfig;

use std::panic::Location;
use std::path::{Path, PathBuf};

use log::{info, warn};

const CONFIG_FILE_NAME: &str = "config.json";

/// Storage seam for the host's config actor.
///
/// [`ConfigStore`] is the file-backed implementation; tests substitute
/// stores that fail on purpose.
pub trait ConfigPersistence: Send + Sync + 'static {
    /// Read the stored record; `Ok(default)` when nothing was ever saved.
    fn load(&self) -> Result<ConnectionConfig, ConfigError>;

    /// Replace the stored record.
    fn save(&self, config: &ConnectionConfig) -> Result<(), ConfigError>;

    /// Like [`ConfigPersistence::load`], but any failure yields the default
    /// record so startup never fails on a bad file.
    fn load_or_default(&self) -> ConnectionConfig {
        self.load().unwrap_or_else(|e| {
            warn!("Using empty connection config: {e}");
            ConnectionConfig::default()
        })
    }
}

/// File-backed config storage.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_dir: PathBuf,
}

impl ConfigStore {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Full path of the config file.
    pub fn path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }
}

impl ConfigPersistence for ConfigStore {
    /// Load `{config_dir}/config.json`.
    ///
    /// # Returns
    ///
    /// Returns the default config if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] or [`ConfigError::ParseError`] if the
    /// file exists but cannot be read or is not a valid record (for example a
    /// write cut short by a crash).
    fn load(&self) -> Result<ConnectionConfig, ConfigError> {
        let config_path = self.path();

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(ConnectionConfig::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).map_err(|e| ConfigError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                source: e,
            })?;

        let config: ConnectionConfig =
            serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                reason: e.to_string(),
            })?;

        info!(
            "Config loaded from {} (host: {:?}, username: {:?})",
            config_path.display(),
            config.host,
            config.username
        );
        Ok(config)
    }

    /// Save to `{config_dir}/config.json` via a temp file and rename.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if validation, directory creation,
    /// serialization, the write or the rename fails.
    fn save(&self, config: &ConnectionConfig) -> Result<(), ConfigError> {
        config.validate()?;

        std::fs::create_dir_all(&self.config_dir).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: self.config_dir.clone(),
            source: e,
        })?;

        let config_path = self.path();
        let temp_path = self.config_dir.join(format!("{CONFIG_FILE_NAME}.tmp"));

        let json = serde_json::to_string_pretty(config).map_err(|e| ConfigError::SerializeError {
            location: ErrorLocation::from(Location::caller()),
            reason: e.to_string(),
        })?;

        std::fs::write(&temp_path, json).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, &config_path).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_path.clone(),
            source: e,
        })?;

        info!("Config saved to {}", config_path.display());
        Ok(())
    }
}
