//! Host process settings.
//!
//! Read from the environment once at startup, after an optional `.env` file
//! has been loaded. Every value has a default, so a plain launch needs no
//! configuration at all.
//!
//! | Variable              | Default                          |
//! |-----------------------|----------------------------------|
//! | `KONGDASH_IPC_PORT`   | `19876`                          |
//! | `KONGDASH_CONFIG_DIR` | `<platform config dir>/kongdash` |
//! | `KONGDASH_LOG_DIR`    | `<config dir>/logs`              |

use crate::error::KongdashError;

use bridge_core::DEFAULT_IPC_PORT;
use common::ErrorLocation;

use std::env;
use std::panic::Location;
use std::path::{Path, PathBuf};

pub const IPC_PORT_VAR: &str = "KONGDASH_IPC_PORT";
pub const CONFIG_DIR_VAR: &str = "KONGDASH_CONFIG_DIR";
pub const LOG_DIR_VAR: &str = "KONGDASH_LOG_DIR";

const APP_DIR_NAME: &str = "kongdash";
const LOG_DIR_NAME: &str = "logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSettings {
    ipc_port: u16,
    config_dir: PathBuf,
    log_dir: PathBuf,
    dotenv_path: Option<PathBuf>,
}

impl HostSettings {
    pub fn new(ipc_port: u16, config_dir: impl Into<PathBuf>, log_dir: impl Into<PathBuf>) -> Self {
        Self {
            ipc_port,
            config_dir: config_dir.into(),
            log_dir: log_dir.into(),
            dotenv_path: None,
        }
    }

    /// Load `.env` (if any), then read settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`KongdashError::Settings`] if a variable is set to an invalid
    /// value or no config directory can be determined.
    pub fn from_env() -> Result<Self, KongdashError> {
        let dotenv_path = try_load_dotenv();
        let mut settings = Self::from_lookup(|key| env::var(key).ok())?;
        settings.dotenv_path = dotenv_path;
        Ok(settings)
    }

    /// Read settings through `lookup` instead of the process environment.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, KongdashError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let ipc_port = match read(IPC_PORT_VAR) {
            Some(raw) => parse_port(&raw)?,
            None => DEFAULT_IPC_PORT,
        };

        let config_dir = match read(CONFIG_DIR_VAR) {
            Some(raw) => PathBuf::from(raw),
            None => default_config_dir()?,
        };

        let log_dir = match read(LOG_DIR_VAR) {
            Some(raw) => PathBuf::from(raw),
            None => config_dir.join(LOG_DIR_NAME),
        };

        Ok(Self::new(ipc_port, config_dir, log_dir))
    }

    pub fn ipc_port(&self) -> u16 {
        self.ipc_port
    }

    /// Directory holding `config.json` and the renderer handoff file.
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// The `.env` file that was loaded, if one was found.
    pub fn dotenv_path(&self) -> Option<&Path> {
        self.dotenv_path.as_deref()
    }
}

#[track_caller]
fn parse_port(raw: &str) -> Result<u16, KongdashError> {
    raw.trim().parse::<u16>().map_err(|e| KongdashError::Settings {
        message: format!("{IPC_PORT_VAR} must be a port number, got {raw:?}: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })
}

#[track_caller]
fn default_config_dir() -> Result<PathBuf, KongdashError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or_else(|| KongdashError::Settings {
            message: format!("Cannot determine a config directory; set {CONFIG_DIR_VAR}"),
            location: ErrorLocation::from(Location::caller()),
        })
}

/// Load `.env` from the working directory, else from next to the executable.
///
/// Runs before the logger exists, so the result is returned for logging later.
fn try_load_dotenv() -> Option<PathBuf> {
    if let Ok(path) = dotenvy::dotenv() {
        return Some(path);
    }

    let exe_dir = env::current_exe().ok()?.parent()?.to_path_buf();
    let env_path = exe_dir.join(".env");
    if env_path.exists() && dotenvy::from_path(&env_path).is_ok() {
        return Some(env_path);
    }

    None
}
