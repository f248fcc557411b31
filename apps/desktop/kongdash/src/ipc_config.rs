//! Renderer handoff: where the UI finds the IPC server.
//!
//! The host writes `{config_dir}/ipc-session.json` after the server is bound
//! and removes it on shutdown. The file holds the session token, so on Unix
//! it is created readable by the owner only.

use crate::error::KongdashError;

use common::ErrorLocation;

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::panic::Location;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const HANDOFF_FILE_NAME: &str = "ipc-session.json";

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpcConfig {
    port: u16,
    auth_token: String,
}

impl std::fmt::Debug for IpcConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IpcConfig")
            .field("port", &self.port)
            .field("auth_token", &"[REDACTED]")
            .finish()
    }
}

impl IpcConfig {
    pub fn new(port: u16, auth_token: String) -> Self {
        Self { port, auth_token }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }

    pub fn handoff_path(config_dir: &Path) -> PathBuf {
        config_dir.join(HANDOFF_FILE_NAME)
    }

    /// Write the handoff file into `config_dir`, creating the directory.
    ///
    /// # Errors
    ///
    /// Returns [`KongdashError::Handoff`] if the directory or file cannot be
    /// written.
    pub fn write_handoff(&self, config_dir: &Path) -> Result<PathBuf, KongdashError> {
        fs::create_dir_all(config_dir).map_err(|e| KongdashError::Handoff {
            message: format!("Failed to create {}: {e}", config_dir.display()),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let path = Self::handoff_path(config_dir);
        let json = serde_json::to_string_pretty(self).map_err(|e| KongdashError::Handoff {
            message: format!("Failed to encode handoff: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        write_private(&path, json.as_bytes()).map_err(|e| KongdashError::Handoff {
            message: format!("Failed to write {}: {e}", path.display()),
            location: ErrorLocation::here(),
        })?;

        Ok(path)
    }

    /// Read the handoff file a running host left in `config_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`KongdashError::Handoff`] if no host is running (no file) or
    /// the file is not a valid handoff record.
    pub fn read_handoff(config_dir: &Path) -> Result<Self, KongdashError> {
        let path = Self::handoff_path(config_dir);
        let contents = fs::read_to_string(&path).map_err(|e| KongdashError::Handoff {
            message: format!("Failed to read {}: {e}", path.display()),
            location: ErrorLocation::from(Location::caller()),
        })?;

        serde_json::from_str(&contents).map_err(|e| KongdashError::Handoff {
            message: format!("Invalid handoff file {}: {e}", path.display()),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Remove the handoff file. A file that is already gone is not an error.
    pub fn remove_handoff(config_dir: &Path) -> Result<(), KongdashError> {
        let path = Self::handoff_path(config_dir);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(KongdashError::Handoff {
                message: format!("Failed to remove {}: {e}", path.display()),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}

/// Write `contents` to `path`, readable by the owner only on Unix.
///
/// The file is created with mode 0600 so the token is never exposed, and an
/// existing file left by an earlier run is narrowed before it is rewritten.
fn write_private(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
        options.mode(0o600);
        if path.exists() {
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }
    }

    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}
