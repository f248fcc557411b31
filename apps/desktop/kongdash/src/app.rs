//! Host startup and shutdown.
//!
//! Wires the config store, the host handlers, the IPC server and the
//! renderer handoff file together.

use crate::error::KongdashError;
use crate::ipc_config::IpcConfig;
use crate::settings::HostSettings;

use bridge_core::HostHandlers;
use bridge_core::config::ConfigStore;
use bridge_core::error::CoreError;
use bridge_core::ipc::{IpcServerHandle, start_ipc_server};

use std::path::{Path, PathBuf};

use log::{info, warn};

/// A host that is serving renderers.
pub struct RunningHost {
    handlers: HostHandlers,
    server: IpcServerHandle,
    config_dir: PathBuf,
    handoff_path: PathBuf,
}

/// Load the stored config, start the IPC server and publish the handoff.
///
/// # Errors
///
/// - [`KongdashError::Core`] - the IPC port cannot be bound
/// - [`KongdashError::Handoff`] - the handoff file cannot be written
pub async fn start_host(settings: &HostSettings) -> Result<RunningHost, KongdashError> {
    let store = ConfigStore::new(settings.config_dir());
    info!("Config file: {}", store.path().display());

    let handlers = HostHandlers::new(store);

    info!("Starting IPC server on port {}", settings.ipc_port());
    let server = start_ipc_server(settings.ipc_port(), None, handlers.clone())
        .await
        .map_err(CoreError::from)?;

    let ipc_config = IpcConfig::new(server.port(), server.auth_token().to_string());
    let handoff_path = match ipc_config.write_handoff(settings.config_dir()) {
        Ok(path) => path,
        Err(e) => {
            server.shutdown();
            return Err(e);
        }
    };
    info!("Renderer handoff written to {}", handoff_path.display());

    Ok(RunningHost {
        handlers,
        server,
        config_dir: settings.config_dir().to_path_buf(),
        handoff_path,
    })
}

impl RunningHost {
    pub fn handlers(&self) -> &HostHandlers {
        &self.handlers
    }

    pub fn port(&self) -> u16 {
        self.server.port()
    }

    pub fn handoff_path(&self) -> &Path {
        &self.handoff_path
    }

    /// Stop accepting renderers and remove the handoff file.
    pub fn shutdown(self) {
        self.server.shutdown();
        if let Err(e) = IpcConfig::remove_handoff(&self.config_dir) {
            warn!("{e}");
        }
        info!("Host stopped");
    }
}
