//! Config state management using actor pattern.
//!
//! Holds the host's in-memory copy of the connection config and serializes
//! every write through one task:
//!
//! - Commands sent via mpsc channel
//! - Dedicated task processes commands sequentially
//! - Reads use Arc<RwLock<T>> and never wait on a write in progress
//!
//! A write round trip goes `Idle -> WriteRequested -> {WriteSucceeded |
//! WriteFailed} -> Idle`, and always ends with exactly one acknowledgement
//! sent back to the renderer that asked.

use crate::config::ConfigPersistence;
use crate::error::ipc::IpcError;

use common::ErrorLocation;
use models::{ConnectionConfig, EventFrame, PushEvent, ResponseEvent, ServerFrame};

use std::panic::Location;
use std::sync::Arc;

use log::{error, info, warn};
use tokio::sync::{Mutex, RwLock, broadcast, mpsc};

/// Commands that mutate config state.
#[derive(Debug, Clone)]
pub enum ConfigCommand {
    /// Persist a new config, then acknowledge on `reply_to`.
    WriteConfig {
        config: ConnectionConfig,
        reply_to: mpsc::UnboundedSender<ServerFrame>,
    },
}

/// Config state manager for the host.
///
/// This type is `Clone`; all clones share the same config and actor.
#[derive(Clone)]
pub struct ConfigState {
    /// Channel to send config mutation commands
    command_tx: Arc<Mutex<Option<mpsc::Sender<ConfigCommand>>>>,

    /// Current config, as last loaded or successfully saved
    config: Arc<RwLock<ConnectionConfig>>,

    persistence: Arc<dyn ConfigPersistence>,

    /// Where `config-updated` notifications go after a successful save
    push_tx: broadcast::Sender<EventFrame>,

    /// Track if actor initialized
    actor_init: Arc<Mutex<bool>>,
}

impl ConfigState {
    pub fn new(
        persistence: Arc<dyn ConfigPersistence>,
        initial: ConnectionConfig,
        push_tx: broadcast::Sender<EventFrame>,
    ) -> Self {
        Self {
            command_tx: Arc::new(Mutex::new(None)),
            config: Arc::new(RwLock::new(initial)),
            persistence,
            push_tx,
            actor_init: Arc::new(Mutex::new(false)),
        }
    }

    /// Send config update command.
    ///
    /// Spawns actor on first call (lazy initialization).
    ///
    /// # Errors
    ///
    /// Returns [`IpcError::Io`] if the config actor has died.
    pub async fn update(&self, cmd: ConfigCommand) -> Result<(), IpcError> {
        self.ensure_actor().await;

        let tx_guard = self.command_tx.lock().await;
        let tx = tx_guard.as_ref().ok_or_else(|| IpcError::Io {
            message: "Config actor not initialized".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        tx.send(cmd).await.map_err(|e| IpcError::Io {
            message: format!("Config actor died: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Current config (read-only).
    pub async fn get_config(&self) -> ConnectionConfig {
        self.config.read().await.clone()
    }

    /// Ensure actor is spawned (lazy init).
    async fn ensure_actor(&self) {
        let mut init_guard = self.actor_init.lock().await;
        if !*init_guard {
            let (tx, rx) = mpsc::channel(100);

            // Store tx BEFORE spawning
            let mut tx_guard = self.command_tx.lock().await;
            *tx_guard = Some(tx);
            drop(tx_guard);

            tokio::spawn(config_actor(
                rx,
                Arc::clone(&self.config),
                Arc::clone(&self.persistence),
                self.push_tx.clone(),
            ));

            *init_guard = true;
            info!("Config state actor spawned");
        }
    }
}

/// Config actor task.
///
/// Processes write commands one at a time. Memory is only updated after the
/// record is on disk, so a failed save leaves the served config unchanged.
async fn config_actor(
    mut command_rx: mpsc::Receiver<ConfigCommand>,
    config: Arc<RwLock<ConnectionConfig>>,
    persistence: Arc<dyn ConfigPersistence>,
    push_tx: broadcast::Sender<EventFrame>,
) {
    info!("Config state actor started");

    while let Some(cmd) = command_rx.recv().await {
        match cmd {
            ConfigCommand::WriteConfig {
                config: new_config,
                reply_to,
            } => {
                let (ack, pushed) = match persistence.save(&new_config) {
                    Ok(()) => {
                        *config.write().await = new_config.clone();
                        info!("Connection config updated (host: {:?})", new_config.host);
                        (
                            ResponseEvent::WriteConfigSuccess,
                            Some(PushEvent::ConfigUpdated(new_config)),
                        )
                    }
                    Err(e) => {
                        error!("Config write failed, keeping previous config: {e}");
                        (
                            ResponseEvent::WriteConfigError {
                                message: e.user_message(),
                            },
                            None,
                        )
                    }
                };

                if reply_to.send(ServerFrame::Event(ack.into())).is_err() {
                    warn!("Renderer disconnected before its config write was acknowledged");
                }

                if let Some(event) = pushed {
                    // No subscribers just means no renderer is connected.
                    let _ = push_tx.send(event.into());
                }
            }
        }
    }

    warn!("Config state actor stopped - this should not happen during normal operation");
}
