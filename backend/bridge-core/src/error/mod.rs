pub mod bridge;
pub mod config;
pub mod ipc;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Ipc(#[from] ipc::IpcError),

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Bridge(#[from] bridge::BridgeError),
}
