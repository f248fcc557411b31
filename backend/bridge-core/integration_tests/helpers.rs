//! Test helpers for IPC integration tests.
//!
//! - Starting a host server on an OS-assigned port
//! - Raw WebSocket access for protocol-level checks
//! - Stores that fail on purpose

use bridge_core::HostHandlers;
use bridge_core::config::{ConfigPersistence, ConfigStore};
use bridge_core::error::config::ConfigError;
use bridge_core::ipc::{IpcServerHandle, start_ipc_server};

use common::ErrorLocation;
use models::{ClientFrame, ConnectionConfig, ServerFrame};

use std::panic::Location;
use std::path::PathBuf;

use futures_util::{SinkExt, StreamExt};
use tempfile::TempDir;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

pub type TestSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub const TEST_AUTH_TOKEN: &str = "test-token-12345";

/// Host server over a config store in a fresh temp dir.
///
/// Keep the returned `TempDir` alive for the duration of the test.
pub async fn start_test_host() -> (IpcServerHandle, HostHandlers, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let host = HostHandlers::new(ConfigStore::new(dir.path()));
    let handle = start_ipc_server(0, Some(String::from(TEST_AUTH_TOKEN)), host.clone())
        .await
        .expect("Failed to start IPC server");
    (handle, host, dir)
}

/// Host server whose store always fails with `message`.
pub async fn start_failing_host(message: &'static str) -> (IpcServerHandle, HostHandlers) {
    let host = HostHandlers::with_config(FailingStore { message }, ConnectionConfig::default());
    let handle = start_ipc_server(0, Some(String::from(TEST_AUTH_TOKEN)), host.clone())
        .await
        .expect("Failed to start IPC server");
    (handle, host)
}

pub async fn connect_to_server(ipc_port: u16) -> TestSocket {
    let url = format!("ws://127.0.0.1:{ipc_port}");
    let (ws_stream, _) = connect_async(&url)
        .await
        .expect("Failed to connect to WebSocket server");
    ws_stream
}

pub async fn send_client_frame(ws: &mut TestSocket, frame: &ClientFrame) {
    let json = serde_json::to_string(frame).expect("Failed to encode frame");
    ws.send(Message::Text(json.into()))
        .await
        .expect("Failed to send message");
}

/// Next text frame from the host, or panic after two seconds.
pub async fn receive_server_frame(ws: &mut TestSocket) -> ServerFrame {
    loop {
        let msg = tokio::time::timeout(tokio::time::Duration::from_secs(2), ws.next())
            .await
            .expect("Timed out waiting for a frame")
            .expect("No message received")
            .expect("Error receiving message");

        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).expect("Failed to decode frame");
        }
    }
}

/// Send the auth frame and return the host's `(success, error)`.
pub async fn authenticate(ws: &mut TestSocket, token: &str) -> (bool, Option<String>) {
    send_client_frame(
        ws,
        &ClientFrame::Auth {
            token: token.to_string(),
        },
    )
    .await;

    match receive_server_frame(ws).await {
        ServerFrame::AuthResult { success, error } => (success, error),
        other => panic!("Expected AuthResult, got {other:?}"),
    }
}

/// `true` if the host closes the connection within 500ms.
pub async fn is_connection_closed(ws: &mut TestSocket) -> bool {
    match tokio::time::timeout(tokio::time::Duration::from_millis(500), ws.next()).await {
        Err(_) => false,
        Ok(None) => true,
        Ok(Some(Ok(Message::Close(_)))) => true,
        Ok(Some(Ok(_))) => false,
        Ok(Some(Err(_))) => true,
    }
}

pub struct FailingStore {
    pub message: &'static str,
}

impl ConfigPersistence for FailingStore {
    fn load(&self) -> Result<ConnectionConfig, ConfigError> {
        Err(ConfigError::ReadError {
            location: ErrorLocation::from(Location::caller()),
            path: PathBuf::from("config.json"),
            source: std::io::Error::other(self.message),
        })
    }

    fn save(&self, _config: &ConnectionConfig) -> Result<(), ConfigError> {
        Err(ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: PathBuf::from("config.json"),
            source: std::io::Error::other(self.message),
        })
    }
}

pub fn kong_config(host: &str) -> ConnectionConfig {
    ConnectionConfig::builder()
        .with_host(host)
        .with_username("admin")
        .with_password("kong")
        .build()
        .expect("valid test config")
}
