//! Host-side IPC WebSocket server.
//!
//! - Listens on localhost only
//! - Rejects non-loopback peers
//! - Requires an `auth` frame with the session token first
//! - Then relays frames between the renderer and [`HostHandlers`], and
//!   forwards every push event the host broadcasts
//!
//! Frames are JSON text messages, see [`models::frame`].

use crate::error::ipc::IpcError;
use crate::host::HostHandlers;
use crate::ipc::codec::{decode_frame, send_frame};
use crate::ipc::connection_state::ConnectionState;
use crate::ipc::handle::IpcServerHandle;

use common::ErrorLocation;
use models::{ClientFrame, ServerFrame};

use std::net::SocketAddr;
use std::panic::Location;

use futures_util::{Sink, StreamExt};
use log::{debug, error, info, warn};
use tokio::net::{TcpListener, TcpStream};
use tokio::spawn as TokioSpawn;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use uuid::Uuid;

/// Starts the IPC WebSocket server on `127.0.0.1:<ipc_port>`.
///
/// Pass port `0` to let the OS pick; the bound port is on the returned handle.
/// A token is generated when `auth_token` is `None`.
///
/// # Errors
///
/// Returns [`IpcError::Io`] if the port cannot be bound.
pub async fn start_ipc_server(
    ipc_port: u16,
    auth_token: Option<String>,
    host: HostHandlers,
) -> Result<IpcServerHandle, IpcError> {
    let auth_token = auth_token.unwrap_or_else(|| {
        let token = Uuid::new_v4().to_string();
        debug!("Generated IPC auth token");
        token
    });

    let address = format!("{}:{ipc_port}", crate::IPC_HOSTNAME);
    let listener = TcpListener::bind(&address).await?;
    let local_addr = listener.local_addr()?;

    info!("IPC server listening on {local_addr}");

    let token_for_accept = auth_token.clone();
    let accept_task = TokioSpawn(async move {
        while let Ok((stream, addr)) = listener.accept().await {
            info!("Renderer connecting from {addr}");
            let token_clone = token_for_accept.clone();
            let host_clone = host.clone();
            TokioSpawn(async move {
                if let Err(e) = handle_connection(stream, addr, token_clone, host_clone).await {
                    error!("Connection from {addr} ended with error: {e}");
                }
            });
        }
    });

    Ok(IpcServerHandle {
        local_addr,
        auth_token,
        accept_task,
    })
}

/// Serve one renderer connection until it disconnects.
///
/// # Protocol
///
/// 1. First message MUST be a `ClientFrame::Auth` with the valid token
/// 2. Server answers `ServerFrame::AuthResult`
/// 3. On failure the connection closes
/// 4. On success, frames are handled until the renderer disconnects
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    auth_token: String,
    host: HostHandlers,
) -> Result<(), IpcError> {
    // SECURITY: Reject non-loopback connections
    if !addr.ip().is_loopback() {
        warn!("Rejected non-loopback connection from {addr}");
        return Ok(());
    }

    let ws_stream = accept_async(stream).await.map_err(|e| IpcError::Handshake {
        message: format!("WebSocket handshake failed: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let (mut write, mut read) = ws_stream.split();
    let mut state = ConnectionState::new(addr, auth_token);

    match read.next().await {
        Some(Ok(Message::Text(text))) => match decode_frame::<ClientFrame>(text.as_str()) {
            Ok(ClientFrame::Auth { token }) => {
                if !state.validate_token(&token) {
                    warn!("Renderer {addr} auth failed: invalid token");
                    send_auth_result(&mut write, false, Some("Invalid authentication token"))
                        .await?;
                    return Ok(());
                }
                send_auth_result(&mut write, true, None).await?;
            }
            Ok(_) => {
                warn!("Renderer {addr} auth failed: first frame was not auth");
                return Ok(());
            }
            Err(e) => {
                warn!("Renderer {addr} sent an undecodable first frame: {e}");
                return Ok(());
            }
        },
        Some(Ok(_)) => {
            warn!("Renderer {addr} sent a non-text first message");
            return Ok(());
        }
        Some(Err(e)) => {
            return Err(IpcError::Read {
                message: format!("Error reading first message: {e}"),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        None => {
            warn!("Renderer {addr} disconnected before sending auth");
            return Ok(());
        }
    }

    debug_assert!(state.is_authenticated());
    info!("Renderer {} authenticated", state.peer());

    // Responses for this renderer only; pushes for everyone.
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<ServerFrame>();
    let mut push_rx = host.subscribe();

    loop {
        tokio::select! {
            msg = read.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    match decode_frame::<ClientFrame>(text.as_str()) {
                        Ok(frame) => host.handle_frame(frame, &reply_tx).await,
                        Err(e) => {
                            error!("Invalid frame from {addr}: {e}");
                            send_frame(&mut write, &ServerFrame::Error {
                                id: None,
                                message: String::from("Invalid frame"),
                            })
                            .await?;
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(Message::Binary(_))) => {
                    warn!("Renderer {addr} sent a binary message; ignoring");
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    return Err(IpcError::Read {
                        message: format!("Error reading message: {e}"),
                        location: ErrorLocation::from(Location::caller()),
                    });
                }
            },
            Some(frame) = reply_rx.recv() => send_frame(&mut write, &frame).await?,
            push = push_rx.recv() => match push {
                Ok(event) => send_frame(&mut write, &ServerFrame::Event(event)).await?,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Renderer {addr} missed {skipped} push event(s)");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    info!("Renderer {addr} disconnected");
    Ok(())
}

async fn send_auth_result<S>(
    write: &mut S,
    success: bool,
    error: Option<&str>,
) -> Result<(), IpcError>
where
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    let frame = ServerFrame::AuthResult {
        success,
        error: error.map(|s| s.to_string()),
    };
    send_frame(write, &frame).await
}
