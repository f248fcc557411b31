//! Renderer-side IPC client: connects a [`Bridge`] to the host's server.

use crate::bridge::{Bridge, BridgeOptions};
use crate::dispatcher::InboundRouter;
use crate::error::ipc::IpcError;
use crate::ipc::codec::{decode_frame, send_frame};
use crate::ipc::handle::ConnectionHandle;

use common::ErrorLocation;
use models::{ClientFrame, ServerFrame};

use std::panic::Location;

use backoff::{ExponentialBackoff, backoff::Backoff};
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, trace, warn};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::{sleep as TokioSleep, timeout as TokioTimeout};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type RendererSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connect to the host on `127.0.0.1:<ipc_port>`, authenticate, and return a
/// live [`Bridge`].
///
/// The host may still be starting, so connection attempts are retried with
/// exponential backoff. The whole setup, retries, WebSocket upgrade and auth
/// handshake included, is bounded by `options.connect_timeout`.
///
/// # Errors
///
/// - [`IpcError::Connect`] - the server could not be reached, or did not
///   complete the handshake, in time
/// - [`IpcError::Auth`] - the host rejected the token
/// - [`IpcError::Read`] / [`IpcError::FrameDecode`] - the handshake reply was unusable
pub async fn connect_bridge(
    ipc_port: u16,
    auth_token: &str,
    options: BridgeOptions,
) -> Result<(Bridge, ConnectionHandle), IpcError> {
    let url = format!("ws://{}:{ipc_port}", crate::IPC_HOSTNAME);
    let socket = match TokioTimeout(options.connect_timeout, establish(&url, auth_token, &options))
        .await
    {
        Ok(result) => result?,
        Err(_) => {
            return Err(IpcError::Connect {
                message: format!(
                    "Host at {url} did not complete the handshake within {:?}",
                    options.connect_timeout
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }
    };
    info!("Connected to host IPC at {url}");

    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let (bridge, router) = Bridge::new(outbound_tx, options);

    let pump_task = tokio::spawn(pump(socket, outbound_rx, router));

    Ok((bridge, ConnectionHandle { pump_task }))
}

async fn establish(
    url: &str,
    auth_token: &str,
    options: &BridgeOptions,
) -> Result<RendererSocket, IpcError> {
    let mut socket = connect_with_retry(url, options).await?;
    authenticate(&mut socket, auth_token).await?;
    Ok(socket)
}

async fn connect_with_retry(url: &str, options: &BridgeOptions) -> Result<RendererSocket, IpcError> {
    let mut backoff = ExponentialBackoff {
        max_elapsed_time: Some(options.connect_timeout),
        ..Default::default()
    };

    loop {
        match connect_async(url).await {
            Ok((socket, _)) => return Ok(socket),
            Err(e) => match backoff.next_backoff() {
                Some(duration) => {
                    trace!("Host not reachable at {url} ({e}), retrying after {duration:?}");
                    TokioSleep(duration).await;
                }
                None => {
                    return Err(IpcError::Connect {
                        message: format!(
                            "Host not reachable at {url} within {:?}: {e}",
                            options.connect_timeout
                        ),
                        location: ErrorLocation::from(Location::caller()),
                    });
                }
            },
        }
    }
}

async fn authenticate(socket: &mut RendererSocket, auth_token: &str) -> Result<(), IpcError> {
    send_frame(
        socket,
        &ClientFrame::Auth {
            token: auth_token.to_string(),
        },
    )
    .await?;

    let reply = loop {
        match socket.next().await {
            Some(Ok(Message::Text(text))) => break decode_frame::<ServerFrame>(text.as_str())?,
            Some(Ok(Message::Close(_))) | None => {
                return Err(IpcError::Auth {
                    message: String::from("Host closed the connection during the handshake"),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => {
                return Err(IpcError::Read {
                    message: format!("Error reading auth result: {e}"),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }
    };

    match reply {
        ServerFrame::AuthResult { success: true, .. } => Ok(()),
        ServerFrame::AuthResult { error, .. } => Err(IpcError::Auth {
            message: error.unwrap_or_else(|| String::from("Authentication rejected")),
            location: ErrorLocation::from(Location::caller()),
        }),
        other => Err(IpcError::Auth {
            message: format!("Expected auth result, got {other:?}"),
            location: ErrorLocation::from(Location::caller()),
        }),
    }
}

/// Move frames between the socket and the bridge until either side closes.
async fn pump(
    socket: RendererSocket,
    mut outbound_rx: mpsc::UnboundedReceiver<ClientFrame>,
    router: InboundRouter,
) {
    let (mut write, mut read) = socket.split();

    loop {
        tokio::select! {
            msg = read.next() => match msg {
                Some(Ok(Message::Text(text))) => match decode_frame::<ServerFrame>(text.as_str()) {
                    Ok(frame) => router.route(frame),
                    Err(e) => warn!("Ignoring undecodable frame from host: {e}"),
                },
                Some(Ok(Message::Close(_))) | None => {
                    info!("Host closed the IPC connection");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    error!("IPC connection to host failed: {e}");
                    break;
                }
            },
            frame = outbound_rx.recv() => match frame {
                Some(frame) => {
                    if let Err(e) = send_frame(&mut write, &frame).await {
                        error!("{e}");
                        break;
                    }
                }
                None => {
                    debug!("All bridge handles dropped, closing IPC connection");
                    let _ = write.close().await;
                    break;
                }
            },
        }
    }

    router.close();
}
