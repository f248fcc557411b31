//! In-process transport: a [`Bridge`] wired straight to [`HostHandlers`].
//!
//! Frames take the same path as over the socket (same handlers, same
//! router) minus JSON and the auth handshake. Used when host and UI share a
//! process, and by tests.

use crate::bridge::{Bridge, BridgeOptions};
use crate::host::HostHandlers;
use crate::ipc::handle::ConnectionHandle;

use models::{ClientFrame, ServerFrame};

use log::{debug, warn};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;

/// Connect a new bridge to `host` inside this process.
///
/// Must be called from within a tokio runtime.
pub fn connect_loopback(host: HostHandlers, options: BridgeOptions) -> (Bridge, ConnectionHandle) {
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<ClientFrame>();
    let (bridge, router) = Bridge::new(outbound_tx, options);
    let mut push_rx = host.subscribe();

    let pump_task = tokio::spawn(async move {
        let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<ServerFrame>();

        loop {
            tokio::select! {
                frame = outbound_rx.recv() => match frame {
                    Some(frame) => host.handle_frame(frame, &reply_tx).await,
                    None => break,
                },
                Some(frame) = reply_rx.recv() => router.route(frame),
                push = push_rx.recv() => match push {
                    Ok(event) => router.route(ServerFrame::Event(event)),
                    Err(RecvError::Lagged(skipped)) => warn!("Loopback missed {skipped} push event(s)"),
                    Err(RecvError::Closed) => break,
                },
            }
        }

        debug!("Loopback connection closed");
    });

    (bridge, ConnectionHandle { pump_task })
}
