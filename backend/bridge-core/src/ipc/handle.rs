//! Handles for running IPC endpoints.

use std::net::SocketAddr;

use tokio::task::JoinHandle;

/// Handle to a running host-side IPC server.
///
/// Returned by [`start_ipc_server`](crate::ipc::start_ipc_server). Dropping
/// the handle does **not** stop the server; call [`IpcServerHandle::shutdown`]
/// to stop accepting connections. Connections already accepted run until the
/// renderer disconnects.
pub struct IpcServerHandle {
    pub(crate) local_addr: SocketAddr,
    pub(crate) auth_token: String,
    pub(crate) accept_task: JoinHandle<()>,
}

impl IpcServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Port actually bound (useful when started on port 0).
    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    /// Token renderers must present in their first frame.
    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }

    pub fn shutdown(self) {
        self.accept_task.abort();
    }
}

/// Handle to the renderer-side task pumping frames between a [`Bridge`]
/// and its transport.
///
/// [`Bridge`]: crate::bridge::Bridge
pub struct ConnectionHandle {
    pub(crate) pump_task: JoinHandle<()>,
}

impl ConnectionHandle {
    /// `true` once the connection has ended.
    pub fn is_finished(&self) -> bool {
        self.pump_task.is_finished()
    }

    /// Wait until the connection ends.
    pub async fn closed(self) {
        let _ = self.pump_task.await;
    }

    /// Tear the connection down; pending queries fail as disconnected.
    pub fn shutdown(self) {
        self.pump_task.abort();
    }
}
