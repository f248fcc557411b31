//! IPC transport between the host process and renderers.
//!
//! - [`start_ipc_server`] - host side, localhost WebSocket with token auth
//! - [`connect_bridge`] - renderer side, yields a [`Bridge`](crate::bridge::Bridge)
//! - [`loopback::connect_loopback`] - both ends in one process
//!
//! # Security
//!
//! - Binds `127.0.0.1` only and rejects non-loopback peers
//! - First frame must carry the per-session token generated by the host

mod codec;
mod connection_state;
mod handle;
pub mod loopback;
mod client;
mod server;

pub use client::connect_bridge;
pub use handle::{ConnectionHandle, IpcServerHandle};
pub use server::start_ipc_server;
