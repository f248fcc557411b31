//! Core of the KongDash IPC bridge.
//!
//! Renderer side: [`registry`], [`dispatcher`] and the [`bridge`] facade.
//! Host side: [`host`] handlers and [`config`] persistence.
//! Both ends meet through [`ipc`].

pub mod bridge;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod host;
pub mod ipc;
pub mod registry;

#[cfg(test)]
mod tests;

pub use bridge::{Bridge, BridgeOptions};
pub use host::HostHandlers;
pub use registry::ChannelRegistry;

pub const IPC_HOSTNAME: &str = "127.0.0.1";
pub const DEFAULT_IPC_PORT: u16 = 19876;
