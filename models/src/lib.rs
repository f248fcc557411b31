//! Wire-level data for the KongDash IPC bridge.
//!
//! This crate contains pure data structures shared by the host process and the
//! renderer: channel and action names, payloads, the persisted connection
//! record and the JSON frames exchanged over the IPC socket. There is no I/O
//! and no runtime here.
//!
//! ## Architecture
//!
//! - **common**: error locations, secrets
//! - **models** (this crate): what crosses the process boundary
//! - **bridge-core**: registry, dispatcher, facade, host handlers, transport
//! - **kongdash**: the host application wiring it together

pub mod action;
pub mod channel;
pub mod connection_config;
pub mod error;
pub mod frame;
pub mod payload;

pub use action::{ChannelAction, PushAction, ResponseAction};
pub use channel::Channel;
pub use connection_config::ConnectionConfig;
pub use connection_config::builder::ConnectionConfigBuilder;
pub use error::model_error::ModelError;
pub use frame::{
    ClientFrame, EventFrame, PushEvent, QueryReply, QueryRequest, RendererRequest, ResponseEvent,
    ServerFrame,
};
pub use payload::Payload;

#[cfg(test)]
mod tests;
