//! JSON frames exchanged over the IPC socket.
//!
//! Renderer to host ([`ClientFrame`]):
//!
//! ```json
//! {"kind": "auth", "token": "..."}
//! {"kind": "async-request", "request": {"action": "write-config", "payload": {...}}}
//! {"kind": "sync-query", "id": 7, "query": {"resource": "config"}}
//! ```
//!
//! Host to renderer ([`ServerFrame`]):
//!
//! ```json
//! {"kind": "auth_result", "success": true}
//! {"kind": "query_reply", "id": 7, "reply": {"resource": "config", "value": {...}}}
//! {"kind": "event", "channel": "async-response", "action": "write-config-error", "payload": {"message": "disk full"}}
//! {"kind": "error", "id": null, "message": "..."}
//! ```
//!
//! Async requests carry no id: acknowledgements are matched by action name
//! only. Queries carry an id because several may be in flight on one socket.

use crate::action::{ChannelAction, PushAction, ResponseAction};
use crate::channel::Channel;
use crate::connection_config::ConnectionConfig;
use crate::payload::Payload;

use serde::{Deserialize, Serialize};

/// Renderer to host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ClientFrame {
    /// Must be the first frame on a connection.
    #[serde(rename = "auth")]
    Auth { token: String },

    /// Fire-and-forget request.
    #[serde(rename = "async-request")]
    Request { request: RendererRequest },

    /// Synchronous query; answered by a [`ServerFrame::QueryReply`] with the same id.
    #[serde(rename = "sync-query")]
    Query { id: u64, query: QueryRequest },
}

/// Asynchronous requests the host understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "payload", rename_all = "kebab-case")]
pub enum RendererRequest {
    /// Persist the connection config; acknowledged with
    /// `write-config-success` or `write-config-error`.
    WriteConfig(ConnectionConfig),
}

impl RendererRequest {
    pub fn action(&self) -> &'static str {
        match self {
            RendererRequest::WriteConfig(_) => "write-config",
        }
    }
}

/// Resources readable through a synchronous query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "resource", rename_all = "kebab-case")]
pub enum QueryRequest {
    /// The currently stored connection config.
    Config,
}

impl QueryRequest {
    pub fn resource(&self) -> &'static str {
        match self {
            QueryRequest::Config => "config",
        }
    }
}

/// Answer to a [`QueryRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "resource", content = "value", rename_all = "kebab-case")]
pub enum QueryReply {
    Config(ConnectionConfig),
}

/// Host to renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ServerFrame {
    AuthResult {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    QueryReply {
        id: u64,
        reply: QueryReply,
    },

    Event(EventFrame),

    /// Protocol-level failure (undecodable frame, repeated auth). `id` is set
    /// when the failure belongs to a query.
    Error {
        #[serde(default)]
        id: Option<u64>,
        message: String,
    },
}

/// An event on a listener-bearing channel.
///
/// `action` stays a plain string so a renderer keeps working (and simply drops
/// the event) when a newer host emits an action it does not know.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventFrame {
    pub channel: Channel,
    pub action: String,
    #[serde(default)]
    pub payload: Payload,
}

impl EventFrame {
    pub fn new(channel: Channel, action: impl Into<String>, payload: Payload) -> Self {
        Self {
            channel,
            action: action.into(),
            payload,
        }
    }
}

/// Host-initiated notifications, typed.
#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    OpenSettingsView,
    ConfigUpdated(ConnectionConfig),
}

impl PushEvent {
    pub fn action(&self) -> PushAction {
        match self {
            PushEvent::OpenSettingsView => PushAction::OpenSettingsView,
            PushEvent::ConfigUpdated(_) => PushAction::ConfigUpdated,
        }
    }
}

impl From<PushEvent> for EventFrame {
    fn from(event: PushEvent) -> Self {
        let action = event.action();
        let payload = match event {
            PushEvent::OpenSettingsView => Payload::Empty,
            PushEvent::ConfigUpdated(config) => Payload::Config(config),
        };
        EventFrame::new(PushAction::CHANNEL, action.as_str(), payload)
    }
}

/// Terminal acknowledgement of an asynchronous request, typed.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseEvent {
    WriteConfigSuccess,
    WriteConfigError { message: String },
}

impl ResponseEvent {
    pub fn action(&self) -> ResponseAction {
        match self {
            ResponseEvent::WriteConfigSuccess => ResponseAction::WriteConfigSuccess,
            ResponseEvent::WriteConfigError { .. } => ResponseAction::WriteConfigError,
        }
    }
}

impl From<ResponseEvent> for EventFrame {
    fn from(event: ResponseEvent) -> Self {
        let action = event.action();
        let payload = match event {
            ResponseEvent::WriteConfigSuccess => Payload::Empty,
            ResponseEvent::WriteConfigError { message } => Payload::Error { message },
        };
        EventFrame::new(ResponseAction::CHANNEL, action.as_str(), payload)
    }
}
