//! Listener-bearing channels.
//!
//! | Channel | Physical name | Logical name | Carries |
//! |---------|---------------|--------------|---------|
//! | [`Channel::EventPush`] | `"event-push"` | `"onEventPush"` | host-initiated notifications |
//! | [`Channel::Response`] | `"async-response"` | `"onResponse"` | write acknowledgements |
//!
//! The outbound transports (`async-request`, `sync-query`) never hold
//! listeners; they appear only as frame kinds in [`crate::frame::ClientFrame`].

use crate::error::model_error::ModelError;

use common::ErrorLocation;

use std::fmt::{Display, Formatter, Result as FormatResult};
use std::panic::Location;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Channel {
    /// Host-initiated push notifications (menu clicks, settings changes).
    #[serde(rename = "event-push")]
    EventPush,

    /// Acknowledgements for asynchronous requests.
    #[serde(rename = "async-response")]
    Response,
}

impl Channel {
    /// Every channel a listener can be registered on.
    pub const ALL: [Channel; 2] = [Channel::EventPush, Channel::Response];

    /// Name used on the wire and in logs.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Channel::EventPush => "event-push",
            Channel::Response => "async-response",
        }
    }

    /// Name UI code uses when asking for cleanup (`removeCallbacks("onResponse", ..)`).
    pub const fn logical_name(&self) -> &'static str {
        match self {
            Channel::EventPush => "onEventPush",
            Channel::Response => "onResponse",
        }
    }
}

impl Display for Channel {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = ModelError;

    /// Accepts either the physical or the logical name.
    #[track_caller]
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Channel::ALL
            .into_iter()
            .find(|channel| channel.as_str() == name || channel.logical_name() == name)
            .ok_or_else(|| ModelError::UnknownChannel {
                name: name.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}
