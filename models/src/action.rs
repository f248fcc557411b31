//! Typed action names, one enum per listener-bearing channel.
//!
//! The registry keys on the action string, but UI code registers through these
//! enums so a typo in an action name is a compile error rather than a listener
//! that silently never fires.

use crate::channel::Channel;

use std::fmt::{Display, Formatter, Result as FormatResult};

use serde::{Deserialize, Serialize};

/// An action scoped to a fixed channel.
pub trait ChannelAction: Copy {
    /// The channel every action of this type lives on.
    const CHANNEL: Channel;

    /// Action name on the wire.
    fn as_str(&self) -> &'static str;
}

/// Actions on [`Channel::EventPush`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PushAction {
    /// The Settings menu item was clicked.
    OpenSettingsView,

    /// The persisted connection config changed; payload is the new config.
    ConfigUpdated,
}

impl ChannelAction for PushAction {
    const CHANNEL: Channel = Channel::EventPush;

    fn as_str(&self) -> &'static str {
        match self {
            PushAction::OpenSettingsView => "open-settings-view",
            PushAction::ConfigUpdated => "config-updated",
        }
    }
}

/// Actions on [`Channel::Response`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseAction {
    WriteConfigSuccess,
    WriteConfigError,
}

impl ChannelAction for ResponseAction {
    const CHANNEL: Channel = Channel::Response;

    fn as_str(&self) -> &'static str {
        match self {
            ResponseAction::WriteConfigSuccess => "write-config-success",
            ResponseAction::WriteConfigError => "write-config-error",
        }
    }
}

impl Display for PushAction {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        formatter.write_str(self.as_str())
    }
}

impl Display for ResponseAction {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        formatter.write_str(self.as_str())
    }
}
