//! Host menu surface.
//!
//! Menu items only ever produce push events. The headless host reads menu
//! selections as lines on stdin.

use crate::error::KongdashError;

use bridge_core::HostHandlers;
use common::ErrorLocation;
use models::PushEvent;

use std::fmt;
use std::panic::Location;
use std::str::FromStr;

use log::{info, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Settings,
    Quit,
}

impl MenuItem {
    pub const ALL: [MenuItem; 2] = [MenuItem::Settings, MenuItem::Quit];

    pub fn label(&self) -> &'static str {
        match self {
            MenuItem::Settings => "settings",
            MenuItem::Quit => "quit",
        }
    }

    /// The event this item sends to renderers, if any.
    pub fn push_event(&self) -> Option<PushEvent> {
        match self {
            MenuItem::Settings => Some(PushEvent::OpenSettingsView),
            MenuItem::Quit => None,
        }
    }
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MenuItem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|item| item.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unknown menu item: {wanted:?}"))
    }
}

/// How the menu loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuExit {
    Quit,
    InputClosed,
}

/// Run the menu until `quit` or end of input.
///
/// Blank lines are skipped and unknown items are logged.
///
/// # Errors
///
/// Returns [`KongdashError::Kongdash`] if reading the input fails.
pub async fn run_menu<R>(input: R, host: &HostHandlers) -> Result<MenuExit, KongdashError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();

    loop {
        let line = lines.next_line().await.map_err(|e| KongdashError::Kongdash {
            message: format!("Failed to read menu input: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let Some(line) = line else {
            info!("Menu input closed");
            return Ok(MenuExit::InputClosed);
        };

        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<MenuItem>() {
            Ok(MenuItem::Quit) => {
                info!("Quit selected");
                return Ok(MenuExit::Quit);
            }
            Ok(item) => {
                if let Some(event) = item.push_event() {
                    let receivers = host.push(event);
                    info!("Menu item {item} sent to {receivers} renderer(s)");
                }
            }
            Err(e) => warn!("{e}"),
        }
    }
}
