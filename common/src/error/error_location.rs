//! Source position attached to every error in the workspace.

use serde::Serialize;

use std::fmt;
use std::panic::Location;

/// Where an error was raised, as `file:line:column`.
///
/// Built from a [`Location`], normally `Location::caller()` inside a
/// `#[track_caller]` function so the position is the caller's, not the
/// helper's. Displays as `[file:line:column]` and ends every error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ErrorLocation {
    pub file: &'static str,
    pub line: u32,
    pub column: u32,
}

impl ErrorLocation {
    pub const fn from(location: &'static Location<'static>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
            column: location.column(),
        }
    }

    /// The position of the (tracked) caller.
    #[track_caller]
    pub fn here() -> Self {
        Self::from(Location::caller())
    }
}

impl fmt::Display for ErrorLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}:{}]", self.file, self.line, self.column)
    }
}
