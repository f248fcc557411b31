use bridge_core::error::CoreError;
use common::ErrorLocation;

use std::panic::Location;

use serde::Serialize;
use thiserror::Error;

/// Errors raised by the host application.
///
/// Serializable so they can be written to the handoff channel or logged as
/// structured JSON; location tracking is kept internally.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum KongdashError {
    /// Error from this App
    #[error("Kongdash Error: {message} {location}")]
    Kongdash {
        message: String,
        location: ErrorLocation,
    },

    /// Invalid or missing host settings
    #[error("Settings Error: {message} {location}")]
    Settings {
        message: String,
        location: ErrorLocation,
    },

    /// Error from bridge-core operations (IPC server, config store)
    #[error("Core Error: {message} {location}")]
    Core {
        message: String,
        location: ErrorLocation,
    },

    /// The renderer handoff file could not be written or read
    #[error("Handoff Error: {message} {location}")]
    Handoff {
        message: String,
        location: ErrorLocation,
    },
}

impl From<CoreError> for KongdashError {
    #[track_caller]
    fn from(error: CoreError) -> Self {
        KongdashError::Core {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
