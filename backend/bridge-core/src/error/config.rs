use common::ErrorLocation;
use models::ModelError;

use std::panic::Location;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config Read Error: {path}: {source} {location}")]
    ReadError {
        location: ErrorLocation,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config Parse Error: {path}: {reason} {location}")]
    ParseError {
        location: ErrorLocation,
        path: PathBuf,
        reason: String,
    },

    #[error("Config Write Error: {path}: {source} {location}")]
    WriteError {
        location: ErrorLocation,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config Serialization Error: {reason} {location}")]
    SerializeError {
        location: ErrorLocation,
        reason: String,
    },

    #[error("Config Validation Error: {reason} {location}")]
    ValidationError {
        location: ErrorLocation,
        reason: String,
    },
}

impl From<ModelError> for ConfigError {
    #[track_caller]
    fn from(error: ModelError) -> Self {
        let reason = match error {
            ModelError::Validation { message, .. } => message,
            other => other.to_string(),
        };
        ConfigError::ValidationError {
            location: ErrorLocation::from(Location::caller()),
            reason,
        }
    }
}

impl ConfigError {
    /// The failure without path or location, for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            ConfigError::ReadError { source, .. } | ConfigError::WriteError { source, .. } => {
                source.to_string()
            }
            ConfigError::ParseError { reason, .. }
            | ConfigError::SerializeError { reason, .. }
            | ConfigError::ValidationError { reason, .. } => reason.clone(),
        }
    }
}
