//! The persisted Kong Admin API connection record.

pub mod builder;

use crate::connection_config::builder::ConnectionConfigBuilder;
use crate::error::model_error::ModelError;

use common::{ErrorLocation, Secret};

use std::panic::Location;

use serde::{Deserialize, Serialize};
use url::Url;

/// Where the Kong Admin API lives and how to authenticate against it.
///
/// Stored by the host as a single JSON document and always replaced as a
/// whole; there is no partial update and no versioning. The default value
/// (all fields empty) is what the host serves when nothing usable is on disk.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Admin API base URL, e.g. `http://localhost:8001`.
    pub host: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: Secret,
}

impl ConnectionConfig {
    pub fn builder() -> ConnectionConfigBuilder {
        ConnectionConfigBuilder::default()
    }

    /// `true` once a host has been saved.
    pub fn is_configured(&self) -> bool {
        !self.host.is_empty()
    }

    /// Validate before persisting.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Validation`] if the host is empty, does not parse
    /// as a URL, or is not `http`/`https`.
    #[track_caller]
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.host.trim().is_empty() {
            return Err(ModelError::Validation {
                message: String::from("Host cannot be empty"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let url = Url::parse(&self.host).map_err(|e| ModelError::Validation {
            message: format!("Invalid host URL {}: {e}", self.host),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ModelError::Validation {
                message: format!("Unsupported host scheme: {}", url.scheme()),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(())
    }
}
