use crate::connection_config::ConnectionConfig;
use crate::error::model_error::ModelError;

use common::Secret;

/// Builder for validated [`ConnectionConfig`] values.
///
/// This is what the settings view fills in before handing the record to
/// `Bridge::send_request`. Username and password are optional (Kong without
/// basic auth in front of the Admin API); the host is not.
#[derive(Debug, Default)]
pub struct ConnectionConfigBuilder {
    host: Option<String>,
    username: Option<String>,
    password: Option<Secret>,
}

impl ConnectionConfigBuilder {
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<Secret>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Build the config, trimming a trailing slash off the host.
    #[track_caller]
    pub fn build(self) -> Result<ConnectionConfig, ModelError> {
        let host = self.host.unwrap_or_default();

        let config = ConnectionConfig {
            host: host.trim().trim_end_matches('/').to_string(),
            username: self.username.unwrap_or_default(),
            password: self.password.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}
