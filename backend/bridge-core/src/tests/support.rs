// Shared fixtures for unit tests.

use crate::config::ConfigPersistence;
use crate::error::config::ConfigError;

use common::ErrorLocation;
use models::{ConnectionConfig, Payload};

use std::panic::Location;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;

/// Records payloads a listener received, tagged with a label.
#[derive(Clone, Default)]
pub(crate) struct Recorder {
    calls: Arc<Mutex<Vec<(String, Payload)>>>,
}

impl Recorder {
    pub(crate) fn listener(&self, label: &str) -> impl Fn(&Payload) + Send + Sync + 'static {
        let calls = Arc::clone(&self.calls);
        let label = label.to_string();
        move |payload: &Payload| calls.lock().push((label.clone(), payload.clone()))
    }

    pub(crate) fn labels(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(l, _)| l.clone()).collect()
    }

    pub(crate) fn payloads(&self) -> Vec<Payload> {
        self.calls.lock().iter().map(|(_, p)| p.clone()).collect()
    }

    pub(crate) fn count(&self) -> usize {
        self.calls.lock().len()
    }
}

/// In-memory store that always succeeds.
#[derive(Clone, Default)]
pub(crate) struct MemoryStore {
    pub(crate) saved: Arc<Mutex<Option<ConnectionConfig>>>,
}

impl ConfigPersistence for MemoryStore {
    fn load(&self) -> Result<ConnectionConfig, ConfigError> {
        Ok(self.saved.lock().clone().unwrap_or_default())
    }

    fn save(&self, config: &ConnectionConfig) -> Result<(), ConfigError> {
        *self.saved.lock() = Some(config.clone());
        Ok(())
    }
}

/// Store whose every operation fails with `message`.
pub(crate) struct FailingStore {
    pub(crate) message: &'static str,
}

impl ConfigPersistence for FailingStore {
    fn load(&self) -> Result<ConnectionConfig, ConfigError> {
        Err(ConfigError::ReadError {
            location: ErrorLocation::from(Location::caller()),
            path: PathBuf::from("config.json"),
            source: std::io::Error::other(self.message),
        })
    }

    fn save(&self, _config: &ConnectionConfig) -> Result<(), ConfigError> {
        Err(ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: PathBuf::from("config.json"),
            source: std::io::Error::other(self.message),
        })
    }
}

pub(crate) fn kong_config(host: &str) -> ConnectionConfig {
    ConnectionConfig::builder()
        .with_host(host)
        .with_username("admin")
        .with_password("kong")
        .build()
        .expect("valid test config")
}
