//! Message payloads.

use crate::connection_config::ConnectionConfig;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

const ERROR_FIELDS: [&str; 1] = ["message"];
const CONFIG_FIELDS: [&str; 3] = ["host", "username", "password"];

/// The value carried by an event.
///
/// Untagged on the wire so the JSON stays what the UI expects: `null` for no
/// payload, `{"message": ".."}` for failures, the config record itself for
/// config events.
///
/// Reading is strict: an object is only `Error` or `Config` when it has
/// exactly those fields. Anything else, including an object that merely
/// contains a `message` or `host` key, lands in [`Payload::Other`] with every
/// field kept.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Payload {
    #[default]
    Empty,

    Error {
        message: String,
    },

    Config(ConnectionConfig),

    Other(serde_json::Value),
}

impl Payload {
    pub fn error(message: impl Into<String>) -> Self {
        Payload::Error {
            message: message.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Payload::Empty)
    }

    /// Error message, if this is an error payload.
    pub fn message(&self) -> Option<&str> {
        match self {
            Payload::Error { message } => Some(message),
            _ => None,
        }
    }

    pub fn as_config(&self) -> Option<&ConnectionConfig> {
        match self {
            Payload::Config(config) => Some(config),
            _ => None,
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Payload::Empty,
            Value::Object(fields) => classify_object(fields),
            other => Payload::Other(other),
        }
    }
}

impl<'de> Deserialize<'de> for Payload {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Payload::from)
    }
}

fn classify_object(fields: Map<String, Value>) -> Payload {
    if let (true, Some(Value::String(message))) =
        (has_only(&fields, &ERROR_FIELDS), fields.get("message"))
    {
        return Payload::error(message.clone());
    }

    if fields.contains_key("host") && has_only(&fields, &CONFIG_FIELDS) {
        let value = Value::Object(fields);
        return match serde_json::from_value::<ConnectionConfig>(value.clone()) {
            Ok(config) => Payload::Config(config),
            Err(_) => Payload::Other(value),
        };
    }

    Payload::Other(Value::Object(fields))
}

fn has_only(fields: &Map<String, Value>, allowed: &[&str]) -> bool {
    fields.keys().all(|key| allowed.contains(&key.as_str()))
}
