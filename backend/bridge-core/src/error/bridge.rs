use common::ErrorLocation;

use std::time::Duration;

use thiserror::Error as ThisError;

/// Failures surfaced by the bridge facade to UI code.
///
/// Only `send_query` returns these; fire-and-forget sends and listener
/// registration never fail from the caller's point of view.
#[derive(Debug, ThisError)]
pub enum BridgeError {
    /// The host did not answer a synchronous query in time.
    #[error("Query Timeout Error: no reply for {resource} within {waited:?} {location}")]
    QueryTimeout {
        resource: String,
        waited: Duration,
        location: ErrorLocation,
    },

    /// The connection to the host is gone.
    #[error("Disconnected Error: {message} {location}")]
    Disconnected {
        message: String,
        location: ErrorLocation,
    },

    /// The host rejected the query.
    #[error("Host Error: {message} {location}")]
    Host {
        message: String,
        location: ErrorLocation,
    },
}
