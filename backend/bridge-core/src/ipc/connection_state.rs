//! Per-connection authentication state.

use std::net::SocketAddr;

/// Tracks whether a renderer connection has presented the expected token.
pub(crate) struct ConnectionState {
    peer: SocketAddr,
    authenticated: bool,
    expected_token: String,
}

impl ConnectionState {
    pub(crate) fn new(peer: SocketAddr, token: String) -> Self {
        Self {
            peer,
            authenticated: false,
            expected_token: token,
        }
    }

    /// Validate token and mark as authenticated if correct.
    pub(crate) fn validate_token(&mut self, token: &str) -> bool {
        self.authenticated = !token.is_empty() && token == self.expected_token;
        self.authenticated
    }

    pub(crate) fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub(crate) fn peer(&self) -> SocketAddr {
        self.peer
    }
}
