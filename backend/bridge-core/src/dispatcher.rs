//! Inbound side of the renderer: event dispatch and query reply routing.

use crate::registry::ChannelRegistry;

use models::{EventFrame, QueryReply, ServerFrame};

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use log::{debug, error, trace, warn};
use parking_lot::Mutex;
use tokio::sync::oneshot;

/// Delivers events to the listeners registered for their `(channel, action)`.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ChannelRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ChannelRegistry>) -> Self {
        Self { registry }
    }

    /// Invoke every listener for the event, in registration order, with the
    /// payload only. Returns how many listeners ran.
    ///
    /// Events for a channel without a table, or an action without listeners,
    /// are dropped. Listeners run outside the registry lock, so one may
    /// register or remove listeners; that takes effect from the next event.
    /// A listener that panics is logged and skipped; the rest still run and
    /// the connection stays up.
    pub fn dispatch(&self, event: &EventFrame) -> usize {
        let Some(listeners) = self.registry.snapshot(event.channel, &event.action) else {
            trace!(
                "Dropping {}/{}: channel not subscribed",
                event.channel, event.action
            );
            return 0;
        };

        if listeners.is_empty() {
            trace!("Dropping {}/{}: no listeners", event.channel, event.action);
            return 0;
        }

        for listener in &listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(&event.payload))).is_err() {
                error!(
                    "Listener for {}/{} panicked",
                    event.channel, event.action
                );
            }
        }

        debug!(
            "Dispatched {}/{} to {} listener(s)",
            event.channel,
            event.action,
            listeners.len()
        );
        listeners.len()
    }
}

/// Outcome delivered to a waiting query: the reply, or the host's error message.
pub(crate) type QueryOutcome = Result<QueryReply, String>;

/// Queries sent and not yet answered, keyed by request id.
#[derive(Clone, Default)]
pub(crate) struct PendingQueries {
    inner: Arc<Mutex<HashMap<u64, oneshot::Sender<QueryOutcome>>>>,
}

impl PendingQueries {
    pub(crate) fn insert(&self, id: u64, reply_tx: oneshot::Sender<QueryOutcome>) {
        self.inner.lock().insert(id, reply_tx);
    }

    pub(crate) fn remove(&self, id: u64) -> Option<oneshot::Sender<QueryOutcome>> {
        self.inner.lock().remove(&id)
    }

    /// Drop every waiter; their `send_query` calls fail as disconnected.
    pub(crate) fn fail_all(&self) {
        let mut inner = self.inner.lock();
        if !inner.is_empty() {
            warn!("Abandoning {} pending query(ies)", inner.len());
        }
        inner.clear();
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.inner.lock().len()
    }
}

/// Routes every frame the host sends to a renderer connection.
///
/// Owned by whatever pumps the transport (the WebSocket client task or the
/// loopback task). Query replies go to their waiting caller by id; events go
/// to the [`Dispatcher`].
pub struct InboundRouter {
    dispatcher: Dispatcher,
    pending: PendingQueries,
}

impl InboundRouter {
    pub(crate) fn new(dispatcher: Dispatcher, pending: PendingQueries) -> Self {
        Self {
            dispatcher,
            pending,
        }
    }

    pub fn route(&self, frame: ServerFrame) {
        match frame {
            ServerFrame::Event(event) => {
                self.dispatcher.dispatch(&event);
            }
            ServerFrame::QueryReply { id, reply } => self.complete(id, Ok(reply)),
            ServerFrame::Error { id: Some(id), message } => self.complete(id, Err(message)),
            ServerFrame::Error { id: None, message } => {
                error!("Host reported a protocol error: {message}");
            }
            ServerFrame::AuthResult { .. } => {
                warn!("Ignoring unexpected auth result after handshake");
            }
        }
    }

    /// The transport is gone: fail every query still waiting.
    ///
    /// Also happens when the router is dropped.
    pub fn close(&self) {
        self.pending.fail_all();
    }

    fn complete(&self, id: u64, outcome: QueryOutcome) {
        match self.pending.remove(id) {
            Some(reply_tx) => {
                if reply_tx.send(outcome).is_err() {
                    debug!("Query {id} caller stopped waiting before the reply arrived");
                }
            }
            None => debug!("Dropping reply for unknown or expired query {id}"),
        }
    }
}

impl Drop for InboundRouter {
    fn drop(&mut self) {
        self.pending.fail_all();
    }
}
