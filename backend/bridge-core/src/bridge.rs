//! The bridge facade: the only surface UI code uses to talk to the host.
//!
//! Four verbs:
//!
//! - [`Bridge::send_request`] - fire-and-forget request to the host
//! - [`Bridge::send_query`] - wait (bounded) for a host-computed value
//! - [`Bridge::on_event_push`] - listen for host-initiated notifications
//! - [`Bridge::on_response`] - listen for acknowledgements of requests
//!
//! plus cleanup ([`Bridge::remove_listeners`], [`Bridge::remove_callbacks`]).
//!
//! A `Bridge` is built by a transport ([`crate::ipc::connect_bridge`] or
//! [`crate::ipc::loopback::connect_loopback`]) and is cheap to clone; all
//! clones share one registry, so pass it to every view that needs it.

use crate::dispatcher::{Dispatcher, InboundRouter, PendingQueries};
use crate::error::bridge::BridgeError;
use crate::registry::ChannelRegistry;

use common::ErrorLocation;
use models::{
    Channel, ChannelAction, ClientFrame, ConnectionConfig, Payload, PushAction, QueryReply,
    QueryRequest, RendererRequest, ResponseAction,
};

use std::panic::Location;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use log::{debug, error, warn};
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout as TokioTimeout;

/// Default bound on a synchronous query round trip.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Default bound on establishing the IPC connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Tunables for a renderer-side bridge.
#[derive(Debug, Clone, Copy)]
pub struct BridgeOptions {
    /// How long `send_query` waits before failing with `QueryTimeout`.
    pub query_timeout: Duration,

    /// How long `connect_bridge` keeps retrying before giving up.
    pub connect_timeout: Duration,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

#[derive(Clone)]
pub struct Bridge {
    registry: Arc<ChannelRegistry>,
    outbound: mpsc::UnboundedSender<ClientFrame>,
    pending: PendingQueries,
    next_query_id: Arc<AtomicU64>,
    options: BridgeOptions,
}

impl Bridge {
    /// Create a bridge writing frames to `outbound`.
    ///
    /// The returned [`InboundRouter`] must be fed every frame the host sends
    /// on this connection; that is the transport's job.
    pub fn new(
        outbound: mpsc::UnboundedSender<ClientFrame>,
        options: BridgeOptions,
    ) -> (Self, InboundRouter) {
        let registry = Arc::new(ChannelRegistry::new());
        let pending = PendingQueries::default();
        let router = InboundRouter::new(Dispatcher::new(Arc::clone(&registry)), pending.clone());

        let bridge = Self {
            registry,
            outbound,
            pending,
            next_query_id: Arc::new(AtomicU64::new(1)),
            options,
        };

        (bridge, router)
    }

    /// Send a request and return immediately.
    ///
    /// Any outcome arrives later through a listener registered with
    /// [`Bridge::on_response`]. A closed transport is logged and otherwise
    /// ignored: there is nobody left to deliver an acknowledgement anyway.
    pub fn send_request(&self, request: RendererRequest) {
        let action = request.action();
        match self.outbound.send(ClientFrame::Request { request }) {
            Ok(()) => debug!("Sent async request {action}"),
            Err(_) => error!("Dropped async request {action}: connection to host is closed"),
        }
    }

    /// Ask the host for a value and wait for it, bounded by the configured
    /// query timeout.
    ///
    /// Meant for fast host-local reads (the stored config), not as general RPC.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::QueryTimeout`] - no reply within the timeout
    /// - [`BridgeError::Disconnected`] - the connection closed first
    /// - [`BridgeError::Host`] - the host answered with an error
    pub async fn send_query(&self, query: QueryRequest) -> Result<QueryReply, BridgeError> {
        self.send_query_with_timeout(query, self.options.query_timeout)
            .await
    }

    /// [`Bridge::send_query`] with an explicit bound.
    pub async fn send_query_with_timeout(
        &self,
        query: QueryRequest,
        limit: Duration,
    ) -> Result<QueryReply, BridgeError> {
        let id = self.next_query_id.fetch_add(1, Ordering::Relaxed);
        let (reply_tx, reply_rx) = oneshot::channel();

        // Register before sending so a fast reply cannot beat the entry.
        self.pending.insert(id, reply_tx);

        if self.outbound.send(ClientFrame::Query { id, query }).is_err() {
            self.pending.remove(id);
            return Err(BridgeError::Disconnected {
                message: format!("Cannot query {}: connection to host is closed", query.resource()),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        debug!("Sent sync query {} (id {id})", query.resource());

        match TokioTimeout(limit, reply_rx).await {
            Ok(Ok(Ok(reply))) => Ok(reply),
            Ok(Ok(Err(message))) => Err(BridgeError::Host {
                message,
                location: ErrorLocation::from(Location::caller()),
            }),
            Ok(Err(_)) => Err(BridgeError::Disconnected {
                message: format!(
                    "Connection closed while waiting for {}",
                    query.resource()
                ),
                location: ErrorLocation::from(Location::caller()),
            }),
            Err(_) => {
                self.pending.remove(id);
                warn!(
                    "Query {} (id {id}) timed out after {limit:?}",
                    query.resource()
                );
                Err(BridgeError::QueryTimeout {
                    resource: query.resource().to_string(),
                    waited: limit,
                    location: ErrorLocation::from(Location::caller()),
                })
            }
        }
    }

    /// Read the connection config currently stored by the host.
    pub async fn read_config(&self) -> Result<ConnectionConfig, BridgeError> {
        match self.send_query(QueryRequest::Config).await? {
            QueryReply::Config(config) => Ok(config),
        }
    }

    /// Listen for a host-initiated notification.
    pub fn on_event_push<F>(&self, action: PushAction, listener: F) -> bool
    where
        F: Fn(&Payload) + Send + Sync + 'static,
    {
        self.on(action, listener)
    }

    /// Listen for an acknowledgement of an earlier request.
    pub fn on_response<F>(&self, action: ResponseAction, listener: F) -> bool
    where
        F: Fn(&Payload) + Send + Sync + 'static,
    {
        self.on(action, listener)
    }

    /// Payloads for `action`, as a stream instead of a callback.
    ///
    /// Dropping the receiver unregisters the listener: it is pruned the next
    /// time `action` is dispatched or registered on.
    pub fn stream<A: ChannelAction>(&self, action: A) -> mpsc::UnboundedReceiver<Payload> {
        let (tx, rx) = mpsc::unbounded_channel();
        let watch = tx.clone();
        self.registry.register_while(
            A::CHANNEL,
            action.as_str(),
            move |payload: &Payload| {
                let _ = tx.send(payload.clone());
            },
            move || !watch.is_closed(),
        );
        rx
    }

    /// Remove the listeners of the given channels, or of every channel.
    pub fn remove_listeners(&self, channels: Option<&[Channel]>) {
        self.registry.clear(channels);
    }

    /// Remove the listeners of one action.
    ///
    /// `event` is the logical name UI code uses (`"onResponse"`,
    /// `"onEventPush"`) or the physical channel name. Unknown names and
    /// channels never registered are ignored.
    pub fn remove_callbacks(&self, event: &str, action: &str) {
        match event.parse::<Channel>() {
            Ok(channel) => self.registry.clear_action(channel, action),
            Err(e) => debug!("Ignoring remove_callbacks for {event}/{action}: {e}"),
        }
    }

    /// The registry behind this bridge, for diagnostics.
    pub fn registry(&self) -> &Arc<ChannelRegistry> {
        &self.registry
    }

    pub fn options(&self) -> BridgeOptions {
        self.options
    }

    /// `true` once the transport has shut down.
    pub fn is_closed(&self) -> bool {
        self.outbound.is_closed()
    }

    fn on<A, F>(&self, action: A, listener: F) -> bool
    where
        A: ChannelAction,
        F: Fn(&Payload) + Send + Sync + 'static,
    {
        self.registry.register(A::CHANNEL, action.as_str(), listener)
    }

    #[cfg(test)]
    pub(crate) fn pending_query_count(&self) -> usize {
        self.pending.len()
    }
}
