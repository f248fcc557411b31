//! Host-side handlers: the privileged end of the bridge.
//!
//! One [`HostHandlers`] value serves every renderer connection. It answers
//! synchronous queries from memory, queues config writes to the config actor
//! and broadcasts push events to all connected renderers.

pub mod config_state;

use crate::config::ConfigPersistence;
use crate::host::config_state::{ConfigCommand, ConfigState};

use models::{
    ClientFrame, ConnectionConfig, EventFrame, PushEvent, QueryReply, QueryRequest,
    RendererRequest, ResponseEvent, ServerFrame,
};

use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::sync::{broadcast, mpsc};

/// Buffer of push events per connected renderer before the slowest one lags.
const PUSH_CAPACITY: usize = 64;

#[derive(Clone)]
pub struct HostHandlers {
    config: ConfigState,
    push_tx: broadcast::Sender<EventFrame>,
}

impl HostHandlers {
    /// Build handlers around `persistence`, loading the stored config.
    ///
    /// An unreadable or corrupt record is logged and replaced by the default
    /// config; startup does not fail on it.
    pub fn new(persistence: impl ConfigPersistence) -> Self {
        let initial = persistence.load_or_default();
        Self::with_config(persistence, initial)
    }

    /// Build handlers serving `initial` until the first successful write.
    pub fn with_config(persistence: impl ConfigPersistence, initial: ConnectionConfig) -> Self {
        let (push_tx, _) = broadcast::channel(PUSH_CAPACITY);
        let config = ConfigState::new(Arc::new(persistence), initial, push_tx.clone());
        Self { config, push_tx }
    }

    /// Answer a synchronous query. Reads memory only, never the disk.
    pub async fn handle_query(&self, query: QueryRequest) -> QueryReply {
        debug!("Handling sync query {}", query.resource());

        match query {
            QueryRequest::Config => QueryReply::Config(self.config.get_config().await),
        }
    }

    /// Start an asynchronous request. The acknowledgement goes to `reply_to`
    /// once the request completes.
    pub async fn handle_request(
        &self,
        request: RendererRequest,
        reply_to: &mpsc::UnboundedSender<ServerFrame>,
    ) {
        info!("Handling async request {}", request.action());

        match request {
            RendererRequest::WriteConfig(config) => {
                let cmd = ConfigCommand::WriteConfig {
                    config,
                    reply_to: reply_to.clone(),
                };

                if let Err(e) = self.config.update(cmd).await {
                    error!("Could not queue config write: {e}");
                    let ack = ResponseEvent::WriteConfigError {
                        message: String::from("Configuration service is unavailable"),
                    };
                    let _ = reply_to.send(ServerFrame::Event(ack.into()));
                }
            }
        }
    }

    /// Handle one frame from an authenticated renderer connection.
    pub async fn handle_frame(
        &self,
        frame: ClientFrame,
        reply_to: &mpsc::UnboundedSender<ServerFrame>,
    ) {
        match frame {
            ClientFrame::Query { id, query } => {
                let reply = self.handle_query(query).await;
                if reply_to.send(ServerFrame::QueryReply { id, reply }).is_err() {
                    debug!("Renderer went away before query {id} was answered");
                }
            }
            ClientFrame::Request { request } => self.handle_request(request, reply_to).await,
            ClientFrame::Auth { .. } => {
                warn!("Renderer repeated the auth handshake");
                let _ = reply_to.send(ServerFrame::Error {
                    id: None,
                    message: String::from("Auth handshake already completed"),
                });
            }
        }
    }

    /// Send a host-initiated event to every connected renderer.
    ///
    /// Returns how many renderers were connected to receive it.
    pub fn push(&self, event: PushEvent) -> usize {
        let frame = EventFrame::from(event);
        let action = frame.action.clone();

        match self.push_tx.send(frame) {
            Ok(receivers) => {
                info!("Pushed {action} to {receivers} renderer(s)");
                receivers
            }
            Err(_) => {
                debug!("Pushed {action} with no renderer connected");
                0
            }
        }
    }

    /// Receive every future push event (one receiver per connection).
    pub fn subscribe(&self) -> broadcast::Receiver<EventFrame> {
        self.push_tx.subscribe()
    }

    /// The config currently served to queries.
    pub async fn current_config(&self) -> ConnectionConfig {
        self.config.get_config().await
    }
}
