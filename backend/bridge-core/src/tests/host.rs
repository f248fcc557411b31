use crate::host::HostHandlers;
use crate::tests::support::{FailingStore, MemoryStore, kong_config};

use models::{
    Channel, ConnectionConfig, EventFrame, Payload, PushEvent, QueryReply, QueryRequest,
    RendererRequest, ServerFrame,
};

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

async fn next_frame(reply_rx: &mut mpsc::UnboundedReceiver<ServerFrame>) -> ServerFrame {
    timeout(Duration::from_secs(2), reply_rx.recv())
        .await
        .expect("acknowledgement within 2s")
        .expect("reply channel open")
}

fn expect_event(frame: ServerFrame) -> EventFrame {
    match frame {
        ServerFrame::Event(event) => event,
        other => panic!("expected an event frame, got {other:?}"),
    }
}

/// **VALUE**: Verifies a successful write yields one success ack and one push.
///
/// **WHY THIS MATTERS**: The UI closes the settings dialog on the success ack and
/// other windows refresh on `config-updated`. A missing or doubled ack leaves the
/// dialog open or closes it twice.
///
/// **BUG THIS CATCHES**: Would catch the ack being sent before the save, or the
/// push being sent on failure.
#[tokio::test]
async fn given_writable_store_when_write_config_then_success_ack_and_config_updated_push() {
    // GIVEN: Host handlers over an in-memory store and a push subscriber
    let store = MemoryStore::default();
    let host = HostHandlers::new(store.clone());
    let mut push_rx = host.subscribe();
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel();
    let config = kong_config("http://localhost:8001");

    // WHEN: Writing a config
    host.handle_request(RendererRequest::WriteConfig(config.clone()), &reply_tx)
        .await;

    // THEN: One success ack with an empty payload
    let ack = expect_event(next_frame(&mut reply_rx).await);
    assert_eq!(ack.channel, Channel::Response);
    assert_eq!(ack.action, "write-config-success");
    assert!(ack.payload.is_empty());
    assert!(reply_rx.try_recv().is_err());

    // AND: The new config is pushed, stored, and served
    let pushed = timeout(Duration::from_secs(2), push_rx.recv())
        .await
        .expect("push within 2s")
        .expect("push channel open");
    assert_eq!(pushed, EventFrame::from(PushEvent::ConfigUpdated(config.clone())));
    assert_eq!(store.saved.lock().clone(), Some(config.clone()));
    assert_eq!(host.current_config().await, config);
}

/// **VALUE**: Verifies a failed save yields one error ack carrying the reason.
///
/// **WHY THIS MATTERS**: The user must see why saving failed ("disk full") rather
/// than a dialog that never closes.
///
/// **BUG THIS CATCHES**: Would catch a swallowed persistence error, or memory being
/// updated although nothing reached the disk.
#[tokio::test]
async fn given_failing_store_when_write_config_then_error_ack_and_config_unchanged() {
    // GIVEN: A store that fails with "disk full"
    let host = HostHandlers::with_config(
        FailingStore {
            message: "disk full",
        },
        ConnectionConfig::default(),
    );
    let mut push_rx = host.subscribe();
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel();

    // WHEN: Writing a config
    host.handle_request(
        RendererRequest::WriteConfig(kong_config("http://localhost:8001")),
        &reply_tx,
    )
    .await;

    // THEN: One error ack with the message
    let ack = expect_event(next_frame(&mut reply_rx).await);
    assert_eq!(ack.channel, Channel::Response);
    assert_eq!(ack.action, "write-config-error");
    assert_eq!(ack.payload, Payload::error("disk full"));

    // AND: No push, memory unchanged
    assert!(push_rx.try_recv().is_err());
    assert_eq!(host.current_config().await, ConnectionConfig::default());
}

#[tokio::test]
async fn given_unreadable_store_when_host_starts_then_serves_default_config() {
    let host = HostHandlers::new(FailingStore {
        message: "permission denied",
    });

    let reply = host.handle_query(QueryRequest::Config).await;

    assert_eq!(reply, QueryReply::Config(ConnectionConfig::default()));
}

#[tokio::test]
async fn given_stored_config_when_query_then_answered_from_memory() {
    let stored = kong_config("https://kong.internal:8444");
    let host = HostHandlers::with_config(MemoryStore::default(), stored.clone());
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel();

    host.handle_frame(
        models::ClientFrame::Query {
            id: 7,
            query: QueryRequest::Config,
        },
        &reply_tx,
    )
    .await;

    assert_eq!(
        next_frame(&mut reply_rx).await,
        ServerFrame::QueryReply {
            id: 7,
            reply: QueryReply::Config(stored),
        }
    );
}

/// **VALUE**: Verifies writes are applied one at a time in arrival order.
///
/// **BUG THIS CATCHES**: Would catch concurrent saves racing so the older record
/// ends up on disk.
#[tokio::test]
async fn given_two_writes_when_processed_then_last_one_wins_with_two_acks() {
    // GIVEN: Handlers over a memory store
    let store = MemoryStore::default();
    let host = HostHandlers::new(store.clone());
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel();
    let first = kong_config("http://localhost:8001");
    let second = kong_config("http://localhost:9001");

    // WHEN: Two writes back to back
    host.handle_request(RendererRequest::WriteConfig(first), &reply_tx)
        .await;
    host.handle_request(RendererRequest::WriteConfig(second.clone()), &reply_tx)
        .await;

    // THEN: Two success acks and the second record stored
    for _ in 0..2 {
        let ack = expect_event(next_frame(&mut reply_rx).await);
        assert_eq!(ack.action, "write-config-success");
    }
    assert_eq!(store.saved.lock().clone(), Some(second.clone()));
    assert_eq!(host.current_config().await, second);
}

#[tokio::test]
async fn given_repeated_auth_when_handled_then_protocol_error_frame() {
    let host = HostHandlers::new(MemoryStore::default());
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel();

    host.handle_frame(
        models::ClientFrame::Auth {
            token: String::from("again"),
        },
        &reply_tx,
    )
    .await;

    match next_frame(&mut reply_rx).await {
        ServerFrame::Error { id: None, message } => {
            assert_eq!(message, "Auth handshake already completed");
        }
        other => panic!("expected an error frame, got {other:?}"),
    }
}

#[test]
fn given_no_subscriber_when_push_then_zero_receivers() {
    let host = HostHandlers::new(MemoryStore::default());

    assert_eq!(host.push(PushEvent::OpenSettingsView), 0);

    let _rx = host.subscribe();
    assert_eq!(host.push(PushEvent::OpenSettingsView), 1);
}
