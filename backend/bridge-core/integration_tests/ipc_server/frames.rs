use crate::helpers::{
    TEST_AUTH_TOKEN, authenticate, connect_to_server, kong_config, receive_server_frame,
    send_client_frame, start_failing_host, start_test_host,
};

use models::{
    Channel, ClientFrame, ConnectionConfig, Payload, PushEvent, QueryReply, QueryRequest,
    RendererRequest, ServerFrame,
};

use bridge_core::config::{ConfigPersistence, ConfigStore};

use futures_util::SinkExt;
use tokio_tungstenite::tungstenite::Message;

/// **VALUE**: Verifies a query frame is answered with the same id and the stored config.
///
/// **WHY THIS MATTERS**: Renderers correlate query replies by id. A wrong id leaves
/// the caller waiting until its timeout.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The reply id is not echoed
/// - The reply is not a `query_reply` frame
#[tokio::test]
async fn given_authenticated_when_query_config_then_reply_with_matching_id() {
    // GIVEN: An authenticated renderer socket
    let (handle, _host, _dir) = start_test_host().await;
    let mut ws = connect_to_server(handle.port()).await;
    assert!(authenticate(&mut ws, TEST_AUTH_TOKEN).await.0);

    // WHEN: Querying the config
    send_client_frame(
        &mut ws,
        &ClientFrame::Query {
            id: 42,
            query: QueryRequest::Config,
        },
    )
    .await;

    // THEN: Reply for id 42 with the (empty) stored config
    assert_eq!(
        receive_server_frame(&mut ws).await,
        ServerFrame::QueryReply {
            id: 42,
            reply: QueryReply::Config(ConnectionConfig::default()),
        }
    );

    handle.shutdown();
}

/// **VALUE**: Verifies a write request is persisted and acknowledged over the socket.
///
/// **WHY THIS MATTERS**: This is what "Save" on the settings form does end to end. The
/// record has to be on disk and the renderer has to hear about it.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The ack goes to no renderer
/// - The record is acknowledged but never written
/// - The `config-updated` push is missing
#[tokio::test]
async fn given_authenticated_when_write_config_then_success_ack_push_and_file_written() {
    // GIVEN: An authenticated renderer socket
    let (handle, _host, dir) = start_test_host().await;
    let mut ws = connect_to_server(handle.port()).await;
    assert!(authenticate(&mut ws, TEST_AUTH_TOKEN).await.0);
    let config = kong_config("http://localhost:8001");

    // WHEN: Writing the config
    send_client_frame(
        &mut ws,
        &ClientFrame::Request {
            request: RendererRequest::WriteConfig(config.clone()),
        },
    )
    .await;

    // THEN: The ack and the push both arrive (order across channels is not fixed)
    let mut seen = Vec::new();
    for _ in 0..2 {
        match receive_server_frame(&mut ws).await {
            ServerFrame::Event(event) => seen.push(event),
            other => panic!("Expected an event frame, got {other:?}"),
        }
    }
    let ack = seen
        .iter()
        .find(|e| e.channel == Channel::Response)
        .expect("write ack");
    assert_eq!(ack.action, "write-config-success");
    assert!(ack.payload.is_empty());
    let push = seen
        .iter()
        .find(|e| e.channel == Channel::EventPush)
        .expect("config-updated push");
    assert_eq!(push.action, "config-updated");
    assert_eq!(push.payload.as_config(), Some(&config));

    // AND: The record is on disk
    let on_disk = ConfigStore::new(dir.path()).load().expect("load saved config");
    assert_eq!(on_disk, config);

    handle.shutdown();
}

#[tokio::test]
async fn given_failing_store_when_write_config_then_error_ack_with_message() {
    let (handle, _host) = start_failing_host("disk full").await;
    let mut ws = connect_to_server(handle.port()).await;
    assert!(authenticate(&mut ws, TEST_AUTH_TOKEN).await.0);

    send_client_frame(
        &mut ws,
        &ClientFrame::Request {
            request: RendererRequest::WriteConfig(kong_config("http://localhost:8001")),
        },
    )
    .await;

    match receive_server_frame(&mut ws).await {
        ServerFrame::Event(event) => {
            assert_eq!(event.channel, Channel::Response);
            assert_eq!(event.action, "write-config-error");
            assert_eq!(event.payload, Payload::error("disk full"));
        }
        other => panic!("Expected an event frame, got {other:?}"),
    }

    handle.shutdown();
}

/// **VALUE**: Verifies a host push reaches an authenticated renderer unprompted.
///
/// **BUG THIS CATCHES**: Would catch a connection loop that only writes in reply to
/// renderer frames.
#[tokio::test]
async fn given_authenticated_renderer_when_host_pushes_then_event_frame_arrives() {
    // GIVEN: An authenticated renderer
    let (handle, host, _dir) = start_test_host().await;
    let mut ws = connect_to_server(handle.port()).await;
    assert!(authenticate(&mut ws, TEST_AUTH_TOKEN).await.0);

    // WHEN: The host menu asks for the settings view
    tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
    assert_eq!(host.push(PushEvent::OpenSettingsView), 1);

    // THEN: The event frame arrives with no payload
    match receive_server_frame(&mut ws).await {
        ServerFrame::Event(event) => {
            assert_eq!(event.channel, Channel::EventPush);
            assert_eq!(event.action, "open-settings-view");
            assert!(event.payload.is_empty());
        }
        other => panic!("Expected an event frame, got {other:?}"),
    }

    handle.shutdown();
}

#[tokio::test]
async fn given_authenticated_when_sending_garbage_then_error_frame_and_still_served() {
    let (handle, _host, _dir) = start_test_host().await;
    let mut ws = connect_to_server(handle.port()).await;
    assert!(authenticate(&mut ws, TEST_AUTH_TOKEN).await.0);

    ws.send(Message::Text("{\"kind\":\"nope\"}".into()))
        .await
        .expect("Failed to send message");

    match receive_server_frame(&mut ws).await {
        ServerFrame::Error { id: None, message } => assert_eq!(message, "Invalid frame"),
        other => panic!("Expected an error frame, got {other:?}"),
    }

    send_client_frame(
        &mut ws,
        &ClientFrame::Query {
            id: 3,
            query: QueryRequest::Config,
        },
    )
    .await;
    assert!(matches!(
        receive_server_frame(&mut ws).await,
        ServerFrame::QueryReply { id: 3, .. }
    ));

    handle.shutdown();
}
