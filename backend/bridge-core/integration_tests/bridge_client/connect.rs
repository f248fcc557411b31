use crate::helpers::{TEST_AUTH_TOKEN, kong_config, start_failing_host, start_test_host};

use bridge_core::BridgeOptions;
use bridge_core::error::bridge::BridgeError;
use bridge_core::error::ipc::IpcError;
use bridge_core::ipc::connect_bridge;

use models::{ConnectionConfig, Payload, PushAction, PushEvent, RendererRequest, ResponseAction};

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;

fn quick_options() -> BridgeOptions {
    BridgeOptions {
        query_timeout: Duration::from_secs(2),
        connect_timeout: Duration::from_millis(500),
    }
}

/// **VALUE**: Verifies a bridge connected over the socket reads the host's config.
///
/// **WHY THIS MATTERS**: This is how the settings view pre-fills its form in the real
/// app: handshake, query, reply, all over the WebSocket.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The client handshake does not match what the server expects
/// - Query replies are not routed back to the waiting caller
#[tokio::test]
async fn given_running_host_when_bridge_reads_config_then_gets_stored_value() {
    // GIVEN: A host and a connected bridge
    let (handle, _host, _dir) = start_test_host().await;
    let (bridge, connection) = connect_bridge(handle.port(), TEST_AUTH_TOKEN, quick_options())
        .await
        .expect("Failed to connect bridge");

    // WHEN: Reading the config
    let config = bridge.read_config().await.expect("query should succeed");

    // THEN: The empty default (nothing saved yet)
    assert_eq!(config, ConnectionConfig::default());
    assert!(!connection.is_finished());

    connection.shutdown();
    handle.shutdown();
}

/// **VALUE**: Verifies the write-success scenario over a real socket.
///
/// **BUG THIS CATCHES**: Would catch acks that never make it back through the client
/// pump to the registered listener.
#[tokio::test]
async fn given_bridge_when_write_config_then_success_listener_and_new_value_served() {
    // GIVEN: A connected bridge with success and error listeners
    let (handle, _host, _dir) = start_test_host().await;
    let (bridge, connection) = connect_bridge(handle.port(), TEST_AUTH_TOKEN, quick_options())
        .await
        .expect("Failed to connect bridge");
    let (ack_tx, mut ack_rx) = mpsc::unbounded_channel::<&'static str>();
    {
        let ack_tx = ack_tx.clone();
        bridge.on_response(ResponseAction::WriteConfigSuccess, move |_: &Payload| {
            let _ = ack_tx.send("success");
        });
    }
    bridge.on_response(ResponseAction::WriteConfigError, move |_: &Payload| {
        let _ = ack_tx.send("error");
    });
    let config = kong_config("https://kong.internal:8444");

    // WHEN: Saving
    bridge.send_request(RendererRequest::WriteConfig(config.clone()));

    // THEN: Success, then the new value is served
    let ack = tokio::time::timeout(Duration::from_secs(2), ack_rx.recv())
        .await
        .expect("ack within 2s");
    assert_eq!(ack, Some("success"));
    assert_eq!(bridge.read_config().await.expect("query"), config);
    assert!(ack_rx.try_recv().is_err());

    connection.shutdown();
    handle.shutdown();
}

#[tokio::test]
async fn given_failing_host_when_write_config_then_error_listener_gets_message() {
    let (handle, _host) = start_failing_host("disk full").await;
    let (bridge, connection) = connect_bridge(handle.port(), TEST_AUTH_TOKEN, quick_options())
        .await
        .expect("Failed to connect bridge");
    let mut errors = bridge.stream(ResponseAction::WriteConfigError);

    bridge.send_request(RendererRequest::WriteConfig(kong_config("http://localhost:8001")));

    let payload = tokio::time::timeout(Duration::from_secs(2), errors.recv())
        .await
        .expect("error ack within 2s")
        .expect("stream open");
    assert_eq!(payload.message(), Some("disk full"));

    connection.shutdown();
    handle.shutdown();
}

/// **VALUE**: Verifies a menu push reaches listeners over the socket.
///
/// **BUG THIS CATCHES**: Would catch the client pump dropping event frames.
#[tokio::test]
async fn given_bridge_listening_when_host_pushes_open_settings_then_listener_fires() {
    // GIVEN: A bridge listening for open-settings-view
    let (handle, host, _dir) = start_test_host().await;
    let (bridge, connection) = connect_bridge(handle.port(), TEST_AUTH_TOKEN, quick_options())
        .await
        .expect("Failed to connect bridge");
    let calls = Arc::new(Mutex::new(Vec::new()));
    {
        let calls = Arc::clone(&calls);
        bridge.on_event_push(PushAction::OpenSettingsView, move |payload: &Payload| {
            calls.lock().expect("lock").push(payload.clone());
        });
    }

    // WHEN: The host pushes once the connection is subscribed
    tokio::time::sleep(Duration::from_millis(50)).await;
    host.push(PushEvent::OpenSettingsView);
    tokio::time::sleep(Duration::from_millis(200)).await;

    // THEN: Listener ran once with no payload
    assert_eq!(*calls.lock().expect("lock"), vec![Payload::Empty]);

    connection.shutdown();
    handle.shutdown();
}

#[tokio::test]
async fn given_wrong_token_when_connecting_then_auth_error() {
    let (handle, _host, _dir) = start_test_host().await;

    let result = connect_bridge(handle.port(), "wrong-token", quick_options()).await;

    assert!(matches!(result, Err(IpcError::Auth { .. })));

    handle.shutdown();
}

/// **VALUE**: Verifies connecting to a port nobody listens on gives up after the
/// connect timeout.
///
/// **BUG THIS CATCHES**: Would catch an unbounded retry loop when the host never
/// starts.
#[tokio::test]
async fn given_no_host_when_connecting_then_connect_error_after_timeout() {
    // GIVEN: A port that was just released
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };

    // WHEN: Connecting with a short timeout
    let started = std::time::Instant::now();
    let result = connect_bridge(port, TEST_AUTH_TOKEN, quick_options()).await;

    // THEN: Connect error, within a reasonable bound
    assert!(matches!(result, Err(IpcError::Connect { .. })));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn given_host_shut_down_when_querying_then_disconnected_or_timeout() {
    let (handle, _host, _dir) = start_test_host().await;
    let (bridge, connection) = connect_bridge(handle.port(), TEST_AUTH_TOKEN, quick_options())
        .await
        .expect("Failed to connect bridge");

    connection.shutdown();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let result = bridge.read_config().await;
    assert!(matches!(
        result,
        Err(BridgeError::Disconnected { .. }) | Err(BridgeError::QueryTimeout { .. })
    ));

    handle.shutdown();
}

/// **VALUE**: Verifies a listener that accepts TCP but never answers the WebSocket
/// upgrade cannot stall the connect.
///
/// **WHY THIS MATTERS**: A wedged or foreign process on the IPC port would otherwise
/// leave the renderer waiting forever at startup.
///
/// **BUG THIS CATCHES**: Would catch the upgrade running outside the connect timeout.
#[tokio::test]
async fn given_silent_listener_when_connecting_then_connect_error_after_timeout() {
    // GIVEN: A TCP listener that accepts and then says nothing
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("addr").port();
    let silent = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });
    let options = BridgeOptions {
        query_timeout: Duration::from_secs(2),
        connect_timeout: Duration::from_millis(300),
    };

    // WHEN: Connecting
    let started = std::time::Instant::now();
    let result = connect_bridge(port, TEST_AUTH_TOKEN, options).await;

    // THEN: Connect error shortly after the timeout
    assert!(matches!(result, Err(IpcError::Connect { .. })));
    assert!(started.elapsed() < Duration::from_secs(3));

    silent.abort();
}

/// **VALUE**: Verifies a server that upgrades but never replies to the auth
/// frame is bounded by the same timeout.
///
/// **BUG THIS CATCHES**: Would catch the auth handshake waiting on the socket with
/// no deadline.
#[tokio::test]
async fn given_server_that_never_authenticates_when_connecting_then_connect_error() {
    // GIVEN: A WebSocket server that completes the upgrade and then goes quiet
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("addr").port();
    let mute = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            if let Ok(ws) = tokio_tungstenite::accept_async(stream).await {
                held.push(ws);
            }
        }
    });
    let options = BridgeOptions {
        query_timeout: Duration::from_secs(2),
        connect_timeout: Duration::from_millis(300),
    };

    // WHEN: Connecting
    let started = std::time::Instant::now();
    let result = connect_bridge(port, TEST_AUTH_TOKEN, options).await;

    // THEN: Connect error, not a hang
    assert!(matches!(result, Err(IpcError::Connect { .. })));
    assert!(started.elapsed() < Duration::from_secs(3));

    mute.abort();
}
