use crate::helpers::{
    TEST_AUTH_TOKEN, authenticate, connect_to_server, is_connection_closed, send_client_frame,
    start_test_host,
};

use models::{ClientFrame, QueryRequest};

/// **VALUE**: Verifies the host accepts a renderer presenting the session token.
///
/// **WHY THIS MATTERS**: Every renderer connection starts here. If valid tokens are
/// rejected no view can ever load or save the Kong connection.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The token comparison is inverted
/// - The auth result is never sent
/// - The server closes the socket after a successful handshake
#[tokio::test]
async fn given_valid_token_when_authenticating_then_success_and_connection_stays_open() {
    // GIVEN: A host on an OS-assigned port
    let (handle, _host, _dir) = start_test_host().await;
    let mut ws = connect_to_server(handle.port()).await;

    // WHEN: Authenticating with the session token
    let (success, error) = authenticate(&mut ws, TEST_AUTH_TOKEN).await;

    // THEN: Accepted, no error, socket still open
    assert!(success, "Auth should succeed");
    assert!(error.is_none());
    assert!(!is_connection_closed(&mut ws).await);

    handle.shutdown();
}

/// **VALUE**: Verifies the host rejects a wrong token and closes the connection.
///
/// **WHY THIS MATTERS**: The socket carries the Kong admin password. Any local
/// process that guesses the port must not be able to read it.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - Invalid tokens are accepted
/// - The connection stays usable after a rejected handshake
#[tokio::test]
async fn given_invalid_token_when_authenticating_then_rejected_and_closed() {
    // GIVEN: A running host
    let (handle, _host, _dir) = start_test_host().await;
    let mut ws = connect_to_server(handle.port()).await;

    // WHEN: Authenticating with the wrong token
    let (success, error) = authenticate(&mut ws, "wrong-token").await;

    // THEN: Rejected with a reason, then closed
    assert!(!success, "Auth should fail");
    assert_eq!(error.as_deref(), Some("Invalid authentication token"));
    assert!(is_connection_closed(&mut ws).await);

    handle.shutdown();
}

/// **VALUE**: Verifies a renderer cannot skip the handshake.
///
/// **BUG THIS CATCHES**: Would catch a server that answers queries before auth.
#[tokio::test]
async fn given_query_as_first_frame_when_sent_then_connection_closed() {
    // GIVEN: A connected, unauthenticated socket
    let (handle, _host, _dir) = start_test_host().await;
    let mut ws = connect_to_server(handle.port()).await;

    // WHEN: Sending a query first
    send_client_frame(
        &mut ws,
        &ClientFrame::Query {
            id: 1,
            query: QueryRequest::Config,
        },
    )
    .await;

    // THEN: No reply, connection closed
    assert!(is_connection_closed(&mut ws).await);

    handle.shutdown();
}

#[tokio::test]
async fn given_no_token_when_server_started_then_generates_one() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let host = bridge_core::HostHandlers::new(bridge_core::config::ConfigStore::new(dir.path()));

    let handle = bridge_core::ipc::start_ipc_server(0, None, host)
        .await
        .expect("Failed to start IPC server");

    assert!(!handle.auth_token().is_empty());
    assert_ne!(handle.port(), 0);
    assert!(handle.local_addr().ip().is_loopback());

    handle.shutdown();
}
