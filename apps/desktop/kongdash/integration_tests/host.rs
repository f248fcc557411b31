use kongdash::app::start_host;
use kongdash::ipc_config::IpcConfig;
use kongdash::menu::{MenuExit, run_menu};
use kongdash::settings::HostSettings;

use bridge_core::BridgeOptions;
use bridge_core::ipc::connect_bridge;

use models::{ConnectionConfig, PushAction, RendererRequest};

use std::time::Duration;

use tempfile::TempDir;

// ============================================================================
// Integration tests for the host binary's wiring
// A renderer finds the host through the handoff file, exactly like the UI
// ============================================================================

fn test_settings(dir: &TempDir) -> HostSettings {
    HostSettings::new(0, dir.path().join("config"), dir.path().join("logs"))
}

/// **VALUE**: Verifies a renderer can connect using only the handoff file.
///
/// **WHY THIS MATTERS**: This is the real discovery path. If the published port or
/// token is wrong, the UI cannot reach the host at all.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The handoff is written before the port is known (port 0)
/// - The published token differs from the one the server checks
#[tokio::test]
async fn given_started_host_when_renderer_uses_handoff_then_bridge_connects() {
    // GIVEN: A host started on an OS-assigned port
    let dir = TempDir::new().expect("temp dir");
    let settings = test_settings(&dir);
    let host = start_host(&settings).await.expect("host starts");

    // WHEN: A renderer reads the handoff and connects
    let handoff = IpcConfig::read_handoff(settings.config_dir()).expect("handoff exists");
    let (bridge, connection) =
        connect_bridge(handoff.port(), handoff.auth_token(), BridgeOptions::default())
            .await
            .expect("bridge connects");

    // THEN: Queries work and the port matches
    assert_eq!(handoff.port(), host.port());
    assert_eq!(
        bridge.read_config().await.expect("query"),
        ConnectionConfig::default()
    );

    connection.shutdown();
    host.shutdown();
}

#[tokio::test]
async fn given_stopped_host_then_handoff_is_removed() {
    let dir = TempDir::new().expect("temp dir");
    let settings = test_settings(&dir);
    let host = start_host(&settings).await.expect("host starts");
    let handoff_path = host.handoff_path().to_path_buf();
    assert!(handoff_path.exists());

    host.shutdown();

    assert!(!handoff_path.exists());
}

/// **VALUE**: Verifies a saved config survives a host restart.
///
/// **BUG THIS CATCHES**: Would catch a host that only keeps the record in memory, or
/// reads it from a different path than it writes.
#[tokio::test]
async fn given_saved_config_when_host_restarts_then_config_is_served() {
    // GIVEN: A host and a connected renderer that saves a config
    let dir = TempDir::new().expect("temp dir");
    let settings = test_settings(&dir);
    let host = start_host(&settings).await.expect("host starts");
    let handoff = IpcConfig::read_handoff(settings.config_dir()).expect("handoff");
    let (bridge, connection) =
        connect_bridge(handoff.port(), handoff.auth_token(), BridgeOptions::default())
            .await
            .expect("bridge connects");
    let mut updates = bridge.stream(PushAction::ConfigUpdated);
    let config = ConnectionConfig::builder()
        .with_host("http://localhost:8001")
        .with_username("admin")
        .with_password("kong")
        .build()
        .expect("valid config");

    bridge.send_request(RendererRequest::WriteConfig(config.clone()));
    tokio::time::timeout(Duration::from_secs(2), updates.recv())
        .await
        .expect("update within 2s")
        .expect("stream open");
    connection.shutdown();
    host.shutdown();

    // WHEN: The host starts again
    let restarted = start_host(&settings).await.expect("host restarts");

    // THEN: It serves the saved record
    assert_eq!(restarted.handlers().current_config().await, config);

    restarted.shutdown();
}

#[tokio::test]
async fn given_connected_renderer_when_settings_menu_used_then_renderer_gets_push() {
    let dir = TempDir::new().expect("temp dir");
    let settings = test_settings(&dir);
    let host = start_host(&settings).await.expect("host starts");
    let handoff = IpcConfig::read_handoff(settings.config_dir()).expect("handoff");
    let (bridge, connection) =
        connect_bridge(handoff.port(), handoff.auth_token(), BridgeOptions::default())
            .await
            .expect("bridge connects");
    let mut opened = bridge.stream(PushAction::OpenSettingsView);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let input: &[u8] = b"settings\nquit\n";
    let exit = run_menu(input, host.handlers()).await.expect("menu runs");

    assert_eq!(exit, MenuExit::Quit);
    let payload = tokio::time::timeout(Duration::from_secs(2), opened.recv())
        .await
        .expect("push within 2s")
        .expect("stream open");
    assert!(payload.is_empty());

    connection.shutdown();
    host.shutdown();
}
