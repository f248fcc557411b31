use crate::bridge::BridgeOptions;
use crate::host::HostHandlers;
use crate::ipc::loopback::connect_loopback;
use crate::tests::support::{FailingStore, MemoryStore, Recorder, kong_config};

use models::{ConnectionConfig, Payload, PushAction, PushEvent, RendererRequest, ResponseAction};

use std::time::Duration;

use tokio::time::{sleep, timeout};

/// Poll until `recorder` has `expected` calls or two seconds pass.
async fn wait_for_calls(recorder: &Recorder, expected: usize) {
    let waited = timeout(Duration::from_secs(2), async {
        while recorder.count() < expected {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(
        waited.is_ok(),
        "expected {expected} listener call(s), saw {}",
        recorder.count()
    );
}

/// **VALUE**: Verifies the full write-success round trip through bridge and host.
///
/// **WHY THIS MATTERS**: This is the path the settings view uses on "Save". The
/// success listener must fire exactly once with no payload and the error listener
/// must stay silent.
///
/// **BUG THIS CATCHES**: Would catch acks routed to the wrong channel or action, or
/// acks delivered twice.
#[tokio::test]
async fn given_writable_host_when_ui_writes_config_then_success_listener_fires_once() {
    // GIVEN: A bridge connected in-process to a host with a working store
    let host = HostHandlers::new(MemoryStore::default());
    let (bridge, handle) = connect_loopback(host.clone(), BridgeOptions::default());
    let recorder = Recorder::default();
    bridge.on_response(ResponseAction::WriteConfigSuccess, recorder.listener("success"));
    bridge.on_response(ResponseAction::WriteConfigError, recorder.listener("error"));
    let config = kong_config("http://localhost:8001");

    // WHEN: The UI saves the form
    bridge.send_request(RendererRequest::WriteConfig(config.clone()));
    wait_for_calls(&recorder, 1).await;
    sleep(Duration::from_millis(20)).await;

    // THEN: Success once, empty payload, error never
    assert_eq!(recorder.labels(), vec!["success"]);
    assert_eq!(recorder.payloads(), vec![Payload::Empty]);

    // AND: A later query returns the new record
    assert_eq!(bridge.read_config().await.expect("query"), config);

    handle.shutdown();
}

/// **VALUE**: Verifies a failed save reaches the UI as one error event with the reason.
///
/// **BUG THIS CATCHES**: Would catch the success listener firing on failure, or the
/// message getting lost on the way.
#[tokio::test]
async fn given_full_disk_when_ui_writes_config_then_error_listener_gets_message() {
    // GIVEN: A host whose store always fails with "disk full"
    let host = HostHandlers::with_config(
        FailingStore {
            message: "disk full",
        },
        ConnectionConfig::default(),
    );
    let (bridge, handle) = connect_loopback(host, BridgeOptions::default());
    let recorder = Recorder::default();
    bridge.on_response(ResponseAction::WriteConfigSuccess, recorder.listener("success"));
    bridge.on_response(ResponseAction::WriteConfigError, recorder.listener("error"));

    // WHEN: The UI saves the form
    bridge.send_request(RendererRequest::WriteConfig(kong_config("http://localhost:8001")));
    wait_for_calls(&recorder, 1).await;
    sleep(Duration::from_millis(20)).await;

    // THEN: Error once, carrying the message
    assert_eq!(recorder.labels(), vec!["error"]);
    assert_eq!(recorder.payloads()[0].message(), Some("disk full"));

    // AND: The host still serves the old record
    assert_eq!(
        bridge.read_config().await.expect("query"),
        ConnectionConfig::default()
    );

    handle.shutdown();
}

/// **VALUE**: Verifies an unsolicited push reaches only the listeners for its action.
///
/// **WHY THIS MATTERS**: The Settings menu item opens the settings view this way.
/// Other push listeners on the same channel must not react to it.
///
/// **BUG THIS CATCHES**: Would catch pushes filtered by channel but not by action.
#[tokio::test]
async fn given_settings_menu_when_host_pushes_then_only_open_settings_listener_fires() {
    // GIVEN: A bridge with listeners on two push actions
    let host = HostHandlers::new(MemoryStore::default());
    let (bridge, handle) = connect_loopback(host.clone(), BridgeOptions::default());
    let recorder = Recorder::default();
    bridge.on_event_push(PushAction::OpenSettingsView, recorder.listener("open"));
    bridge.on_event_push(PushAction::ConfigUpdated, recorder.listener("updated"));

    // WHEN: The host pushes open-settings-view with no prior request
    let receivers = host.push(PushEvent::OpenSettingsView);
    wait_for_calls(&recorder, 1).await;
    sleep(Duration::from_millis(20)).await;

    // THEN: Only the open listener, with an empty payload
    assert_eq!(receivers, 1);
    assert_eq!(recorder.labels(), vec!["open"]);
    assert!(recorder.payloads()[0].is_empty());

    handle.shutdown();
}

#[tokio::test]
async fn given_two_bridges_when_one_writes_then_both_receive_config_updated() {
    let host = HostHandlers::new(MemoryStore::default());
    let (writer, writer_handle) = connect_loopback(host.clone(), BridgeOptions::default());
    let (watcher, watcher_handle) = connect_loopback(host.clone(), BridgeOptions::default());
    let mut writer_updates = writer.stream(PushAction::ConfigUpdated);
    let mut watcher_updates = watcher.stream(PushAction::ConfigUpdated);
    let config = kong_config("https://kong.internal:8444");

    writer.send_request(RendererRequest::WriteConfig(config.clone()));

    for updates in [&mut writer_updates, &mut watcher_updates] {
        let payload = timeout(Duration::from_secs(2), updates.recv())
            .await
            .expect("update within 2s")
            .expect("stream open");
        assert_eq!(payload.as_config(), Some(&config));
    }

    writer_handle.shutdown();
    watcher_handle.shutdown();
}

#[tokio::test]
async fn given_shutdown_connection_when_query_then_fails_fast() {
    let host = HostHandlers::new(MemoryStore::default());
    let (bridge, handle) = connect_loopback(host, BridgeOptions::default());

    handle.shutdown();
    sleep(Duration::from_millis(20)).await;

    let result = bridge.read_config().await;
    assert!(result.is_err());
    assert!(bridge.is_closed());
}

/// **VALUE**: Verifies a panicking listener leaves the connection usable.
///
/// **WHY THIS MATTERS**: Listener code runs inside the connection task. If a panic
/// escaped, the task would die and every later push and query on this bridge would
/// be lost without any report.
///
/// **BUG THIS CATCHES**: Would catch listener panics unwinding through the pump.
#[tokio::test]
async fn given_panicking_listener_when_dispatched_then_later_events_still_delivered() {
    // GIVEN: A bridge whose open-settings listener panics
    let host = HostHandlers::new(MemoryStore::default());
    let (bridge, handle) = connect_loopback(host.clone(), BridgeOptions::default());
    bridge.on_event_push(PushAction::OpenSettingsView, |_: &Payload| {
        panic!("settings view bug");
    });
    let recorder = Recorder::default();
    bridge.on_event_push(PushAction::ConfigUpdated, recorder.listener("updated"));

    // WHEN: The panicking push is delivered, then another push
    host.push(PushEvent::OpenSettingsView);
    host.push(PushEvent::ConfigUpdated(kong_config("http://localhost:8001")));
    wait_for_calls(&recorder, 1).await;

    // THEN: The later push arrived and queries still work
    assert_eq!(recorder.labels(), vec!["updated"]);
    assert!(bridge.read_config().await.is_ok());
    assert!(!bridge.is_closed());
    assert!(!handle.is_finished());

    handle.shutdown();
}
