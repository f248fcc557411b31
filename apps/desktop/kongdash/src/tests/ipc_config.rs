use crate::error::KongdashError;
use crate::ipc_config::IpcConfig;

use tempfile::TempDir;

/// **VALUE**: Verifies the renderer can read back exactly what the host published.
///
/// **WHY THIS MATTERS**: The handoff file is the only way the UI learns the port and
/// token. A mismatch means the renderer can never authenticate.
///
/// **BUG THIS CATCHES**: Would catch field renames that break the file format.
#[test]
fn given_written_handoff_when_read_then_same_port_and_token() {
    // GIVEN: A handoff written to a fresh config dir
    let dir = TempDir::new().expect("temp dir");
    let config_dir = dir.path().join("kongdash");
    let published = IpcConfig::new(19876, String::from("session-token"));
    let path = published.write_handoff(&config_dir).expect("write handoff");

    // WHEN: Reading it back
    let read = IpcConfig::read_handoff(&config_dir).expect("read handoff");

    // THEN: Same values, in the expected file
    assert_eq!(read, published);
    assert_eq!(path, IpcConfig::handoff_path(&config_dir));
    let raw = std::fs::read_to_string(&path).expect("raw file");
    assert!(raw.contains("\"auth_token\""));
}

#[cfg(unix)]
#[test]
fn given_written_handoff_then_only_owner_can_read() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().expect("temp dir");
    let path = IpcConfig::new(1, String::from("t"))
        .write_handoff(dir.path())
        .expect("write handoff");

    let mode = std::fs::metadata(&path).expect("metadata").permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

/// **VALUE**: Verifies a handoff left world-readable by an earlier run is narrowed.
///
/// **WHY THIS MATTERS**: The token authorizes access to the Kong admin credentials.
/// Rewriting an old file must not keep its wider permissions.
///
/// **BUG THIS CATCHES**: Would catch relying on the create mode alone, which does not
/// apply to a file that already exists.
#[cfg(unix)]
#[test]
fn given_world_readable_handoff_when_rewritten_then_only_owner_can_read() {
    use std::os::unix::fs::PermissionsExt;

    // GIVEN: A stale handoff readable by everyone
    let dir = TempDir::new().expect("temp dir");
    let path = IpcConfig::handoff_path(dir.path());
    std::fs::write(&path, "{}").expect("stale file");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).expect("chmod");

    // WHEN: The host publishes a new session
    IpcConfig::new(19876, String::from("fresh-token"))
        .write_handoff(dir.path())
        .expect("write handoff");

    // THEN: Owner-only, with the new contents
    let mode = std::fs::metadata(&path).expect("metadata").permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
    let read = IpcConfig::read_handoff(dir.path()).expect("read handoff");
    assert_eq!(read.auth_token(), "fresh-token");
}

#[test]
fn given_no_host_when_reading_handoff_then_handoff_error() {
    let dir = TempDir::new().expect("temp dir");

    let result = IpcConfig::read_handoff(dir.path());

    assert!(matches!(result, Err(KongdashError::Handoff { .. })));
}

#[test]
fn given_removed_handoff_when_removed_again_then_ok() {
    let dir = TempDir::new().expect("temp dir");
    IpcConfig::new(1, String::from("t"))
        .write_handoff(dir.path())
        .expect("write handoff");

    IpcConfig::remove_handoff(dir.path()).expect("first remove");
    IpcConfig::remove_handoff(dir.path()).expect("second remove");

    assert!(!IpcConfig::handoff_path(dir.path()).exists());
}

#[test]
fn given_ipc_config_when_debug_printed_then_token_is_hidden() {
    let config = IpcConfig::new(19876, String::from("super-secret-token"));

    let printed = format!("{config:?}");

    assert!(!printed.contains("super-secret-token"));
    assert!(printed.contains("19876"));
}
