use crate::error::KongdashError;
use crate::settings::{CONFIG_DIR_VAR, HostSettings, IPC_PORT_VAR, LOG_DIR_VAR};

use bridge_core::DEFAULT_IPC_PORT;

use std::collections::HashMap;
use std::path::Path;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

/// **VALUE**: Verifies explicit variables override every default.
///
/// **WHY THIS MATTERS**: Packaged builds and tests point the host at their own
/// directories and port. Ignoring an override would write into the user's real
/// config.
///
/// **BUG THIS CATCHES**: Would catch a variable name typo or a default that wins
/// over an explicit value.
#[test]
fn given_all_variables_set_when_loading_then_values_are_used() {
    // GIVEN: All three variables
    let lookup = lookup_from(&[
        (IPC_PORT_VAR, "20001"),
        (CONFIG_DIR_VAR, "/tmp/kongdash-config"),
        (LOG_DIR_VAR, "/tmp/kongdash-logs"),
    ]);

    // WHEN: Loading
    let settings = HostSettings::from_lookup(lookup).expect("valid settings");

    // THEN: Exactly those values
    assert_eq!(settings.ipc_port(), 20001);
    assert_eq!(settings.config_dir(), Path::new("/tmp/kongdash-config"));
    assert_eq!(settings.log_dir(), Path::new("/tmp/kongdash-logs"));
}

#[test]
fn given_only_config_dir_when_loading_then_port_and_log_dir_default() {
    let lookup = lookup_from(&[(CONFIG_DIR_VAR, "/tmp/kongdash-config")]);

    let settings = HostSettings::from_lookup(lookup).expect("valid settings");

    assert_eq!(settings.ipc_port(), DEFAULT_IPC_PORT);
    assert_eq!(settings.log_dir(), Path::new("/tmp/kongdash-config/logs"));
}

#[test]
fn given_blank_port_when_loading_then_treated_as_unset() {
    let lookup = lookup_from(&[(IPC_PORT_VAR, "  "), (CONFIG_DIR_VAR, "/tmp/k")]);

    let settings = HostSettings::from_lookup(lookup).expect("valid settings");

    assert_eq!(settings.ipc_port(), DEFAULT_IPC_PORT);
}

/// **VALUE**: Verifies a malformed port fails startup with a clear message.
///
/// **BUG THIS CATCHES**: Would catch silently falling back to the default port, which
/// leaves the renderer looking on the port the user asked for.
#[test]
fn given_invalid_port_when_loading_then_settings_error() {
    // GIVEN: A port that does not fit in u16
    let lookup = lookup_from(&[(IPC_PORT_VAR, "70000"), (CONFIG_DIR_VAR, "/tmp/k")]);

    // WHEN: Loading
    let result = HostSettings::from_lookup(lookup);

    // THEN: Settings error naming the variable
    match result {
        Err(KongdashError::Settings { message, .. }) => assert!(message.contains(IPC_PORT_VAR)),
        other => panic!("expected Settings error, got {other:?}"),
    }
}
