// Unit tests for bridge-core. Public API over a real socket lives in
// integration_tests/.

mod host;
mod loopback;
mod support;
