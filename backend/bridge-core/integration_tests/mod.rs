mod bridge_client;
mod helpers;
mod ipc_server;
