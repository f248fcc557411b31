mod ipc_config;
mod settings;
