// Library exports for testing
// The binary (main.rs) imports these as well

pub mod app;
pub mod error;
pub mod ipc_config;
pub mod logger;
pub mod menu;
pub mod settings;

#[cfg(test)]
mod tests;
