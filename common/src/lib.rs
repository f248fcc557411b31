//! Shared building blocks for KongDash.
//!
//! Everything here is dependency-light and used by both the wire models and
//! the bridge runtime:
//!
//! - [`ErrorLocation`] - call-site capture attached to every error variant
//! - [`Secret`] - credential string that never shows up in logs

pub mod error;
pub mod secret;

pub use error::error_location::ErrorLocation;
pub use secret::Secret;
