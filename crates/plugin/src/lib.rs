//! Extra Settings API - Plugin
//!
//! Host-facing entry points: logging, configuration and the lifecycle of the
//! settings subsystem.

pub mod bootstrap;

pub use bootstrap::{init_logging, Plugin};
pub use esapi_core;
