//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, ServerConfig, LogConfig)
//! - [`listen`]: HTTP/WebSocket listener configuration
//! - [`session`]: Per-session limits, membership policy and keepalive
//! - [`validation`]: Startup validation collecting every error at once

mod defaults;
mod listen;
mod session;
mod types;
mod validation;

pub use session::KeepaliveConfig;
pub use types::{Config, LogConfig, LogFormat};
pub use validation::validate;
