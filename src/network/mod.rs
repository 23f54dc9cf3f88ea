//! Network module.
//!
//! Contains the Gateway (HTTP listener + router) and the per-connection
//! session supervisor.

mod connection;
mod gateway;

pub use gateway::{AppState, Gateway, SessionSettings};
