//! Integration test common infrastructure.
//!
//! Provides utilities for spawning relay processes, driving the directory
//! over HTTP, and asserting on frames received over WebSocket.

pub mod client;
pub mod server;

#[allow(unused_imports)]
pub use client::TestClient;
#[allow(unused_imports)]
pub use server::TestServer;
