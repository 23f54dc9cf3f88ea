//! Default value functions for configuration.

use std::net::SocketAddr;

// =============================================================================
// Server Defaults
// =============================================================================

pub fn default_server_name() -> String {
    "relayd".to_string()
}

pub fn default_listen_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

// =============================================================================
// Session Defaults
// =============================================================================

/// Outbound frames buffered per session before it is evicted.
pub fn default_send_queue() -> usize {
    256
}

/// Pending events per group actor before senders wait.
pub fn default_group_queue() -> usize {
    1024
}

// =============================================================================
// Keepalive Defaults
// =============================================================================

/// Keepalive is off unless configured.
pub fn default_ping_interval() -> u64 {
    0
}

pub fn default_ping_timeout() -> u64 {
    60
}
