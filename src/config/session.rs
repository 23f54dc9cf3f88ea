//! Session limits, membership policy and keepalive.

use super::defaults::{
    default_group_queue, default_ping_interval, default_ping_timeout, default_send_queue,
};
use serde::Deserialize;
use std::time::Duration;

/// Session configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Frames buffered per session; a broadcast that finds the queue full
    /// evicts the session.
    #[serde(default = "default_send_queue")]
    pub send_queue: usize,
    /// Event queue capacity of each group actor.
    #[serde(default = "default_group_queue")]
    pub group_queue: usize,
    /// Require `POST /groups/{g}/users/{u}` before `u` may open a session in `g`.
    #[serde(default)]
    pub require_membership: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            send_queue: default_send_queue(),
            group_queue: default_group_queue(),
            require_membership: false,
        }
    }
}

/// Optional liveness probing for idle sessions.
///
/// - `ping_interval`: seconds between WebSocket pings (0 disables keepalive)
/// - `timeout`: extra seconds without inbound traffic before the session is dropped
#[derive(Debug, Clone, Deserialize)]
pub struct KeepaliveConfig {
    #[serde(default = "default_ping_interval")]
    pub ping_interval: u64,
    #[serde(default = "default_ping_timeout")]
    pub timeout: u64,
}

impl Default for KeepaliveConfig {
    fn default() -> Self {
        Self {
            ping_interval: default_ping_interval(),
            timeout: default_ping_timeout(),
        }
    }
}

impl KeepaliveConfig {
    pub fn ping_every(&self) -> Option<Duration> {
        (self.ping_interval > 0).then(|| Duration::from_secs(self.ping_interval))
    }

    /// Total idle time tolerated before a ping timeout.
    pub fn idle_limit(&self) -> Option<Duration> {
        self.ping_every()
            .map(|every| every + Duration::from_secs(self.timeout))
    }
}
