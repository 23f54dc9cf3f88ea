//! Live-state event loop.
//!
//! One `select!` multiplexes the four things a session waits on: the shutdown
//! token, outbound frames queued by the group actor, inbound frames, and the
//! optional keepalive timer. Inbound frames are forwarded to the group in the
//! order they were read.

use crate::config::KeepaliveConfig;
use crate::state::{Frame, GroupHandle, SessionHandle, SessionOutlet};
use axum::extract::ws::{CloseFrame, Message, WebSocket, close_code};
use futures_util::{SinkExt, StreamExt};
use std::fmt;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, trace};

/// Why the live state ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum ExitReason {
    ClientClosed,
    StreamEnded,
    ReadError(String),
    WriteError(String),
    /// Replaced, evicted, or the directory was reset.
    Shutdown,
    PingTimeout { idle_secs: u64 },
    GroupUnavailable,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClientClosed => f.write_str("client closed"),
            Self::StreamEnded => f.write_str("stream ended"),
            Self::ReadError(e) => write!(f, "read error: {e}"),
            Self::WriteError(e) => write!(f, "write error: {e}"),
            Self::Shutdown => f.write_str("closed by relay"),
            Self::PingTimeout { idle_secs } => write!(f, "ping timeout: {idle_secs} seconds"),
            Self::GroupUnavailable => f.write_str("group unavailable"),
        }
    }
}

impl ExitReason {
    /// Close frame to send on a server-initiated exit. `None` when the
    /// transport is already gone or the client started the close.
    fn close_frame(&self) -> Option<CloseFrame<'static>> {
        let code = match self {
            Self::Shutdown | Self::GroupUnavailable => close_code::AWAY,
            Self::PingTimeout { .. } => close_code::POLICY,
            _ => return None,
        };
        Some(CloseFrame {
            code,
            reason: self.to_string().into(),
        })
    }
}

pub(super) async fn run(
    socket: WebSocket,
    group: &GroupHandle,
    session: &SessionHandle,
    outlet: SessionOutlet,
    keepalive: &KeepaliveConfig,
) -> ExitReason {
    let SessionOutlet {
        mut outbound,
        shutdown,
    } = outlet;
    let (mut sink, mut stream) = socket.split();

    let ping_every = keepalive.ping_every();
    let idle_limit = keepalive.idle_limit();
    // Interval still needs a period when keepalive is off; the branch is disabled.
    let mut ping_timer = tokio::time::interval_at(
        Instant::now() + ping_every.unwrap_or(Duration::from_secs(3600)),
        ping_every.unwrap_or(Duration::from_secs(3600)),
    );
    ping_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_activity = Instant::now();

    let reason = loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => break ExitReason::Shutdown,

            // Drain queued frames before reading more, so a sender's own
            // echoes never pile up behind its inbound burst.
            Some(frame) = outbound.recv() => {
                if let Err(e) = sink.send(Message::from(frame)).await {
                    break ExitReason::WriteError(e.to_string());
                }
            }

            inbound = stream.next() => {
                let msg = match inbound {
                    Some(Ok(msg)) => msg,
                    Some(Err(e)) => break ExitReason::ReadError(e.to_string()),
                    None => break ExitReason::StreamEnded,
                };
                last_activity = Instant::now();

                let frame = match msg {
                    Message::Text(text) => Frame::text(text),
                    Message::Binary(data) => Frame::binary(data),
                    // Pings are answered by the transport.
                    Message::Ping(_) | Message::Pong(_) => continue,
                    Message::Close(_) => break ExitReason::ClientClosed,
                };

                trace!(bytes = frame.size(), kind = ?frame.kind, "Frame received");
                match group.broadcast(frame, Some(session.user_id.clone())).await {
                    Ok(report) => trace!(
                        delivered = report.delivered,
                        evicted = report.evicted.len(),
                        "Frame relayed"
                    ),
                    Err(_) => break ExitReason::GroupUnavailable,
                }
            }

            _ = ping_timer.tick(), if ping_every.is_some() => {
                let idle = last_activity.elapsed();
                if idle_limit.is_some_and(|limit| idle >= limit) {
                    break ExitReason::PingTimeout { idle_secs: idle.as_secs() };
                }
                if let Err(e) = sink.send(Message::Ping(Vec::new())).await {
                    break ExitReason::WriteError(e.to_string());
                }
                debug!(idle_secs = idle.as_secs(), "Keepalive ping sent");
            }
        }
    };

    if let Some(frame) = reason.close_frame() {
        let _ = sink.send(Message::Close(Some(frame))).await;
    }
    let _ = sink.close().await;
    reason
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_server_initiated_exits_send_close() {
        assert!(ExitReason::ClientClosed.close_frame().is_none());
        assert!(ExitReason::ReadError("reset".into()).close_frame().is_none());

        let frame = ExitReason::Shutdown.close_frame().unwrap();
        assert_eq!(frame.code, close_code::AWAY);

        let frame = ExitReason::PingTimeout { idle_secs: 75 }.close_frame().unwrap();
        assert_eq!(frame.code, close_code::POLICY);
        assert_eq!(frame.reason, "ping timeout: 75 seconds");
    }
}
