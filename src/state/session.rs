//! Connection session handles.
//!
//! A [`SessionHandle`] is the group actor's view of one live connection: a
//! bounded outbound frame queue plus a shutdown token. The socket itself is
//! never shared; it stays inside the connection task, which drains the
//! matching [`SessionOutlet`].

use super::UserId;
use crate::error::DeliveryError;
use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

pub type SessionId = Uuid;

/// Message type of a frame, preserved end to end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Text,
    Binary,
}

/// One discrete unit of data relayed between connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub kind: FrameKind,
    pub payload: Bytes,
}

impl Frame {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: FrameKind::Text,
            payload: Bytes::from(text.into()),
        }
    }

    pub fn binary(data: impl Into<Bytes>) -> Self {
        Self {
            kind: FrameKind::Binary,
            payload: data.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.payload.len()
    }
}

/// Group-side handle to a live connection.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    pub id: SessionId,
    pub user_id: UserId,
    /// Unix timestamp of when the session went live.
    pub connected_at: i64,
    outbound: mpsc::Sender<Frame>,
    shutdown: CancellationToken,
}

/// Connection-side end of a session: frames to write and the shutdown signal.
#[derive(Debug)]
pub struct SessionOutlet {
    pub outbound: mpsc::Receiver<Frame>,
    pub shutdown: CancellationToken,
}

impl SessionHandle {
    /// Create a session for `user_id` with a send queue of `capacity` frames.
    pub fn new(user_id: impl Into<UserId>, capacity: usize) -> (Self, SessionOutlet) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let shutdown = CancellationToken::new();
        let handle = Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            connected_at: chrono::Utc::now().timestamp(),
            outbound: tx,
            shutdown: shutdown.clone(),
        };
        let outlet = SessionOutlet {
            outbound: rx,
            shutdown,
        };
        (handle, outlet)
    }

    /// Enqueue a frame without waiting. Never retried by callers.
    pub fn deliver(&self, frame: Frame) -> Result<(), DeliveryError> {
        self.outbound.try_send(frame).map_err(|err| match err {
            TrySendError::Full(_) => DeliveryError::QueueFull,
            TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }

    /// Signal the connection task to close its socket. Idempotent.
    pub fn close(&self) {
        self.shutdown.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled() || self.outbound.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deliver_reaches_outlet() {
        let (session, mut outlet) = SessionHandle::new("u1", 4);
        session.deliver(Frame::text("hello")).unwrap();
        let frame = outlet.outbound.recv().await.unwrap();
        assert_eq!(frame, Frame::text("hello"));
        assert_eq!(frame.kind, FrameKind::Text);
    }

    #[test]
    fn test_deliver_to_dropped_outlet_is_closed() {
        let (session, outlet) = SessionHandle::new("u1", 4);
        drop(outlet);
        assert_eq!(session.deliver(Frame::text("x")), Err(DeliveryError::Closed));
        assert!(session.is_closed());
    }

    #[test]
    fn test_full_queue_reports_queue_full() {
        let (session, _outlet) = SessionHandle::new("u1", 1);
        session.deliver(Frame::binary(vec![1u8])).unwrap();
        assert_eq!(
            session.deliver(Frame::binary(vec![2u8])),
            Err(DeliveryError::QueueFull)
        );
    }

    #[test]
    fn test_close_cancels_outlet_token() {
        let (session, outlet) = SessionHandle::new("u1", 1);
        assert!(!outlet.shutdown.is_cancelled());
        session.close();
        session.close();
        assert!(outlet.shutdown.is_cancelled());
        assert!(session.is_closed());
    }
}
